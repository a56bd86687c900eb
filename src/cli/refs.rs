use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use topicmap::{Analysis, Config, IssueKind, TopicId, analyze_file};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `topicmap refs`.
#[derive(Debug, Parser)]
#[command(about = "List the cross-references of a document")]
pub struct Refs {
    /// The document to analyse.
    file: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// One reference per line, followed by the adjacency list.
    #[default]
    Table,
    /// References, graph and issues as JSON.
    Json,
}

impl Refs {
    #[instrument(level = "debug", skip(self, config), fields(file = %self.file.display()))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let analysis = analyze_file(&self.file, config)
            .with_context(|| format!("failed to analyse {}", self.file.display()))?;

        match self.format {
            Format::Table => print!("{}", render_table(&analysis)),
            Format::Json => println!("{}", serde_json::to_string_pretty(&render_json(&analysis))?),
        }
        Ok(())
    }
}

fn render_table(analysis: &Analysis) -> String {
    if analysis.references.is_empty() {
        return format!("{}\n", "No references found".dim());
    }

    let issues: HashMap<(usize, usize), IssueKind> = analysis
        .issues
        .iter()
        .map(|issue| ((issue.start, issue.end), issue.kind))
        .collect();

    let mut output = String::new();
    for reference in &analysis.references {
        let region = reference.region_label.as_ref().map_or_else(
            || reference.region.to_string(),
            |label| format!("{}({label})", reference.region),
        );
        let status = match issues.get(&(reference.start, reference.end)) {
            Some(IssueKind::Missing) => "missing".error(),
            Some(IssueKind::Placeholder) => "placeholder".warning(),
            None => "ok".success(),
        };
        output.push_str(&format!(
            "{:<10} -> {:<10} {:<14} {:>6}..{:<6} {status}\n",
            reference.source.raw(),
            reference.target.raw(),
            region,
            reference.start,
            reference.end,
        ));
    }

    output.push_str(&format!("\n{}\n", "Graph".dim()));
    for (source, targets) in analysis.graph().as_map() {
        let targets: Vec<_> = targets.into_iter().map(TopicId::raw).collect();
        output.push_str(&format!("  {source} -> {}\n", targets.join(", ")));
    }

    output
}

fn render_json(analysis: &Analysis) -> serde_json::Value {
    let graph: serde_json::Map<_, _> = analysis
        .graph()
        .as_map()
        .into_iter()
        .map(|(source, targets)| {
            let targets: Vec<_> = targets.into_iter().map(TopicId::raw).collect();
            (source.raw().to_string(), json!(targets))
        })
        .collect();

    json!({
        "references": analysis.references,
        "graph": graph,
        "issues": analysis.issues,
    })
}
