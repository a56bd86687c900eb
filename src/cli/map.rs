use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::json;
use topicmap::{Config, Hierarchy, TopicId, TopicNode, analyze_file};
use tracing::instrument;

use super::{parse_topic_id, terminal::Colorize};

/// Command arguments for `topicmap map`.
#[derive(Debug, Parser)]
#[command(about = "Show the topic hierarchy of a document")]
pub struct Map {
    /// The document to analyse.
    file: PathBuf,

    /// Show only the subtree rooted at this topic.
    #[arg(long, value_parser = parse_topic_id)]
    topic: Option<TopicId>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// Indented tree, placeholders marked.
    #[default]
    Tree,
    /// JSON object keyed by topic ID.
    Json,
}

impl Map {
    #[instrument(level = "debug", skip(self, config), fields(file = %self.file.display()))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let analysis = analyze_file(&self.file, config)
            .with_context(|| format!("failed to analyse {}", self.file.display()))?;
        let hierarchy = &analysis.hierarchy;

        let nodes = match &self.topic {
            Some(topic) => {
                let Some(node) = hierarchy.get(topic.raw()) else {
                    anyhow::bail!("topic {topic} not found in {}", self.file.display());
                };
                hierarchy.subtree(node)
            }
            None => hierarchy.walk(),
        };

        match self.format {
            Format::Tree => print!("{}", render_tree(&nodes)),
            Format::Json => println!(
                "{}",
                serde_json::to_string_pretty(&render_json(hierarchy, &nodes))?
            ),
        }
        Ok(())
    }
}

fn render_tree(nodes: &[(usize, &TopicNode)]) -> String {
    if nodes.is_empty() {
        return format!("{}\n", "No topics found".dim());
    }

    nodes
        .iter()
        .map(|(depth, node)| {
            let indent = "  ".repeat(*depth);
            let label = if node.synthetic {
                "(placeholder)".warning()
            } else {
                node.title().unwrap_or_default().to_string()
            };
            format!("{indent}{}  {label}\n", node.id.raw().info())
        })
        .collect()
}

fn render_json(hierarchy: &Hierarchy, nodes: &[(usize, &TopicNode)]) -> serde_json::Value {
    let topics: serde_json::Map<_, _> = nodes
        .iter()
        .map(|(_, node)| {
            let value = json!({
                "title": node.title(),
                "synthetic": node.synthetic,
                "parent": node.parent.as_ref().map(TopicId::raw),
                "children": node.children.iter().map(TopicId::raw).collect::<Vec<_>>(),
                "level": node.id.level(),
            });
            (node.id.raw().to_string(), value)
        })
        .collect();

    json!({
        "topics": topics,
        "summary": {
            "total": hierarchy.len(),
            "synthetic": hierarchy.synthetic().count(),
        }
    })
}

#[cfg(test)]
mod tests {
    use topicmap::analyze;

    use super::*;

    const DOCUMENT: &str = "TOPIC 1: Scope\nbody\n2.1 Definitions\nbody\n";

    #[test]
    fn tree_marks_placeholders() {
        let analysis = analyze(DOCUMENT, &Config::default()).unwrap();
        let tree = render_tree(&analysis.hierarchy.walk());

        let lines: Vec<_> = tree.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('1') && lines[0].ends_with("Scope"));
        assert!(lines[1].starts_with('2') && lines[1].ends_with("(placeholder)"));
        assert!(lines[2].starts_with("  2.1") && lines[2].ends_with("Definitions"));
    }

    #[test]
    fn json_lists_every_topic() {
        let analysis = analyze(DOCUMENT, &Config::default()).unwrap();
        let value = render_json(&analysis.hierarchy, &analysis.hierarchy.walk());

        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["summary"]["synthetic"], 1);
        assert_eq!(value["topics"]["2"]["synthetic"], true);
        assert_eq!(value["topics"]["2"]["children"], json!(["2.1"]));
        assert_eq!(value["topics"]["2.1"]["parent"], "2");
        assert_eq!(value["topics"]["1"]["title"], "Scope");
    }

    #[test]
    fn empty_document_says_so() {
        assert!(render_tree(&[]).contains("No topics found"));
    }
}
