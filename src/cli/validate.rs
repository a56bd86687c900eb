use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use topicmap::{Config, Finding, Severity, analyze_file};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use super::terminal::Colorize;

/// Extension of the documents picked up when walking a directory.
const DOCUMENT_EXTENSION: &str = "txt";

#[derive(Debug, Parser)]
#[command(about = "Check documents for structural problems")]
pub struct Validate {
    /// Documents or directories to validate.
    ///
    /// Directories are searched recursively for `.txt` files.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

/// The findings for one document.
#[derive(Debug, Serialize)]
struct Report {
    path: PathBuf,
    findings: Vec<Finding>,
}

impl Report {
    fn problems(&self) -> usize {
        self.findings.iter().filter(|f| f.is_problem()).count()
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let documents = collect_documents(&self.paths)?;
        debug!(documents = documents.len(), "validating documents");

        let reports = documents
            .par_iter()
            .map(|path| -> anyhow::Result<Report> {
                let analysis = analyze_file(path, config)
                    .with_context(|| format!("failed to analyse {}", path.display()))?;
                Ok(Report {
                    path: path.clone(),
                    findings: analysis.findings(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        if !self.quiet {
            match self.output {
                OutputFormat::Table => print!("{}", render_table(&reports)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
                OutputFormat::Summary => println!("{}", render_summary(&reports)),
            }
        }

        // Exit with appropriate code
        if reports.iter().any(|report| report.problems() > 0) {
            std::process::exit(2);
        }

        Ok(())
    }
}

/// Expands the given paths into a sorted list of documents.
fn collect_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_document(entry.path()) {
                    documents.push(entry.into_path());
                }
            }
        } else if path.is_file() {
            documents.push(path.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

fn render_table(reports: &[Report]) -> String {
    let mut output = String::new();

    for report in reports {
        if report.problems() == 0 {
            output.push_str(&format!("✓ {}\n", report.path.display()));
        } else {
            output.push_str(&format!(
                "{}\n",
                format!("✗ {}", report.path.display()).warning()
            ));
        }
        for finding in &report.findings {
            let location = match (finding.start, finding.end) {
                (Some(start), Some(end)) => format!(" [{start}..{end}]"),
                _ => String::new(),
            };
            output.push_str(&format!(
                "  {:<7} {:<21} {}{}\n",
                finding.severity.to_string().severity(finding.severity),
                finding.kind,
                finding.message,
                location.dim(),
            ));
        }
    }

    let problems: usize = reports.iter().map(Report::problems).sum();
    if problems == 0 {
        output.push_str(&format!(
            "\n{}\n",
            format!("{} documents checked, no problems found", reports.len()).success()
        ));
    } else {
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "Summary: {problems} problems in {} documents",
                reports.len()
            )
            .warning()
        ));
    }
    output
}

fn render_summary(reports: &[Report]) -> String {
    let count = |severity: Severity| -> usize {
        reports
            .iter()
            .flat_map(|report| &report.findings)
            .filter(|finding| finding.severity == severity)
            .count()
    };
    format!(
        "documents={} errors={} warnings={} info={}",
        reports.len(),
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;
    use topicmap::analyze;

    use super::*;

    fn report(path: &str, text: &str) -> Report {
        Report {
            path: PathBuf::from(path),
            findings: analyze(text, &Config::default()).unwrap().findings(),
        }
    }

    #[test]
    fn collects_text_files_recursively_in_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("b.txt"), "1 Scope\n").unwrap();
        fs::write(root.join("a.TXT"), "1 Scope\n").unwrap();
        fs::write(root.join("notes.md"), "1 Scope\n").unwrap();
        fs::write(root.join("nested/c.txt"), "1 Scope\n").unwrap();

        let documents = collect_documents(&[root.to_path_buf()]).unwrap();

        let names: Vec<_> = documents
            .iter()
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            [
                PathBuf::from("a.TXT"),
                PathBuf::from("b.txt"),
                PathBuf::from("nested/c.txt")
            ]
        );
    }

    #[test]
    fn explicit_files_are_kept_regardless_of_extension() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("contract.md");
        fs::write(&file, "1 Scope\n").unwrap();

        assert_eq!(collect_documents(&[file.clone()]).unwrap(), [file]);
    }

    #[test]
    fn repeated_paths_are_analysed_once() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let file = root.join("a.txt");
        fs::write(&file, "1 Scope\n").unwrap();
        fs::write(root.join("b.txt"), "1 Scope\n").unwrap();

        let documents =
            collect_documents(&[file.clone(), root.to_path_buf(), file.clone()]).unwrap();

        assert_eq!(documents, [file, root.join("b.txt")]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let tmp = tempdir().unwrap();
        let error = collect_documents(&[tmp.path().join("missing")]).unwrap_err();
        assert!(error.to_string().starts_with("no such file or directory"));
    }

    #[test]
    fn table_lists_findings_per_document() {
        let reports = [
            report("clean.txt", "1 Scope\n"),
            report("broken.txt", "1 Scope\nSee Topic 7.\n"),
        ];

        let table = render_table(&reports);

        assert!(table.contains("✓ clean.txt"));
        assert!(table.contains("✗ broken.txt"));
        assert!(table.contains("missing_topic"));
        assert!(table.contains("Reference from 1 to missing topic 7."));
        assert!(table.contains("Summary: 1 problems in 2 documents"));
    }

    #[test]
    fn informational_findings_do_not_mark_a_document() {
        let reports = [report("cyclic.txt", "1 Scope\nSee Topic 1.\n")];
        assert_eq!(reports[0].findings.len(), 1);

        let table = render_table(&reports);

        assert!(table.contains("✓ cyclic.txt"));
        assert!(table.contains("self_reference"));
        assert!(table.contains("1 documents checked, no problems found"));
    }

    #[test]
    fn summary_counts_by_severity() {
        let reports = [report("a.txt", "1.1 Scope\nSee Topic 7 and Topic 1.1.\n")];

        assert_eq!(
            render_summary(&reports),
            "documents=1 errors=1 warnings=1 info=1"
        );
    }
}
