//! This bench test analyses a large generated document with nested topics,
//! numbering gaps and dense cross-references.

#![allow(missing_docs)]

use std::fmt::Write;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use topicmap::{Config, Hierarchy, TopicBlock, analyze, domain::hierarchy::Options};

/// Generates a document with `sections` top-level topics, each with nested
/// subtopics. Every third subtopic is omitted to force placeholder synthesis.
fn generate_document(sections: usize) -> String {
    let mut text = String::from("Preamble text that precedes the first header.\n\n");
    for section in 1..=sections {
        writeln!(text, "TOPIC {section}: Section {section}").unwrap();
        writeln!(
            text,
            "This section refers to Topic {}.",
            section % sections + 1
        )
        .unwrap();
        for sub in (1..=12).filter(|sub| sub % 3 != 0) {
            writeln!(text, "{section}.{sub} Subtopic {sub}").unwrap();
            writeln!(
                text,
                "See Topic {section}.{} and topic {}.{sub}.a for details.",
                sub + 1,
                section + 1
            )
            .unwrap();
            writeln!(text, "{section}.{sub}.a").unwrap();
            writeln!(text, "Lettered clause text, as in Topic {section}.").unwrap();
        }
    }
    text
}

fn analyze_document(c: &mut Criterion) {
    let text = generate_document(40);
    let config = Config::default();

    c.bench_function("analyze document", |b| {
        b.iter(|| analyze(&text, &config).unwrap());
    });
}

fn build_hierarchy(c: &mut Criterion) {
    let text = generate_document(40);
    let analysis = analyze(&text, &Config::default()).unwrap();
    let blocks: Vec<TopicBlock> = analysis
        .hierarchy
        .iter()
        .filter_map(|node| node.block.clone())
        .collect();

    c.bench_function("build hierarchy", |b| {
        b.iter_batched(
            || blocks.clone(),
            |blocks| Hierarchy::build(blocks, Options::default()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, analyze_document, build_hierarchy);
criterion_main!(benches);
