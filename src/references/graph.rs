//! The directed reference graph and structural classification of references.
//!
//! Edges connect topics by ID, one edge per distinct (source, target) pair.
//! Classification is per occurrence: every reference whose target is absent
//! from the hierarchy, or present only as a placeholder, yields its own
//! [`ReferenceIssue`].

use std::collections::{BTreeMap, BTreeSet};

use petgraph::{Direction, algo::tarjan_scc, graphmap::DiGraphMap};
use tracing::{debug, instrument};

use crate::domain::{Hierarchy, IssueKind, Reference, ReferenceIssue, TopicId};

/// Adjacency between topics, borrowed from a list of references.
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph<'a> {
    graph: DiGraphMap<&'a TopicId, ()>,
}

impl<'a> ReferenceGraph<'a> {
    /// Builds the graph from reference occurrences.
    ///
    /// Repeated mentions of the same target from the same source collapse
    /// into a single edge.
    #[must_use]
    pub fn new(references: &'a [Reference]) -> Self {
        let mut graph = DiGraphMap::with_capacity(references.len(), references.len());
        for reference in references {
            graph.add_edge(&reference.source, &reference.target, ());
        }
        Self { graph }
    }

    /// Number of distinct (source, target) edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of topics that take part in at least one reference.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The topics referenced by `source`, in order.
    #[must_use]
    pub fn targets(&self, source: &'a TopicId) -> BTreeSet<&'a TopicId> {
        self.neighbors(source, Direction::Outgoing)
    }

    /// The topics that reference `target`, in order.
    #[must_use]
    pub fn sources(&self, target: &'a TopicId) -> BTreeSet<&'a TopicId> {
        self.neighbors(target, Direction::Incoming)
    }

    fn neighbors(&self, id: &'a TopicId, direction: Direction) -> BTreeSet<&'a TopicId> {
        if !self.graph.contains_node(id) {
            return BTreeSet::new();
        }
        self.graph.neighbors_directed(id, direction).collect()
    }

    /// The adjacency map: each referencing topic mapped to the set of topics
    /// it references.
    ///
    /// Topics that reference nothing do not appear as keys.
    #[must_use]
    pub fn as_map(&self) -> BTreeMap<&'a TopicId, BTreeSet<&'a TopicId>> {
        let mut map: BTreeMap<_, BTreeSet<_>> = BTreeMap::new();
        for (source, target, _) in self.graph.all_edges() {
            map.entry(source).or_default().insert(target);
        }
        map
    }

    /// Topics that reference themselves.
    #[must_use]
    pub fn self_references(&self) -> Vec<&'a TopicId> {
        let mut ids: Vec<_> = self
            .graph
            .nodes()
            .filter(|&id| self.graph.contains_edge(id, id))
            .collect();
        ids.sort();
        ids
    }

    /// Groups of two or more topics that reference each other in a cycle.
    ///
    /// Each group is sorted, and the groups are sorted by their first member.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<&'a TopicId>> {
        let mut cycles: Vec<_> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort();
                component
            })
            .collect();
        cycles.sort();
        cycles
    }
}

/// Classifies every reference occurrence against the hierarchy.
///
/// Returns one issue per reference whose target is missing or synthetic, in
/// reference order, with the reference's exact span.
#[must_use]
#[instrument(level = "debug", skip_all, fields(references = references.len()))]
pub fn classify(hierarchy: &Hierarchy, references: &[Reference]) -> Vec<ReferenceIssue> {
    let issues: Vec<_> = references
        .iter()
        .filter_map(|reference| {
            let kind = match hierarchy.get(reference.target.raw()) {
                None => IssueKind::Missing,
                Some(node) if node.synthetic => IssueKind::Placeholder,
                Some(_) => return None,
            };
            Some(ReferenceIssue {
                source: reference.source.clone(),
                target: reference.target.clone(),
                kind,
                start: reference.start,
                end: reference.end,
            })
        })
        .collect();

    debug!(issues = issues.len(), "classified references");
    issues
}

/// Builds the reference graph and classifies every reference.
#[must_use]
pub fn build_reference_graph<'a>(
    hierarchy: &Hierarchy,
    references: &'a [Reference],
) -> (ReferenceGraph<'a>, Vec<ReferenceIssue>) {
    (
        ReferenceGraph::new(references),
        classify(hierarchy, references),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RegionKind, TopicBlock, hierarchy::Options, reference::EXPLICIT};

    fn id(raw: &str) -> TopicId {
        TopicId::parse(raw).unwrap()
    }

    fn reference(source: &str, target: &str, start: usize) -> Reference {
        Reference {
            source: id(source),
            target: id(target),
            relation: EXPLICIT.to_string(),
            start,
            end: start + 8,
            region: RegionKind::Paragraph,
            region_label: None,
        }
    }

    fn hierarchy(ids: &[&str]) -> Hierarchy {
        let blocks = ids.iter().map(|raw| TopicBlock {
            topic_id: Some(id(raw)),
            title: None,
            text: String::new(),
            start: 0,
            end: 0,
            subclauses: Vec::new(),
        });
        Hierarchy::build(blocks, Options::default()).hierarchy
    }

    fn raws<'a>(ids: impl IntoIterator<Item = &'a TopicId>) -> Vec<&'a str> {
        ids.into_iter().map(TopicId::raw).collect()
    }

    #[test]
    fn repeated_mentions_make_one_edge() {
        let references = vec![
            reference("1", "2", 0),
            reference("1", "2", 20),
            reference("1", "3", 40),
            reference("2", "1", 60),
        ];
        let graph = ReferenceGraph::new(&references);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(raws(graph.targets(&references[0].source)), ["2", "3"]);
        assert_eq!(raws(graph.sources(&references[0].source)), ["2"]);

        let map: Vec<_> = graph
            .as_map()
            .into_iter()
            .map(|(source, targets)| (source.raw(), raws(targets)))
            .collect();
        assert_eq!(map, [("1", vec!["2", "3"]), ("2", vec!["1"])]);
    }

    #[test]
    fn unknown_node_has_no_neighbours() {
        let references = vec![reference("1", "2", 0), reference("7", "8", 0)];
        let graph = ReferenceGraph::new(&references[..1]);
        assert!(graph.targets(&references[1].source).is_empty());
        assert!(graph.sources(&references[1].target).is_empty());
    }

    #[test]
    fn missing_target_yields_issue_with_span() {
        let hierarchy = hierarchy(&["5", "5.1"]);
        let references = vec![reference("5.1", "9.9", 30)];

        let issues = classify(&hierarchy, &references);

        assert_eq!(
            issues,
            [ReferenceIssue {
                source: id("5.1"),
                target: id("9.9"),
                kind: IssueKind::Missing,
                start: 30,
                end: 38,
            }]
        );
    }

    #[test]
    fn synthetic_target_yields_placeholder_issue() {
        let hierarchy = hierarchy(&["1", "18.1", "18.3"]);
        let references = vec![
            reference("1", "18", 0),
            reference("1", "18.2", 10),
            reference("1", "18.1", 20),
        ];

        let kinds: Vec<_> = classify(&hierarchy, &references)
            .into_iter()
            .map(|issue| (issue.target.raw().to_string(), issue.kind))
            .collect();

        assert_eq!(
            kinds,
            [
                ("18".to_string(), IssueKind::Placeholder),
                ("18.2".to_string(), IssueKind::Placeholder),
            ]
        );
    }

    #[test]
    fn one_issue_per_occurrence() {
        let hierarchy = hierarchy(&["1"]);
        let references = vec![reference("1", "4", 0), reference("1", "4", 50)];

        let (graph, issues) = build_reference_graph(&hierarchy, &references);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].start, 50);
    }

    #[test]
    fn detects_self_references_and_cycles() {
        let references = vec![
            reference("1", "1", 0),
            reference("2", "3", 0),
            reference("3", "2.1", 0),
            reference("2.1", "2", 0),
            reference("4", "2", 0),
        ];
        let graph = ReferenceGraph::new(&references);

        assert_eq!(raws(graph.self_references()), ["1"]);

        let cycles: Vec<_> = graph.cycles().into_iter().map(raws).collect();
        assert_eq!(cycles, [vec!["2", "2.1", "3"]]);
    }
}
