//! Structural audit.
//!
//! Turns placeholder topics, reference issues, discarded duplicates and
//! reference cycles into a flat list of [`Finding`]s for reporting. The audit
//! reports; it never repairs.

use std::fmt;

use serde::Serialize;

use crate::{
    domain::{Hierarchy, IssueKind, ReferenceIssue, TopicBlock, TopicId},
    references::ReferenceGraph,
};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth knowing; not a defect.
    Info,
    /// Probably a defect in the document.
    Warning,
    /// A definite defect in the document.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A topic exists only as a placeholder.
    MissingTopicContent,
    /// A reference points at a topic that does not exist.
    MissingTopic,
    /// A reference points at a placeholder topic.
    PlaceholderTarget,
    /// A block was dropped because its topic ID was already taken.
    DuplicateTopic,
    /// A topic references itself.
    SelfReference,
    /// Topics reference each other in a cycle.
    ReferenceCycle,
}

impl FindingKind {
    /// The kind as it appears in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingTopicContent => "missing_topic_content",
            Self::MissingTopic => "missing_topic",
            Self::PlaceholderTarget => "placeholder_target",
            Self::DuplicateTopic => "duplicate_topic",
            Self::SelfReference => "self_reference",
            Self::ReferenceCycle => "reference_cycle",
        }
    }

    /// The severity every finding of this kind carries.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::MissingTopic => Severity::Error,
            Self::MissingTopicContent | Self::PlaceholderTarget | Self::DuplicateTopic => {
                Severity::Warning
            }
            Self::SelfReference | Self::ReferenceCycle => Severity::Info,
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single audit finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// What the finding is about.
    pub kind: FindingKind,

    /// How serious it is.
    pub severity: Severity,

    /// A human-readable description.
    pub message: String,

    /// The topic the finding concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<TopicId>,

    /// Start of the relevant text, if the finding points at a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,

    /// End of the relevant text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Finding {
    const fn new(kind: FindingKind, message: String, topic: Option<TopicId>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message,
            topic,
            start: None,
            end: None,
        }
    }

    const fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Whether this finding should fail validation.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

/// Audits placeholder topics and reference issues.
///
/// Placeholder findings come first, in hierarchy order, followed by one
/// finding per reference issue in reference order.
#[must_use]
pub fn run(hierarchy: &Hierarchy, issues: &[ReferenceIssue]) -> Vec<Finding> {
    let placeholders = hierarchy.synthetic().map(|node| {
        Finding::new(
            FindingKind::MissingTopicContent,
            format!(
                "Topic {} has no content (placeholder for structural gap).",
                node.id
            ),
            Some(node.id.clone()),
        )
    });

    let references = issues.iter().map(|issue| {
        let (kind, message) = match issue.kind {
            IssueKind::Missing => (
                FindingKind::MissingTopic,
                format!(
                    "Reference from {} to missing topic {}.",
                    issue.source, issue.target
                ),
            ),
            IssueKind::Placeholder => (
                FindingKind::PlaceholderTarget,
                format!(
                    "Reference from {} to placeholder topic {} (no content).",
                    issue.source, issue.target
                ),
            ),
        };
        Finding::new(kind, message, Some(issue.source.clone())).with_span(issue.start, issue.end)
    });

    placeholders.chain(references).collect()
}

/// One finding per block discarded by the duplicate policy.
#[must_use]
pub fn duplicates(discarded: &[TopicBlock]) -> Vec<Finding> {
    discarded
        .iter()
        .filter_map(|block| {
            let id = block.topic_id.clone()?;
            Some(
                Finding::new(
                    FindingKind::DuplicateTopic,
                    format!("Duplicate block for topic {id} was discarded."),
                    Some(id),
                )
                .with_span(block.start, block.end),
            )
        })
        .collect()
}

/// Informational findings for self-references and reference cycles.
#[must_use]
pub fn cycles(graph: &ReferenceGraph<'_>) -> Vec<Finding> {
    let self_references = graph.self_references().into_iter().map(|id| {
        Finding::new(
            FindingKind::SelfReference,
            format!("Topic {id} references itself."),
            Some(id.clone()),
        )
    });

    let cycles = graph.cycles().into_iter().map(|members| {
        let path = members
            .iter()
            .map(|id| id.raw())
            .collect::<Vec<_>>()
            .join(" -> ");
        Finding::new(
            FindingKind::ReferenceCycle,
            format!("Topics reference each other in a cycle: {path}."),
            members.first().map(|&id| id.clone()),
        )
    });

    self_references.chain(cycles).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reference, RegionKind, hierarchy::Options, reference::EXPLICIT};

    fn id(raw: &str) -> TopicId {
        TopicId::parse(raw).unwrap()
    }

    fn block(raw: &str, start: usize) -> TopicBlock {
        TopicBlock {
            topic_id: Some(id(raw)),
            title: None,
            text: String::new(),
            start,
            end: start + 10,
            subclauses: Vec::new(),
        }
    }

    #[test]
    fn placeholders_and_reference_issues() {
        let hierarchy = Hierarchy::build([block("2.1", 0)], Options::default()).hierarchy;
        let issues = [
            ReferenceIssue {
                source: id("2.1"),
                target: id("9"),
                kind: IssueKind::Missing,
                start: 4,
                end: 11,
            },
            ReferenceIssue {
                source: id("2.1"),
                target: id("2"),
                kind: IssueKind::Placeholder,
                start: 20,
                end: 27,
            },
        ];

        let findings = run(&hierarchy, &issues);

        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.kind, f.severity, f.topic.as_ref().map(TopicId::raw), f.start))
            .collect();
        assert_eq!(
            summary,
            [
                (FindingKind::MissingTopicContent, Severity::Warning, Some("2"), None),
                (FindingKind::MissingTopic, Severity::Error, Some("2.1"), Some(4)),
                (FindingKind::PlaceholderTarget, Severity::Warning, Some("2.1"), Some(20)),
            ]
        );
        assert_eq!(findings[1].message, "Reference from 2.1 to missing topic 9.");
        assert_eq!(findings[1].end, Some(11));
    }

    #[test]
    fn clean_document_has_no_findings() {
        let hierarchy =
            Hierarchy::build([block("1", 0), block("1.1", 10)], Options::default()).hierarchy;
        assert!(run(&hierarchy, &[]).is_empty());
    }

    #[test]
    fn discarded_duplicates_are_reported() {
        let findings = duplicates(&[block("3", 40)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::DuplicateTopic);
        assert_eq!((findings[0].start, findings[0].end), (Some(40), Some(50)));
        assert!(findings[0].is_problem());
    }

    #[test]
    fn cycles_are_informational() {
        let reference = |source: &str, target: &str| Reference {
            source: id(source),
            target: id(target),
            relation: EXPLICIT.to_string(),
            start: 0,
            end: 0,
            region: RegionKind::Paragraph,
            region_label: None,
        };
        let references = [reference("1", "1"), reference("2", "3"), reference("3", "2")];
        let graph = ReferenceGraph::new(&references);

        let findings = cycles(&graph);

        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, [FindingKind::SelfReference, FindingKind::ReferenceCycle]);
        assert!(findings.iter().all(|f| !f.is_problem()));
        assert_eq!(
            findings[1].message,
            "Topics reference each other in a cycle: 2 -> 3."
        );
    }

    #[test]
    fn severities_order_by_seriousness() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(
            serde_json::to_string(&FindingKind::PlaceholderTarget).unwrap(),
            "\"placeholder_target\""
        );
    }
}
