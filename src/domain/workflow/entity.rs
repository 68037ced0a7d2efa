//! Catalog workflow records

use serde::{Deserialize, Serialize};

use super::graph::RawWorkflow;

/// Filter token meaning "do not filter on this dimension"
pub const ALL: &str = "all";

/// Catalog metadata of a workflow, without its node graph.
///
/// This is what search results and category listings carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowSummary {
    /// Unique identifier within the catalog
    pub filename: String,

    pub name: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub description: String,

    /// Trigger kind, e.g. `Webhook`, `Scheduled`, `Manual`
    #[serde(rename = "trigger_type")]
    pub trigger: String,

    /// Complexity class: `low`, `medium` or `high`
    pub complexity: String,

    #[serde(default)]
    pub node_count: usize,

    /// Service names; not necessarily unique
    #[serde(default)]
    pub integrations: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Hex SHA-256 of the source document
    #[serde(default)]
    pub file_hash: String,

    #[serde(default)]
    pub file_size: u64,
}

impl WorkflowSummary {
    pub fn new(filename: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            name: name.into(),
            active: false,
            description: String::new(),
            trigger: "Manual".to_string(),
            complexity: "low".to_string(),
            node_count: 0,
            integrations: Vec::new(),
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
            file_hash: String::new(),
            file_size: 0,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    pub fn with_complexity(mut self, complexity: impl Into<String>) -> Self {
        self.complexity = complexity.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_integrations<I, S>(mut self, integrations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.integrations = integrations.into_iter().map(Into::into).collect();
        self
    }
}

/// Full catalog record: metadata plus the node graph when available
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    #[serde(flatten)]
    pub summary: WorkflowSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_workflow: Option<RawWorkflow>,
}

impl Workflow {
    pub fn new(summary: WorkflowSummary) -> Self {
        Self {
            summary,
            raw_workflow: None,
        }
    }

    pub fn with_raw_workflow(mut self, raw: RawWorkflow) -> Self {
        self.raw_workflow = Some(raw);
        self
    }

    pub fn filename(&self) -> &str {
        &self.summary.filename
    }

    pub fn summary(&self) -> &WorkflowSummary {
        &self.summary
    }

    pub fn raw_workflow(&self) -> Option<&RawWorkflow> {
        self.raw_workflow.as_ref()
    }
}

impl From<Workflow> for WorkflowSummary {
    fn from(workflow: Workflow) -> Self {
        workflow.summary
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::workflow::graph::Node;
    use super::*;

    #[test]
    fn test_summary_serializes_trigger_type() {
        let summary = WorkflowSummary::new("a.json", "A").with_trigger("Webhook");
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["trigger_type"], "Webhook");
        assert!(json.get("trigger").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_workflow_flattens_summary() {
        let workflow = Workflow::new(WorkflowSummary::new("a.json", "A"))
            .with_raw_workflow(RawWorkflow::new(vec![Node::new("Start", "x.start")], None));
        let json = serde_json::to_value(&workflow).unwrap();

        assert_eq!(json["filename"], "a.json");
        assert_eq!(json["raw_workflow"]["nodes"][0]["name"], "Start");

        let back: Workflow = serde_json::from_value(json).unwrap();
        assert_eq!(back, workflow);
    }

    #[test]
    fn test_workflow_without_graph_omits_raw() {
        let workflow = Workflow::new(WorkflowSummary::new("a.json", "A"));
        let json = serde_json::to_value(&workflow).unwrap();
        assert!(json.get("raw_workflow").is_none());
    }
}
