//! Catalog metadata derived from a workflow's node graph

use super::graph::Node;

pub const TRIGGER_WEBHOOK: &str = "Webhook";
pub const TRIGGER_SCHEDULED: &str = "Scheduled";
pub const TRIGGER_TRIGGERED: &str = "Triggered";
pub const TRIGGER_MANUAL: &str = "Manual";
pub const TRIGGER_COMPLEX: &str = "Complex";

pub const COMPLEXITY_LOW: &str = "low";
pub const COMPLEXITY_MEDIUM: &str = "medium";
pub const COMPLEXITY_HIGH: &str = "high";

/// Node kinds that are plumbing rather than external services
const UTILITY_NODES: &[&str] = &[
    "set",
    "if",
    "switch",
    "merge",
    "code",
    "function",
    "functionitem",
    "noop",
    "wait",
    "stickynote",
    "splitinbatches",
    "start",
    "manualtrigger",
];

fn trigger_kind(node_type: &str) -> Option<&'static str> {
    let lower = node_type.to_lowercase();

    if lower.contains("webhook") {
        Some(TRIGGER_WEBHOOK)
    } else if lower.contains("cron") || lower.contains("schedule") {
        Some(TRIGGER_SCHEDULED)
    } else if lower.contains("manualtrigger") {
        Some(TRIGGER_MANUAL)
    } else if lower.ends_with("trigger") {
        Some(TRIGGER_TRIGGERED)
    } else {
        None
    }
}

/// Trigger kind of a graph: `Manual` with no trigger nodes, the single kind
/// found, or `Complex` when kinds are mixed
pub fn derive_trigger(nodes: &[Node]) -> &'static str {
    let mut found: Option<&'static str> = None;

    for kind in nodes
        .iter()
        .filter_map(|node| node.node_type.as_deref())
        .filter_map(trigger_kind)
    {
        match found {
            None => found = Some(kind),
            Some(existing) if existing != kind => return TRIGGER_COMPLEX,
            Some(_) => {}
        }
    }

    found.unwrap_or(TRIGGER_MANUAL)
}

/// Complexity class by node count
pub fn derive_complexity(node_count: usize) -> &'static str {
    match node_count {
        0..=5 => COMPLEXITY_LOW,
        6..=15 => COMPLEXITY_MEDIUM,
        _ => COMPLEXITY_HIGH,
    }
}

/// Service name for a node type, or `None` for utility nodes
fn service_name(node_type: &str) -> Option<String> {
    let segment = node_type.rsplit('.').next()?;
    let base = segment
        .strip_suffix("Trigger")
        .or_else(|| segment.strip_suffix("Tool"))
        .unwrap_or(segment);

    if base.is_empty() || UTILITY_NODES.contains(&segment.to_lowercase().as_str()) {
        return None;
    }

    let mut chars = base.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Distinct services used by the graph, in first-seen order
pub fn derive_integrations(nodes: &[Node]) -> Vec<String> {
    let mut integrations: Vec<String> = Vec::new();

    for name in nodes
        .iter()
        .filter_map(|node| node.node_type.as_deref())
        .filter_map(service_name)
    {
        if !integrations.contains(&name) {
            integrations.push(name);
        }
    }

    integrations
}

/// One-line description used for search and display
pub fn describe(trigger: &str, integration_count: usize, node_count: usize) -> String {
    let lead = match trigger {
        TRIGGER_WEBHOOK => "Webhook-triggered automation",
        TRIGGER_SCHEDULED => "Scheduled automation",
        TRIGGER_TRIGGERED => "Event-triggered automation",
        TRIGGER_COMPLEX => "Multi-trigger automation",
        _ => "Manual workflow",
    };
    let services = if integration_count == 1 {
        "service"
    } else {
        "services"
    };

    format!(
        "{lead} that integrates with {integration_count} {services}. Uses {node_count} nodes."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(types: &[&str]) -> Vec<Node> {
        types
            .iter()
            .enumerate()
            .map(|(i, t)| Node::new(format!("node{i}"), *t))
            .collect()
    }

    #[test]
    fn test_trigger_single_kind() {
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.webhook", "n8n-nodes-base.set"])), "Webhook");
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.scheduleTrigger"])), "Scheduled");
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.cron"])), "Scheduled");
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.telegramTrigger"])), "Triggered");
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.manualTrigger"])), "Manual");
    }

    #[test]
    fn test_trigger_defaults_to_manual() {
        assert_eq!(derive_trigger(&[]), "Manual");
        assert_eq!(derive_trigger(&nodes(&["n8n-nodes-base.slack"])), "Manual");
        assert_eq!(derive_trigger(&[Node::untyped("x")]), "Manual");
    }

    #[test]
    fn test_trigger_mixed_is_complex() {
        let graph = nodes(&["n8n-nodes-base.webhook", "n8n-nodes-base.cron"]);
        assert_eq!(derive_trigger(&graph), "Complex");

        let same = nodes(&["n8n-nodes-base.webhook", "n8n-nodes-base.webhook"]);
        assert_eq!(derive_trigger(&same), "Webhook");
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(derive_complexity(0), "low");
        assert_eq!(derive_complexity(5), "low");
        assert_eq!(derive_complexity(6), "medium");
        assert_eq!(derive_complexity(15), "medium");
        assert_eq!(derive_complexity(16), "high");
    }

    #[test]
    fn test_integrations_from_types() {
        let graph = nodes(&[
            "n8n-nodes-base.telegramTrigger",
            "n8n-nodes-base.set",
            "n8n-nodes-base.slack",
            "n8n-nodes-base.telegram",
            "n8n-nodes-base.httpRequest",
            "@n8n/n8n-nodes-langchain.calculatorTool",
            "n8n-nodes-base.manualTrigger",
            "n8n-nodes-base.stickyNote",
        ]);

        assert_eq!(
            derive_integrations(&graph),
            vec!["Telegram", "Slack", "HttpRequest", "Calculator"]
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe("Webhook", 1, 3),
            "Webhook-triggered automation that integrates with 1 service. Uses 3 nodes."
        );
        assert_eq!(
            describe("Manual", 4, 12),
            "Manual workflow that integrates with 4 services. Uses 12 nodes."
        );
    }
}
