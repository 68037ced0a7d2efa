//! Mermaid flowchart rendering of a workflow graph

use std::collections::HashMap;
use std::fmt::Write;

use serde::Deserialize;

use super::graph::{Connections, Node};

/// Graph header line
pub const HEADER: &str = "graph TD";

/// Diagram emitted for a graph without nodes
pub const EMPTY_DIAGRAM: &str = "graph TD\n    A[No nodes found]";

const UNKNOWN_TYPE: &str = "unknown";

/// How vertex identifiers are derived from nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramIdScheme {
    /// Sanitized node name. Distinct names may collide ("A/B" and "A.B").
    #[default]
    Sanitized,
    /// `n{position}` per node; edges to unknown targets fall back to the
    /// sanitized name
    Ordinal,
}

/// Turn a node name into a Mermaid identifier.
///
/// Every UTF-16 code unit outside `[A-Za-z0-9]` becomes `_`, so a character
/// beyond the Basic Multilingual Plane yields two underscores. Leading and
/// trailing underscores are then stripped. Not injective.
pub fn sanitize_node_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else {
            id.extend(std::iter::repeat_n('_', c.len_utf16()));
        }
    }

    id.trim_matches('_').to_string()
}

/// Render with the default, collision-prone identifier scheme
pub fn render(nodes: Option<&[Node]>, connections: Option<&Connections>) -> String {
    render_with(nodes, connections, DiagramIdScheme::default())
}

/// Render a `graph TD` flowchart: one vertex line per node in the given order,
/// then one edge line per `main` connection target in document order.
pub fn render_with(
    nodes: Option<&[Node]>,
    connections: Option<&Connections>,
    scheme: DiagramIdScheme,
) -> String {
    let nodes = match nodes {
        Some(nodes) if !nodes.is_empty() => nodes,
        _ => return EMPTY_DIAGRAM.to_string(),
    };

    let ids = VertexIds::new(nodes, scheme);
    let mut diagram = String::with_capacity(64 * nodes.len());
    diagram.push_str(HEADER);
    diagram.push('\n');

    for (index, node) in nodes.iter().enumerate() {
        let node_type = node.short_type().unwrap_or(UNKNOWN_TYPE);
        // `\n` is emitted literally; Mermaid turns it into a label line break.
        let _ = writeln!(
            diagram,
            "    {}[\"{}\\n({})\"]",
            ids.for_position(index, node),
            node.name,
            node_type
        );
    }

    if let Some(connections) = connections {
        for (source, outputs) in connections.iter() {
            let source_id = ids.for_name(source);
            for target in outputs.main_targets() {
                let _ = writeln!(diagram, "    {} --> {}", source_id, ids.for_name(&target.node));
            }
        }
    }

    diagram
}

/// Identifier lookup for one render call
enum VertexIds {
    Sanitized,
    Ordinal(HashMap<String, usize>),
}

impl VertexIds {
    fn new(nodes: &[Node], scheme: DiagramIdScheme) -> Self {
        match scheme {
            DiagramIdScheme::Sanitized => Self::Sanitized,
            DiagramIdScheme::Ordinal => {
                let mut positions = HashMap::with_capacity(nodes.len());
                for (index, node) in nodes.iter().enumerate() {
                    positions.entry(node.name.clone()).or_insert(index);
                }
                Self::Ordinal(positions)
            }
        }
    }

    fn for_position(&self, index: usize, node: &Node) -> String {
        match self {
            Self::Sanitized => sanitize_node_id(&node.name),
            Self::Ordinal(_) => format!("n{index}"),
        }
    }

    fn for_name(&self, name: &str) -> String {
        match self {
            Self::Ordinal(positions) => match positions.get(name) {
                Some(index) => format!("n{index}"),
                None => sanitize_node_id(name),
            },
            Self::Sanitized => sanitize_node_id(name),
        }
    }
}
