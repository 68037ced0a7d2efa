//! Workflow node graph as found in an exported workflow document

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Output channel holding the regular data-flow connections
pub const MAIN_OUTPUT: &str = "main";

/// A single processing step in a workflow graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Display name; also the vertex identity inside one graph
    pub name: String,

    /// Dotted capability path, e.g. `n8n-nodes-base.slack`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    /// Remaining node attributes (parameters, position, credentials...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: Some(node_type.into()),
            extra: Map::new(),
        }
    }

    /// Node without a declared type
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: None,
            extra: Map::new(),
        }
    }

    /// Final dot-separated segment of the type path, if any
    pub fn short_type(&self) -> Option<&str> {
        self.node_type
            .as_deref()
            .and_then(|t| t.rsplit('.').next())
            .filter(|segment| !segment.is_empty())
    }
}

/// Reference from an output slot to a target node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionTarget {
    pub node: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl ConnectionTarget {
    pub fn to(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind: Some(MAIN_OUTPUT.to_string()),
            index: Some(0),
        }
    }
}

/// Outputs of one source node, keyed by channel
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeOutputs {
    /// Ordered output slots; a `null` slot carries no targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<Vec<Option<Vec<ConnectionTarget>>>>,

    /// Non-main channels (AI tool/model links and the like)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl NodeOutputs {
    /// Build main outputs from slots of target names
    pub fn main<S, I>(slots: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let main = slots
            .into_iter()
            .map(|slot| Some(slot.into_iter().map(ConnectionTarget::to).collect()))
            .collect();

        Self {
            main: Some(main),
            other: Map::new(),
        }
    }

    /// Targets of the main channel in slot order, then target order
    pub fn main_targets(&self) -> impl Iterator<Item = &ConnectionTarget> {
        self.main
            .iter()
            .flatten()
            .flatten()
            .flatten()
    }
}

/// Connection map from source node name to its outputs.
///
/// Entries keep the order in which they appear in the document, which is the
/// order edges are rendered in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connections(Vec<(String, NodeOutputs)>);

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl Into<String>, outputs: NodeOutputs) -> Self {
        self.0.push((source.into(), outputs));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeOutputs)> {
        self.0.iter().map(|(source, outputs)| (source.as_str(), outputs))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Connections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (source, outputs) in &self.0 {
            map.serialize_entry(source, outputs)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Connections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConnectionsVisitor;

        impl<'de> Visitor<'de> for ConnectionsVisitor {
            type Value = Connections;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from node name to node outputs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((source, outputs)) = access.next_entry::<String, NodeOutputs>()? {
                    entries.push((source, outputs));
                }
                Ok(Connections(entries))
            }
        }

        deserializer.deserialize_map(ConnectionsVisitor)
    }
}

/// Full workflow document: nodes, connections and everything else verbatim
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawWorkflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub nodes: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Connections>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawWorkflow {
    pub fn new(nodes: Vec<Node>, connections: Option<Connections>) -> Self {
        Self {
            name: None,
            nodes,
            connections,
            extra: Map::new(),
        }
    }
}
