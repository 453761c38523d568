//! Named drawer sub-trees opened lazily by links and options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::node::{NodeType, SchemaNode};

/// A panel compiled once and opened by name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<SchemaNode>,
}

impl Drawer {
    /// View this drawer as a DRAWER node so it renders through the type registry
    pub fn to_node(&self, name: &str) -> SchemaNode {
        let mut node = SchemaNode::named(NodeType::Drawer, name);
        node.label = self.title.clone();
        node.description = self.description.clone();
        node.elements = Some(self.elements.clone());
        node
    }
}

/// Drawer name -> drawer, ordered for deterministic output
pub type DrawerRegistry = BTreeMap<String, Drawer>;
