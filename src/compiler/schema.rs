//! Compiled view: the wire format handed to clients

use serde::{Deserialize, Serialize};

use crate::domain::{Drawer, DrawerRegistry, NodeType, SchemaNode, TranslationsMap};

/// Root of a compiled view: `{type: "VIEW", translations?, drawers?, elements}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewSchema {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<TranslationsMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawers: Option<DrawerRegistry>,
    #[serde(default)]
    pub elements: Vec<SchemaNode>,
}

impl ViewSchema {
    pub fn new(elements: Vec<SchemaNode>) -> Self {
        Self {
            node_type: NodeType::View,
            translations: None,
            drawers: None,
            elements,
        }
    }

    pub fn drawer(&self, name: &str) -> Option<&Drawer> {
        self.drawers.as_ref().and_then(|drawers| drawers.get(name))
    }

    /// The view as a VIEW node, ready to hand to the renderer
    pub fn root(&self) -> SchemaNode {
        let mut node = SchemaNode::new(NodeType::View);
        node.elements = Some(self.elements.clone());
        node
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Every node of the view, drawers included, depth first
    pub fn nodes(&self) -> Vec<&SchemaNode> {
        let mut nodes = Vec::new();
        for element in &self.elements {
            element.walk(&mut |node| nodes.push(node));
        }
        if let Some(drawers) = &self.drawers {
            for drawer in drawers.values() {
                for element in &drawer.elements {
                    element.walk(&mut |node| nodes.push(node));
                }
            }
        }
        nodes
    }
}
