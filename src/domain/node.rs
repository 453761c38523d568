//! Schema node tree shared by the compiler and the renderer

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::rule::Rule;

// ============================================================================
// Node Type
// ============================================================================

/// Discriminant of a schema node (`type` on the wire)
///
/// Unknown strings survive a round trip as [`NodeType::Custom`] so that
/// applications can register renderers for their own node types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    View,
    Page,
    Form,
    Table,
    Show,
    Group,
    CardGroup,
    Multistep,
    Step,
    FormArray,
    DisplayArray,
    Drawer,
    Actions,
    Dropdown,
    Field,
    Link,
    Button,
    Option,
    Search,
    Submit,
    Alert,
    RelationshipPicker,
    Custom(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::View => "VIEW",
            NodeType::Page => "PAGE",
            NodeType::Form => "FORM",
            NodeType::Table => "TABLE",
            NodeType::Show => "SHOW",
            NodeType::Group => "GROUP",
            NodeType::CardGroup => "CARD_GROUP",
            NodeType::Multistep => "MULTISTEP",
            NodeType::Step => "STEP",
            NodeType::FormArray => "FORM_ARRAY",
            NodeType::DisplayArray => "DISPLAY_ARRAY",
            NodeType::Drawer => "DRAWER",
            NodeType::Actions => "ACTIONS",
            NodeType::Dropdown => "DROPDOWN",
            NodeType::Field => "FIELD",
            NodeType::Link => "LINK",
            NodeType::Button => "BUTTON",
            NodeType::Option => "OPTION",
            NodeType::Search => "SEARCH",
            NodeType::Submit => "SUBMIT",
            NodeType::Alert => "ALERT",
            NodeType::RelationshipPicker => "RELATIONSHIP_PICKER",
            NodeType::Custom(name) => name,
        }
    }

    /// Whether nodes of this type may carry `columns`
    pub fn accepts_columns(&self) -> bool {
        matches!(self, NodeType::Table | NodeType::RelationshipPicker)
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "VIEW" => NodeType::View,
            "PAGE" => NodeType::Page,
            "FORM" => NodeType::Form,
            "TABLE" => NodeType::Table,
            "SHOW" => NodeType::Show,
            "GROUP" => NodeType::Group,
            "CARD_GROUP" => NodeType::CardGroup,
            "MULTISTEP" => NodeType::Multistep,
            "STEP" => NodeType::Step,
            "FORM_ARRAY" => NodeType::FormArray,
            "DISPLAY_ARRAY" => NodeType::DisplayArray,
            "DRAWER" => NodeType::Drawer,
            "ACTIONS" => NodeType::Actions,
            "DROPDOWN" => NodeType::Dropdown,
            "FIELD" => NodeType::Field,
            "LINK" => NodeType::Link,
            "BUTTON" => NodeType::Button,
            "OPTION" => NodeType::Option,
            "SEARCH" => NodeType::Search,
            "SUBMIT" => NodeType::Submit,
            "ALERT" => NodeType::Alert,
            "RELATIONSHIP_PICKER" => NodeType::RelationshipPicker,
            _ => NodeType::Custom(value),
        }
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        NodeType::from(value.to_string())
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

/// Whether a relationship binds to a single record or to a collection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => f.write_str("one"),
            Cardinality::Many => f.write_str("many"),
        }
    }
}

// ============================================================================
// Columns and Options
// ============================================================================

/// Column descriptor for tables and relationship pickers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sortable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            label: None,
            sortable: false,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Choice for select-like inputs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub value: Value,
    pub label: String,
}

impl OptionItem {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// ============================================================================
// Schema Node
// ============================================================================

/// One element of the compiled UI tree
///
/// Optional attributes are omitted from the serialized form when absent, so
/// two nodes built from the same definition always serialize identically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Entity schema tag; doubles as the translation namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionItem>>,
    /// Drawer opened by a LINK or OPTION
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Literal value shown by DISPLAY_* fields instead of the bound data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    /// Endpoint base path of the records a picker attaches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Type-specific attributes that have no dedicated field
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    pub fn new(node_type: impl Into<NodeType>) -> Self {
        Self {
            node_type: node_type.into(),
            name: None,
            label: None,
            description: None,
            placeholder: None,
            kind: None,
            schema: None,
            rules: None,
            elements: None,
            template: None,
            columns: None,
            options: None,
            opens: None,
            href: None,
            value: None,
            cardinality: None,
            resource: None,
            required: false,
            extra: Map::new(),
        }
    }

    pub fn named(node_type: impl Into<NodeType>, name: impl Into<String>) -> Self {
        let mut node = Self::new(node_type);
        node.name = Some(name.into());
        node
    }

    /// Rules attached to this node, empty when none were declared
    pub fn rules(&self) -> &[Rule] {
        self.rules.as_deref().unwrap_or(&[])
    }

    /// Child nodes rendered in document order
    pub fn elements(&self) -> &[SchemaNode] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Sub-tree repeated once per array instance
    pub fn template(&self) -> &[SchemaNode] {
        self.template.as_deref().unwrap_or(&[])
    }

    pub fn columns(&self) -> &[Column] {
        self.columns.as_deref().unwrap_or(&[])
    }

    /// Depth-first walk over this node and every descendant, templates included
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SchemaNode)) {
        visit(self);
        for child in self.elements().iter().chain(self.template()) {
            child.walk(visit);
        }
    }
}
