//! Optional attributes accepted by every DSL call

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{CompileError, CompileResult};
use crate::domain::{Cardinality, Column, OptionItem, Rule, SchemaNode};

/// Attributes for a DSL call, applied onto the node it appends
///
/// ```
/// use trellis::compiler::NodeAttrs;
/// use trellis::domain::{Condition, Rule};
///
/// let attrs = NodeAttrs::new()
///     .label("Email")
///     .kind("INPUT_EMAIL")
///     .rule(Rule::hide(Condition::eq("contact_by", "phone")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn opens(mut self, drawer: impl Into<String>) -> Self {
        self.opens = Some(drawer.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Type-specific attribute without a dedicated setter
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Copy the attributes onto `node`, rejecting ones its type cannot carry
    pub(crate) fn apply(self, node: &mut SchemaNode) -> CompileResult<()> {
        if self.columns.is_some() && !node.node_type.accepts_columns() {
            return Err(CompileError::InvalidAttribute {
                attribute: "columns".to_string(),
                node_type: node.node_type.clone(),
            });
        }

        node.label = self.label.filter(|s| !s.is_empty());
        node.description = self.description.filter(|s| !s.is_empty());
        node.placeholder = self.placeholder.filter(|s| !s.is_empty());
        node.kind = self.kind.or(node.kind.take());
        node.schema = self.schema;
        node.rules = Some(self.rules).filter(|rules| !rules.is_empty());
        node.columns = self.columns.filter(|columns| !columns.is_empty());
        node.options = self.options.filter(|options| !options.is_empty());
        node.opens = self.opens;
        node.href = self.href;
        node.value = self.value;
        node.cardinality = self.cardinality.or(node.cardinality);
        node.resource = self.resource.or(node.resource.take());
        node.required = self.required;
        node.extra = self
            .extra
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .collect();
        Ok(())
    }
}
