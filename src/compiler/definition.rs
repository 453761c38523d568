//! Declarative view definitions (JSON / YAML)
//!
//! A definition file describes the same DSL calls as Rust code does:
//!
//! ```yaml
//! name: person_form
//! relations:
//!   addresses: { cardinality: many }
//! elements:
//!   - node: form
//!     name: person
//!     elements:
//!       - node: field
//!         name: first_name
//!       - node: relationship
//!         name: addresses
//!         elements:
//!           - node: field
//!             name: city
//! ```
//!
//! Compiling a definition drives [`ViewBuilder`], so definition files fail
//! with the same errors as Rust-defined views.

use serde::{Deserialize, Serialize};

use super::attrs::NodeAttrs;
use super::builder::ViewBuilder;
use super::error::{CompileError, CompileResult};
use super::relation::RelationCatalog;
use super::view::View;
use crate::domain::{NodeType, TranslationsMap};

/// DSL call named by a definition entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DslCall {
    Page,
    Form,
    Show,
    Table,
    Group,
    CardGroup,
    Multistep,
    Step,
    Actions,
    Dropdown,
    Field,
    Render,
    Link,
    Button,
    Option,
    Search,
    Submit,
    Alert,
    Relationship,
    RelationshipPicker,
}

impl DslCall {
    fn as_str(&self) -> &'static str {
        match self {
            DslCall::Page => "page",
            DslCall::Form => "form",
            DslCall::Show => "show",
            DslCall::Table => "table",
            DslCall::Group => "group",
            DslCall::CardGroup => "card_group",
            DslCall::Multistep => "multistep",
            DslCall::Step => "step",
            DslCall::Actions => "actions",
            DslCall::Dropdown => "dropdown",
            DslCall::Field => "field",
            DslCall::Render => "render",
            DslCall::Link => "link",
            DslCall::Button => "button",
            DslCall::Option => "option",
            DslCall::Search => "search",
            DslCall::Submit => "submit",
            DslCall::Alert => "alert",
            DslCall::Relationship => "relationship",
            DslCall::RelationshipPicker => "relationship_picker",
        }
    }

    fn leaf_type(&self) -> Option<NodeType> {
        match self {
            DslCall::Field | DslCall::Render => Some(NodeType::Field),
            DslCall::Link => Some(NodeType::Link),
            DslCall::Button => Some(NodeType::Button),
            DslCall::Option => Some(NodeType::Option),
            DslCall::Search => Some(NodeType::Search),
            DslCall::Submit => Some(NodeType::Submit),
            DslCall::Alert => Some(NodeType::Alert),
            _ => None,
        }
    }
}

/// One DSL call with its attributes and nested block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub node: DslCall,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<NodeDefinition>>,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawerDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub elements: Vec<NodeDefinition>,
}

/// A complete view loaded from a definition file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub name: String,
    #[serde(default)]
    pub relations: RelationCatalog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<TranslationsMap>,
    #[serde(default)]
    pub drawers: Vec<DrawerDefinition>,
    #[serde(default)]
    pub elements: Vec<NodeDefinition>,
}

impl View for ViewDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn builder(&self) -> ViewBuilder {
        ViewBuilder::new()
            .with_relations(self.relations.clone())
            .with_translations(self.translations.clone().unwrap_or_default())
    }

    fn define(&self, view: &mut ViewBuilder) -> CompileResult<()> {
        for drawer in &self.drawers {
            let mut attrs = NodeAttrs::new();
            attrs.label = drawer.title.clone();
            attrs.description = drawer.description.clone();
            view.drawer(&drawer.name, attrs, |d| compile_nodes(d, &drawer.elements))?;
        }
        compile_nodes(view, &self.elements)
    }
}

fn compile_nodes(view: &mut ViewBuilder, nodes: &[NodeDefinition]) -> CompileResult<()> {
    for node in nodes {
        compile_node(view, node)?;
    }
    Ok(())
}

fn compile_node(view: &mut ViewBuilder, def: &NodeDefinition) -> CompileResult<()> {
    let mut attrs = def.attrs.clone();
    let children = def.elements.as_deref().unwrap_or(&[]);
    let block = |b: &mut ViewBuilder| compile_nodes(b, children);
    let label = def.name.as_deref().unwrap_or_default();

    if def.elements.is_some() {
        if let Some(node_type) = def.node.leaf_type() {
            return Err(CompileError::InvalidAttribute {
                attribute: "elements".to_string(),
                node_type,
            });
        }
    }

    match def.node {
        DslCall::Page => view.page(label, attrs, block),
        DslCall::Form => view.form(required_name(def)?, attrs, block),
        DslCall::Show => view.show(required_name(def)?, attrs, block),
        DslCall::Table => {
            let columns = attrs.columns.take().unwrap_or_default();
            if def.elements.is_some() {
                view.table_with_actions(required_name(def)?, columns, attrs, block)
            } else {
                view.table(required_name(def)?, columns, attrs)
            }
        }
        DslCall::Group => view.group(attrs, block),
        DslCall::CardGroup => view.card_group(attrs, block),
        DslCall::Multistep => view.multistep(required_name(def)?, attrs, block),
        DslCall::Step => view.step(label, attrs, block),
        DslCall::Actions => view.actions(block),
        DslCall::Dropdown => view.dropdown(label, attrs, block),
        DslCall::Field => view.field(required_name(def)?, attrs),
        DslCall::Render => view.render(required_name(def)?, attrs),
        DslCall::Link => view.link(label, attrs),
        DslCall::Button => view.button(label, attrs),
        DslCall::Option => view.option(label, attrs),
        DslCall::Search => view.search(required_name(def)?, attrs),
        DslCall::Submit => view.submit(label, attrs),
        DslCall::Alert => view.alert(label, attrs),
        DslCall::Relationship => {
            let name = required_name(def)?;
            if def.elements.is_none() {
                return Err(CompileError::MissingBlock {
                    call: def.node.as_str().to_string(),
                    name: name.to_string(),
                });
            }
            view.relationship(name, attrs, block)
        }
        DslCall::RelationshipPicker => {
            let name = required_name(def)?;
            if def.elements.is_some() {
                view.relationship_picker_with_create(name, attrs, block)
            } else {
                view.relationship_picker(name, attrs)
            }
        }
    }
}

fn required_name(def: &NodeDefinition) -> CompileResult<&str> {
    def.name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CompileError::MissingAttribute {
            call: def.node.as_str().to_string(),
            attribute: "name".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PERSON_YAML: &str = r#"
name: person_form
relations:
  spouse: { cardinality: one }
  contacts: { cardinality: many, resource: /contacts }
translations:
  views:
    title: Person
drawers:
  - name: help
    title: Help
    elements:
      - node: alert
        label: Fill in every field
elements:
  - node: form
    name: person
    schema: person
    elements:
      - node: field
        name: first_name
        label: First name
        required: true
      - node: field
        name: role
        kind: INPUT_SELECT
        options:
          - { value: admin, label: Admin }
          - { value: user, label: User }
      - node: relationship
        name: spouse
        elements:
          - node: field
            name: first_name
      - node: relationship_picker
        name: contacts
        columns:
          - { name: name, label: Name, sortable: true }
        elements:
          - node: field
            name: name
      - node: link
        label: Help
        opens: help
      - node: submit
        label: Save
        variant: primary
"#;

    #[test]
    fn test_yaml_definition_compiles() {
        let definition: ViewDefinition = serde_yaml::from_str(PERSON_YAML).unwrap();
        let schema = definition.compile().unwrap();

        let form = &schema.elements[0];
        assert_eq!(form.schema.as_deref(), Some("person"));
        let names: Vec<_> = form.elements().iter().map(|n| n.node_type.clone()).collect();
        assert_eq!(
            names,
            vec![
                NodeType::Field,
                NodeType::Field,
                NodeType::Group,
                NodeType::RelationshipPicker,
                NodeType::Link,
                NodeType::Submit
            ]
        );
        assert_eq!(
            form.elements()[2].elements()[0].name.as_deref(),
            Some("spouse_attributes.first_name")
        );
        assert_eq!(form.elements()[3].resource.as_deref(), Some("/contacts"));
        assert_eq!(form.elements()[5].extra.get("variant"), Some(&json!("primary")));
        assert_eq!(schema.drawer("help").unwrap().title.as_deref(), Some("Help"));
        assert_eq!(schema.translations.unwrap().t("title", None), "Person");
    }

    #[test]
    fn test_definition_compiles_deterministically() {
        let definition: ViewDefinition = serde_yaml::from_str(PERSON_YAML).unwrap();
        let first = definition.compile().unwrap();
        let second = definition.compile().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_relationship_without_block_fails() {
        let definition: ViewDefinition = serde_json::from_value(json!({
            "name": "broken",
            "relations": {"spouse": {"cardinality": "one"}},
            "elements": [
                {"node": "form", "name": "person", "elements": [
                    {"node": "relationship", "name": "spouse"}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(
            definition.compile().unwrap_err(),
            CompileError::MissingBlock {
                call: "relationship".into(),
                name: "spouse".into()
            }
        );
    }

    #[test]
    fn test_field_without_name_fails() {
        let definition: ViewDefinition = serde_json::from_value(json!({
            "name": "broken",
            "elements": [{"node": "field", "label": "Nameless"}]
        }))
        .unwrap();

        assert!(matches!(
            definition.compile().unwrap_err(),
            CompileError::MissingAttribute { .. }
        ));
    }

    #[test]
    fn test_leaf_with_children_fails() {
        let definition: ViewDefinition = serde_json::from_value(json!({
            "name": "broken",
            "elements": [{"node": "button", "label": "Go", "elements": []}]
        }))
        .unwrap();

        assert!(matches!(
            definition.compile().unwrap_err(),
            CompileError::InvalidAttribute { .. }
        ));
    }
}
