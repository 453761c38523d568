//! View builder: nested DSL calls compiled through an explicit context stack
//!
//! Every DSL call appends one node to the current context (the top of the
//! stack). Calls taking a block push a fresh context, run the block, pop the
//! captured children into the node and restore the enclosing context.

use std::collections::BTreeSet;

use super::attrs::NodeAttrs;
use super::error::{CompileError, CompileResult};
use super::relation::{Relation, RelationCatalog};
use super::schema::ViewSchema;
use crate::domain::{
    Cardinality, Column, Drawer, DrawerRegistry, NodeType, SchemaNode, TranslationsMap,
};

const DEFAULT_INPUT_KIND: &str = "INPUT_TEXT";
const DEFAULT_DISPLAY_KIND: &str = "DISPLAY_TEXT";

/// Builder for one view definition
#[derive(Debug)]
pub struct ViewBuilder {
    /// Context stack; the last entry receives appended nodes
    stack: Vec<Vec<SchemaNode>>,
    /// Name prefixes pushed by to-one relationships
    prefixes: Vec<String>,
    /// Number of enclosing `form` blocks
    form_depth: usize,
    relations: RelationCatalog,
    drawers: DrawerRegistry,
    translations: TranslationsMap,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![Vec::new()],
            prefixes: Vec::new(),
            form_depth: 0,
            relations: RelationCatalog::new(),
            drawers: DrawerRegistry::new(),
            translations: TranslationsMap::default(),
        }
    }

    /// Declare a relation that `relationship` blocks may refer to
    pub fn with_relation(mut self, name: impl Into<String>, relation: Relation) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    pub fn with_relations(mut self, relations: RelationCatalog) -> Self {
        self.relations.extend(relations);
        self
    }

    pub fn with_translations(mut self, translations: TranslationsMap) -> Self {
        self.translations.merge(translations);
        self
    }

    // ------------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------------

    pub fn page<F>(&mut self, title: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let attrs = with_default_label(attrs, title);
        self.container(NodeType::Page, None, attrs, block)
    }

    /// Input form; fields compiled inside bind to form state
    pub fn form<F>(&mut self, name: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.form_depth += 1;
        let result = self.container(NodeType::Form, Some(name.to_string()), attrs, block);
        self.form_depth -= 1;
        result
    }

    /// Read-only detail view of one record
    pub fn show<F>(&mut self, name: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::Show, Some(name.to_string()), attrs, block)
    }

    pub fn table(
        &mut self,
        name: &str,
        columns: Vec<Column>,
        attrs: NodeAttrs,
    ) -> CompileResult<()> {
        let node = self.node(NodeType::Table, Some(name.to_string()), attrs.columns(columns))?;
        self.push(node);
        Ok(())
    }

    /// Table whose block compiles the per-row actions
    pub fn table_with_actions<F>(
        &mut self,
        name: &str,
        columns: Vec<Column>,
        attrs: NodeAttrs,
        block: F,
    ) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::Table, Some(name.to_string()), attrs.columns(columns), block)
    }

    pub fn group<F>(&mut self, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::Group, None, attrs, block)
    }

    pub fn card_group<F>(&mut self, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::CardGroup, None, attrs, block)
    }

    pub fn multistep<F>(&mut self, name: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::Multistep, Some(name.to_string()), attrs, block)
    }

    pub fn step<F>(&mut self, title: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let attrs = with_default_label(attrs, title);
        self.container(NodeType::Step, None, attrs, block)
    }

    pub fn actions<F>(&mut self, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.container(NodeType::Actions, None, NodeAttrs::new(), block)
    }

    pub fn dropdown<F>(&mut self, label: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let attrs = with_default_label(attrs, label);
        self.container(NodeType::Dropdown, None, attrs, block)
    }

    /// Register a named drawer; it is not appended to the current context
    ///
    /// Drawers are independent panels, so their contents compile outside any
    /// enclosing form or relationship prefix.
    pub fn drawer<F>(&mut self, name: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        if self.drawers.contains_key(name) {
            return Err(CompileError::DuplicateDrawer(name.to_string()));
        }

        let prefixes = std::mem::take(&mut self.prefixes);
        let form_depth = std::mem::replace(&mut self.form_depth, 0);
        let elements = self.capture(block);
        self.prefixes = prefixes;
        self.form_depth = form_depth;

        self.drawers.insert(
            name.to_string(),
            Drawer {
                title: attrs.label,
                description: attrs.description,
                elements: elements?,
            },
        );
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------------

    /// Data-bound input; the kind defaults to INPUT_TEXT
    pub fn field(&mut self, name: &str, attrs: NodeAttrs) -> CompileResult<()> {
        let mut node = self.node(NodeType::Field, Some(self.prefixed(name)), attrs)?;
        node.kind.get_or_insert_with(|| DEFAULT_INPUT_KIND.to_string());
        self.push(node);
        Ok(())
    }

    /// Read-only value; the kind defaults to DISPLAY_TEXT
    pub fn render(&mut self, name: &str, attrs: NodeAttrs) -> CompileResult<()> {
        let mut node = self.node(NodeType::Field, Some(self.prefixed(name)), attrs)?;
        node.kind.get_or_insert_with(|| DEFAULT_DISPLAY_KIND.to_string());
        self.push(node);
        Ok(())
    }

    pub fn link(&mut self, label: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Link, None, with_default_label(attrs, label))
    }

    pub fn button(&mut self, label: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Button, None, with_default_label(attrs, label))
    }

    pub fn option(&mut self, label: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Option, None, with_default_label(attrs, label))
    }

    pub fn search(&mut self, name: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Search, Some(name.to_string()), attrs)
    }

    pub fn submit(&mut self, label: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Submit, None, with_default_label(attrs, label))
    }

    pub fn alert(&mut self, message: &str, attrs: NodeAttrs) -> CompileResult<()> {
        self.leaf(NodeType::Alert, None, with_default_label(attrs, message))
    }

    /// Node of an application-defined type
    pub fn custom(
        &mut self,
        node_type: &str,
        name: Option<&str>,
        attrs: NodeAttrs,
    ) -> CompileResult<()> {
        self.leaf(NodeType::from(node_type), name.map(str::to_string), attrs)
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    /// Nested fields of an associated record
    ///
    /// To-one: the block's field names are prefixed with `<name>_attributes.`
    /// (`<name>.` outside forms). To-many: the block compiles once into the
    /// `template` of a FORM_ARRAY named `<name>_attributes` (a DISPLAY_ARRAY
    /// named `<name>` outside forms), without renaming.
    pub fn relationship<F>(&mut self, name: &str, attrs: NodeAttrs, block: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let relation = self.lookup_relation(name, attrs.cardinality)?;
        let segment = if self.in_form() {
            format!("{}_attributes", name)
        } else {
            name.to_string()
        };
        let bound_name = self.prefixed(&segment);

        let (node_type, children, slot) = match relation.cardinality {
            Cardinality::One => {
                self.prefixes.push(segment);
                let children = self.capture(block);
                self.prefixes.pop();
                (NodeType::Group, children?, Slot::Elements)
            }
            Cardinality::Many => {
                let prefixes = std::mem::take(&mut self.prefixes);
                let children = self.capture(block);
                self.prefixes = prefixes;
                let node_type = if self.in_form() {
                    NodeType::FormArray
                } else {
                    NodeType::DisplayArray
                };
                (node_type, children?, Slot::Template)
            }
        };

        if children.is_empty() {
            return Err(CompileError::MissingBlock {
                call: "relationship".to_string(),
                name: name.to_string(),
            });
        }

        let mut node = self.node(node_type, Some(bound_name), attrs)?;
        node.cardinality = Some(relation.cardinality);
        match slot {
            Slot::Elements => node.elements = Some(children),
            Slot::Template => node.template = Some(children),
        }
        self.push(node);
        Ok(())
    }

    /// Attach-or-create picker without a create form
    pub fn relationship_picker(&mut self, name: &str, attrs: NodeAttrs) -> CompileResult<()> {
        let node = self.picker_node(name, attrs)?;
        self.push(node);
        Ok(())
    }

    /// Attach-or-create picker whose block compiles the create form
    pub fn relationship_picker_with_create<F>(
        &mut self,
        name: &str,
        attrs: NodeAttrs,
        block: F,
    ) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let mut node = self.picker_node(name, attrs)?;

        let prefixes = std::mem::take(&mut self.prefixes);
        self.form_depth += 1;
        let template = self.capture(block);
        self.form_depth -= 1;
        self.prefixes = prefixes;

        node.template = Some(template?).filter(|nodes| !nodes.is_empty());
        self.push(node);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Finish the view: `{type: "VIEW", translations?, drawers?, elements}`
    ///
    /// Fails when a LINK or OPTION opens a drawer that was never registered.
    pub fn to_schema(mut self) -> CompileResult<ViewSchema> {
        let elements = self.stack.drain(..).flatten().collect();
        let mut schema = ViewSchema::new(elements);
        schema.translations = Some(self.translations).filter(|t| !t.is_empty());
        schema.drawers = Some(self.drawers).filter(|d| !d.is_empty());

        let registered: BTreeSet<&str> = schema
            .drawers
            .iter()
            .flat_map(|drawers| drawers.keys().map(String::as_str))
            .collect();
        for node in schema.nodes() {
            if let Some(drawer) = node.opens.as_deref() {
                if !registered.contains(drawer) {
                    let opener = node
                        .label
                        .as_ref()
                        .map(|label| format!("{} '{}'", node.node_type, label))
                        .unwrap_or_else(|| node.node_type.to_string());
                    return Err(CompileError::UnknownDrawer {
                        opener,
                        drawer: drawer.to_string(),
                    });
                }
            }
        }

        Ok(schema)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn in_form(&self) -> bool {
        self.form_depth > 0
    }

    fn prefixed(&self, name: &str) -> String {
        if self.prefixes.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.prefixes.join("."), name)
        }
    }

    fn lookup_relation(
        &self,
        name: &str,
        requested: Option<Cardinality>,
    ) -> CompileResult<Relation> {
        let relation = self
            .relations
            .get(name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownRelation {
                name: name.to_string(),
            })?;

        match requested {
            Some(requested) if requested != relation.cardinality => {
                Err(CompileError::CardinalityMismatch {
                    name: name.to_string(),
                    declared: relation.cardinality,
                    requested,
                })
            }
            _ => Ok(relation),
        }
    }

    fn picker_node(&self, name: &str, attrs: NodeAttrs) -> CompileResult<SchemaNode> {
        let relation = self.lookup_relation(name, attrs.cardinality)?;
        let resource = attrs
            .resource
            .clone()
            .or(relation.resource)
            .ok_or_else(|| CompileError::MissingAttribute {
                call: format!("relationship_picker '{}'", name),
                attribute: "resource".to_string(),
            })?;

        let mut node = self.node(NodeType::RelationshipPicker, Some(self.prefixed(name)), attrs)?;
        node.cardinality = Some(relation.cardinality);
        node.resource = Some(resource);
        Ok(node)
    }

    fn node(
        &self,
        node_type: NodeType,
        name: Option<String>,
        attrs: NodeAttrs,
    ) -> CompileResult<SchemaNode> {
        let mut node = SchemaNode::new(node_type);
        node.name = name;
        attrs.apply(&mut node)?;
        Ok(node)
    }

    fn leaf(
        &mut self,
        node_type: NodeType,
        name: Option<String>,
        attrs: NodeAttrs,
    ) -> CompileResult<()> {
        let node = self.node(node_type, name, attrs)?;
        self.push(node);
        Ok(())
    }

    fn container<F>(
        &mut self,
        node_type: NodeType,
        name: Option<String>,
        attrs: NodeAttrs,
        block: F,
    ) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        let mut node = self.node(node_type, name, attrs)?;
        let children = self.capture(block)?;
        node.elements = Some(children).filter(|children| !children.is_empty());
        self.push(node);
        Ok(())
    }

    /// Run `block` against a fresh context and return what it appended
    ///
    /// The enclosing context is restored whether or not the block succeeds.
    fn capture<F>(&mut self, block: F) -> CompileResult<Vec<SchemaNode>>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.stack.push(Vec::new());
        let result = block(self);
        let children = self.stack.pop().unwrap_or_default();
        result.map(|_| children)
    }

    fn push(&mut self, node: SchemaNode) {
        match self.stack.last_mut() {
            Some(context) => context.push(node),
            None => self.stack.push(vec![node]),
        }
    }
}

enum Slot {
    Elements,
    Template,
}

fn with_default_label(attrs: NodeAttrs, label: &str) -> NodeAttrs {
    if attrs.label.is_some() || label.is_empty() {
        attrs
    } else {
        attrs.label(label)
    }
}
