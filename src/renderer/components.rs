//! Built-in node type components

use serde_json::Value;

use super::fields::value_text;
use super::output::{Element, Rendered};
use super::{Component, RenderContext, Renderer};
use crate::domain::record::is_tombstone;
use crate::domain::{NodeType, SchemaNode};
use crate::picker::PickerField;
use crate::resolver::Resolution;

pub(crate) fn register_defaults(renderer: &mut Renderer) {
    renderer
        .register(NodeType::View, Container::new("main"))
        .register(NodeType::Page, Container::new("section").heading("h1"))
        .register(NodeType::Form, Container::new("form"))
        .register(NodeType::Show, Container::new("article"))
        .register(NodeType::Group, Container::new("fieldset").heading("legend"))
        .register(NodeType::CardGroup, Container::new("div"))
        .register(NodeType::Multistep, Container::new("div"))
        .register(NodeType::Step, Container::new("section").heading("h2"))
        .register(NodeType::Drawer, Container::new("aside").heading("h2"))
        .register(NodeType::Actions, Container::new("div"))
        .register(NodeType::Dropdown, Container::new("details").heading("summary"))
        .register(NodeType::Field, FieldDispatch)
        .register(NodeType::Table, Table)
        .register(NodeType::FormArray, Array)
        .register(NodeType::DisplayArray, Array)
        .register(NodeType::Link, Action)
        .register(NodeType::Button, Action)
        .register(NodeType::Option, Action)
        .register(NodeType::Submit, Action)
        .register(NodeType::Search, Search)
        .register(NodeType::Alert, Alert)
        .register(NodeType::RelationshipPicker, Picker);
}

/// Element tagged with the node's type and name
fn node_element(tag: &str, node: &SchemaNode, ctx: &RenderContext<'_>) -> Element {
    let name = node.name.as_deref().map(|name| ctx.binding(name));
    Element::new(tag)
        .with_attr("data-type", node.node_type.as_str())
        .with_opt_attr("name", name)
}

// ============================================================================
// Containers
// ============================================================================

/// Renders `elements` in order inside one wrapping element
#[derive(Clone, Debug)]
pub struct Container {
    tag: &'static str,
    heading: Option<&'static str>,
}

impl Container {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, heading: None }
    }

    /// Show the node's label in a `tag` child
    pub fn heading(mut self, tag: &'static str) -> Self {
        self.heading = Some(tag);
        self
    }
}

impl Component for Container {
    fn render(
        &self,
        renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let ctx = ctx.with_namespace(node.schema.as_deref());
        let mut element = node_element(self.tag, node, &ctx)
            .with_opt_attr("data-schema", node.schema.as_deref())
            .with_flag("disabled", !resolution.enabled);

        if let (Some(tag), Some(label)) = (self.heading, node.label.as_deref()) {
            element = element.with_child(Element::new(tag).with_text(ctx.t(label)));
        }
        if let Some(description) = node.description.as_deref() {
            element = element.with_child(Element::new("p").with_text(ctx.t(description)));
        }

        Some(element.with_children(renderer.render_children(node.elements(), &ctx)).into())
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct FieldDispatch;

impl Component for FieldDispatch {
    fn render(
        &self,
        renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        renderer.render_field(node, ctx, resolution)
    }
}

/// Items of a bound array, tombstoned items excluded, with their original index
fn live_items(value: Option<Value>) -> Vec<(usize, Value)> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !is_tombstone(item))
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Rows of the bound array, one cell per column, row actions from `elements`
#[derive(Clone, Copy, Debug)]
pub struct Table;

impl Component for Table {
    fn render(
        &self,
        renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        _resolution: Resolution,
    ) -> Option<Rendered> {
        let ctx = ctx.with_namespace(node.schema.as_deref());
        let name = node.name.as_deref().unwrap_or_default();
        let columns = node.columns();

        let mut header = Element::new("tr");
        for column in columns {
            let label = column.label.as_deref().unwrap_or(&column.name);
            header = header.with_child(
                Element::new("th")
                    .with_flag("data-sortable", column.sortable)
                    .with_text(ctx.t(label)),
            );
        }
        if !node.elements().is_empty() {
            header = header.with_child(Element::new("th"));
        }

        let rows = ctx
            .lookup(name)
            .cloned()
            .or_else(|| ctx.data.is_array().then(|| ctx.data.clone()));
        let mut body = Element::new("tbody");
        for (index, row) in live_items(rows) {
            let scope = format!("{}.{}", ctx.binding(name), index);
            let row_ctx = ctx.scoped(&row, &scope);
            let mut tr = Element::new("tr").with_opt_attr("data-id", row.get("id").map(value_text));

            for column in columns {
                let mut cell = SchemaNode::named(NodeType::Field, column.name.clone());
                cell.kind = Some(column.kind.clone().unwrap_or_else(|| "DISPLAY_TEXT".to_string()));
                let content = renderer.render_field(&cell, &row_ctx, Resolution::default());
                tr = tr.with_child(Element::new("td").with_children(content));
            }
            if !node.elements().is_empty() {
                let actions = renderer.render_children(node.elements(), &row_ctx);
                tr = tr.with_child(Element::new("td").with_children(actions));
            }
            body = body.with_child(tr);
        }

        Some(
            node_element("table", node, &ctx)
                .with_child(Element::new("thead").with_child(header))
                .with_child(body)
                .into(),
        )
    }
}

// ============================================================================
// Repeatable groups
// ============================================================================

/// FORM_ARRAY / DISPLAY_ARRAY: the template once per element of the bound array
///
/// Each instance resolves rules against its own element and binds its fields
/// under `<name>.<index>`.
#[derive(Clone, Copy, Debug)]
pub struct Array;

impl Component for Array {
    fn render(
        &self,
        renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let name = node.name.as_deref().unwrap_or_default();
        let items = match node.node_type {
            NodeType::FormArray => Some(ctx.input_value(name)),
            _ => ctx.lookup(name).cloned(),
        };

        let mut element = node_element("div", node, ctx).with_flag("disabled", !resolution.enabled);
        if let Some(label) = node.label.as_deref() {
            element = element.with_child(Element::new("h3").with_text(ctx.t(label)));
        }

        for (index, item) in live_items(items) {
            let scope = format!("{}.{}", ctx.binding(name), index);
            let item_ctx = ctx.scoped(&item, &scope);
            element = element.with_child(
                Element::new("div")
                    .with_attr("data-index", index.to_string())
                    .with_children(renderer.render_children(node.template(), &item_ctx)),
            );
        }

        Some(element.into())
    }
}

// ============================================================================
// Actions
// ============================================================================

/// LINK, BUTTON, OPTION and SUBMIT
#[derive(Clone, Copy, Debug)]
pub struct Action;

impl Component for Action {
    fn render(
        &self,
        _renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let label = node.label.as_deref().map(|label| ctx.t(label)).unwrap_or_default();
        let disabled = !resolution.enabled;

        if let Some(drawer) = node.opens.as_deref() {
            if !ctx.drawers.map(|drawers| drawers.contains_key(drawer)).unwrap_or(false) {
                tracing::warn!("'{}' opens drawer '{}' which is not loaded", label, drawer);
            }
        }

        let element = match node.node_type {
            NodeType::Link => Element::new("a")
                .with_opt_attr("href", node.href.as_deref())
                .with_flag("aria-disabled", disabled),
            NodeType::Option => Element::new("li")
                .with_attr("role", "option")
                .with_opt_attr("data-value", node.value.as_ref().map(value_text))
                .with_flag("aria-disabled", disabled),
            NodeType::Submit => Element::new("button")
                .with_attr("type", "submit")
                .with_flag("disabled", disabled),
            _ => Element::new("button")
                .with_attr("type", "button")
                .with_flag("disabled", disabled),
        };

        Some(
            element
                .with_attr("data-type", node.node_type.as_str())
                .with_opt_attr("data-opens", node.opens.as_deref())
                .with_opt_attr("data-variant", node.extra.get("variant").map(value_text))
                .with_text(label)
                .into(),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Search;

impl Component for Search {
    fn render(
        &self,
        _renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let name = node.name.as_deref().unwrap_or("q");
        let value = value_text(&ctx.input_value(name));
        Some(
            node_element("input", node, ctx)
                .with_attr("type", "search")
                .with_opt_attr("placeholder", node.placeholder.as_deref().map(|p| ctx.t(p)))
                .with_opt_attr("value", (!value.is_empty()).then_some(value))
                .with_flag("disabled", !resolution.enabled)
                .into(),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Alert;

impl Component for Alert {
    fn render(
        &self,
        _renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        _resolution: Resolution,
    ) -> Option<Rendered> {
        let mut element = Element::new("div")
            .with_attr("role", "alert")
            .with_attr("data-type", node.node_type.as_str())
            .with_opt_attr("data-variant", node.extra.get("variant").map(value_text));
        if let Some(label) = node.label.as_deref() {
            element = element.with_child(Element::new("strong").with_text(ctx.t(label)));
        }
        if let Some(description) = node.description.as_deref() {
            element = element.with_child(Element::new("p").with_text(ctx.t(description)));
        }
        Some(element.into())
    }
}

// ============================================================================
// Relationship picker
// ============================================================================

/// Layer 1 of the relationship picker: attached items plus the add control
///
/// The create-form template is handed over as JSON for the client-side
/// drawers; it is never rendered inline.
#[derive(Clone, Copy, Debug)]
pub struct Picker;

impl Component for Picker {
    fn render(
        &self,
        _renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let name = node.name.as_deref().unwrap_or_default();
        let field = PickerField::from_node(node, ctx.input_value(name));
        let disabled = !resolution.enabled;

        let mut list = Element::new("ul");
        for (index, item) in field.visible_items() {
            let mut row = Element::new("li")
                .with_attr("data-index", index.to_string())
                .with_opt_attr("data-id", item.id.as_ref().map(ToString::to_string));
            for column in node.columns() {
                let text = item.data.get(&column.name).map(value_text).unwrap_or_default();
                row = row.with_child(
                    Element::new("span")
                        .with_attr("data-column", column.name.as_str())
                        .with_text(text),
                );
            }
            row = row.with_child(
                Element::new("button")
                    .with_attr("type", "button")
                    .with_attr("data-action", "remove")
                    .with_attr("data-index", index.to_string())
                    .with_flag("disabled", disabled)
                    .with_text(ctx.t("remove")),
            );
            list = list.with_child(row);
        }

        let add = Element::new("button")
            .with_attr("type", "button")
            .with_attr("data-action", "add")
            .with_flag("disabled", disabled || !field.can_add())
            .with_text(ctx.t(node.label.as_deref().unwrap_or("add")));

        let template = (!node.template().is_empty())
            .then(|| serde_json::to_string(node.template()).ok())
            .flatten();

        Some(
            node_element("div", node, ctx)
                .with_attr("data-cardinality", field.cardinality().to_string())
                .with_opt_attr("data-resource", node.resource.as_deref())
                .with_opt_attr("data-create-template", template)
                .with_child(list)
                .with_child(add)
                .into(),
        )
    }
}
