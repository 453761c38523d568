//! Dynamic renderer: walks a compiled tree and dispatches on `type` and `kind`
//!
//! Node types map to [`Component`]s and field kinds map to
//! [`FieldComponent`]s. Both registries are plain maps, so applications can
//! override any default or add their own types and kinds. Anything that cannot
//! be rendered logs a warning and renders as nothing; siblings are unaffected.

pub mod components;
pub mod context;
pub mod fields;
pub mod form_state;
pub mod output;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::compiler::ViewSchema;
use crate::domain::{NodeType, SchemaNode};
use crate::resolver::{resolve, Resolution};

pub use context::RenderContext;
pub use form_state::{lookup_path, FormState};
pub use output::{Element, Rendered};

const INPUT_PREFIX: &str = "INPUT_";
const DISPLAY_PREFIX: &str = "DISPLAY_";

// ============================================================================
// Component Traits
// ============================================================================

/// Renders one node type
///
/// Called only for visible nodes; `resolution.enabled` is passed along so
/// containers and controls can show a disabled state.
pub trait Component: Send + Sync {
    fn render(
        &self,
        renderer: &Renderer,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered>;
}

/// How a field participates in the form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldMode {
    /// Bound to form state; `disabled` is the complement of the resolved `enabled`
    Input { disabled: bool },
    /// Read-only
    Display,
}

/// Everything a field component needs, already resolved
#[derive(Clone, Debug)]
pub struct FieldProps<'a> {
    pub node: &'a SchemaNode,
    /// Form-state path written back on change
    pub binding: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub value: Value,
    pub error: Option<String>,
    pub mode: FieldMode,
}

impl FieldProps<'_> {
    pub fn disabled(&self) -> bool {
        matches!(self.mode, FieldMode::Input { disabled: true })
    }
}

/// Renders one field kind (`INPUT_TEXT`, `DISPLAY_BADGE`, ...)
pub trait FieldComponent: Send + Sync {
    fn render(&self, props: &FieldProps<'_>) -> Rendered;
}

struct KindFn<F>(F);

impl<F> FieldComponent for KindFn<F>
where
    F: Fn(&FieldProps<'_>) -> Rendered + Send + Sync,
{
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        (self.0)(props)
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Type and kind registries plus the recursive walk
#[derive(Clone, Default)]
pub struct Renderer {
    components: HashMap<String, Arc<dyn Component>>,
    kinds: HashMap<String, Arc<dyn FieldComponent>>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.components.keys().collect();
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        types.sort();
        kinds.sort();
        f.debug_struct("Renderer")
            .field("types", &types)
            .field("kinds", &kinds)
            .finish()
    }
}

impl Renderer {
    /// Empty registries; every node renders as nothing until registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries filled with the built-in components and field kinds
    pub fn with_defaults() -> Self {
        let mut renderer = Self::new();
        components::register_defaults(&mut renderer);
        fields::register_defaults(&mut renderer);
        renderer
    }

    pub fn register(
        &mut self,
        node_type: impl Into<NodeType>,
        component: impl Component + 'static,
    ) -> &mut Self {
        self.components
            .insert(node_type.into().as_str().to_string(), Arc::new(component));
        self
    }

    pub fn register_kind(
        &mut self,
        kind: &str,
        component: impl FieldComponent + 'static,
    ) -> &mut Self {
        self.kinds.insert(kind.to_string(), Arc::new(component));
        self
    }

    pub fn register_kind_fn<F>(&mut self, kind: &str, render: F) -> &mut Self
    where
        F: Fn(&FieldProps<'_>) -> Rendered + Send + Sync + 'static,
    {
        self.register_kind(kind, KindFn(render))
    }

    pub fn has_type(&self, node_type: &NodeType) -> bool {
        self.components.contains_key(node_type.as_str())
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Render `node` and its subtree, or nothing if it is hidden or unknown
    pub fn render(&self, node: &SchemaNode, ctx: &RenderContext<'_>) -> Option<Rendered> {
        let resolution = resolve(node.rules(), ctx.data);
        if !resolution.visible {
            return None;
        }

        let Some(component) = self.components.get(node.node_type.as_str()) else {
            tracing::warn!(
                "No component registered for node type '{}' ({})",
                node.node_type,
                node.name.as_deref().unwrap_or("unnamed")
            );
            return None;
        };

        component.render(self, node, ctx, resolution)
    }

    /// Render `nodes` in document order, dropping the ones that render nothing
    pub fn render_children(&self, nodes: &[SchemaNode], ctx: &RenderContext<'_>) -> Vec<Rendered> {
        nodes.iter().filter_map(|node| self.render(node, ctx)).collect()
    }

    /// Dispatch a FIELD node by its kind prefix
    pub fn render_field(
        &self,
        node: &SchemaNode,
        ctx: &RenderContext<'_>,
        resolution: Resolution,
    ) -> Option<Rendered> {
        let name = node.name.as_deref().unwrap_or_default();
        let Some(kind) = node.kind.as_deref() else {
            tracing::warn!("Field '{}' has no kind", name);
            return None;
        };

        let mode = if kind.starts_with(INPUT_PREFIX) {
            FieldMode::Input {
                disabled: !resolution.enabled,
            }
        } else if kind.starts_with(DISPLAY_PREFIX) {
            FieldMode::Display
        } else {
            tracing::warn!("Field '{}' has unsupported kind '{}'", name, kind);
            return None;
        };

        let Some(component) = self.kinds.get(kind) else {
            tracing::warn!("No field component registered for kind '{}' ({})", kind, name);
            return None;
        };

        let binding = ctx.binding(name);
        let value = match mode {
            FieldMode::Input { .. } => ctx.input_value(name),
            FieldMode::Display => node
                .value
                .clone()
                .or_else(|| ctx.lookup(name).cloned())
                .unwrap_or(Value::Null),
        };
        let error = match mode {
            FieldMode::Input { .. } => ctx
                .form
                .and_then(|form| form.error(&binding))
                .map(str::to_string),
            FieldMode::Display => None,
        };

        let props = FieldProps {
            node,
            label: node.label.as_deref().map(|label| ctx.t(label)),
            placeholder: node.placeholder.as_deref().map(|p| ctx.t(p)),
            binding,
            value,
            error,
            mode,
        };
        Some(component.render(&props))
    }

    /// Render a compiled view against record data and optional live form state
    pub fn render_view(
        &self,
        schema: &ViewSchema,
        data: &Value,
        form: Option<&FormState>,
    ) -> Option<Rendered> {
        let mut ctx = RenderContext::new(data);
        if let Some(form) = form {
            ctx = ctx.with_form(form);
        }
        if let Some(drawers) = &schema.drawers {
            ctx = ctx.with_drawers(drawers);
        }
        if let Some(translations) = &schema.translations {
            ctx = ctx.with_translations(translations);
        }
        self.render(&schema.root(), &ctx)
    }

    /// Render a registered drawer by name
    pub fn render_drawer(&self, name: &str, ctx: &RenderContext<'_>) -> Option<Rendered> {
        let Some(drawer) = ctx.drawers.and_then(|drawers| drawers.get(name)) else {
            tracing::warn!("Drawer '{}' is not registered", name);
            return None;
        };
        self.render(&drawer.to_node(name), ctx)
    }
}

#[cfg(test)]
mod renderer_test;
