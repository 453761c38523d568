//! Screen definitions and the compile-once catalog

use std::collections::BTreeMap;
use std::sync::Arc;

use super::builder::ViewBuilder;
use super::error::{CompileError, CompileResult};
use super::schema::ViewSchema;

/// A screen definition
///
/// `compile` builds a fresh tree on every call; callers that want to reuse
/// the result keep it themselves (see [`ViewCatalog`]).
pub trait View: Send + Sync {
    fn name(&self) -> &str;

    /// Builder carrying the relations and translations this view needs
    fn builder(&self) -> ViewBuilder {
        ViewBuilder::new()
    }

    fn define(&self, view: &mut ViewBuilder) -> CompileResult<()>;

    fn compile(&self) -> CompileResult<ViewSchema> {
        let mut builder = self.builder();
        self.define(&mut builder)?;
        builder.to_schema()
    }
}

/// Compiled views by name, built once up front
#[derive(Clone, Debug, Default)]
pub struct ViewCatalog {
    views: BTreeMap<String, Arc<ViewSchema>>,
}

impl ViewCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every view, collecting all failures instead of stopping at the first
    pub fn compile_all<V: View>(views: &[V]) -> Result<Self, Vec<(String, CompileError)>> {
        let mut catalog = Self::new();
        let mut errors = Vec::new();

        for view in views {
            match view.compile() {
                Ok(schema) => {
                    catalog.insert(view.name(), schema);
                }
                Err(e) => errors.push((view.name().to_string(), e)),
            }
        }

        if errors.is_empty() {
            Ok(catalog)
        } else {
            Err(errors)
        }
    }

    pub fn insert(&mut self, name: &str, schema: ViewSchema) {
        tracing::debug!("Compiled view '{}'", name);
        self.views.insert(name.to_string(), Arc::new(schema));
    }

    pub fn get(&self, name: &str) -> Option<Arc<ViewSchema>> {
        self.views.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
