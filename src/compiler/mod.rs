//! Schema compiler: DSL calls -> normalized schema-node tree
//!
//! ```
//! use trellis::compiler::{NodeAttrs, Relation, ViewBuilder};
//!
//! let mut view = ViewBuilder::new().with_relation("addresses", Relation::many());
//! view.form("person", NodeAttrs::new(), |f| {
//!     f.field("first_name", NodeAttrs::new().label("First name"))?;
//!     f.relationship("addresses", NodeAttrs::new(), |a| a.field("city", NodeAttrs::new()))
//! })?;
//! let schema = view.to_schema()?;
//! assert_eq!(schema.elements[0].elements()[1].name.as_deref(), Some("addresses_attributes"));
//! # Ok::<(), trellis::compiler::CompileError>(())
//! ```

pub mod attrs;
pub mod builder;
pub mod definition;
pub mod error;
pub mod relation;
pub mod schema;
pub mod view;

pub use attrs::NodeAttrs;
pub use builder::ViewBuilder;
pub use definition::{DrawerDefinition, DslCall, NodeDefinition, ViewDefinition};
pub use error::{CompileError, CompileResult};
pub use relation::{Relation, RelationCatalog};
pub use schema::ViewSchema;
pub use view::{View, ViewCatalog};
