//! Schema tree model, rules, translations and the external record contract

pub mod drawer;
pub mod node;
pub mod record;
pub mod rule;
pub mod translations;

pub use drawer::{Drawer, DrawerRegistry};
pub use node::{Cardinality, Column, NodeType, OptionItem, SchemaNode};
pub use record::{
    ListQuery, ListResponse, Pagination, Record, RecordError, RecordId, RecordPort, RecordResult,
};
pub use rule::{Condition, Effect, Operator, Rule};
pub use translations::TranslationsMap;
