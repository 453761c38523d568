//! Relations a view may compile `relationship` blocks against

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::Cardinality;

/// Declared association of the entity behind a view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub cardinality: Cardinality,
    /// Endpoint base path used by relationship pickers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl Relation {
    pub fn one() -> Self {
        Self {
            cardinality: Cardinality::One,
            resource: None,
        }
    }

    pub fn many() -> Self {
        Self {
            cardinality: Cardinality::Many,
            resource: None,
        }
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

pub type RelationCatalog = BTreeMap<String, Relation>;
