//! Translation lookup consumed by the renderer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type TranslationTable = BTreeMap<String, String>;

/// Flat key lookup tables shipped alongside a compiled view
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationsMap {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub views: TranslationTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub common: TranslationTable,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, TranslationTable>,
}

impl TranslationsMap {
    pub fn is_empty(&self) -> bool {
        self.views.is_empty() && self.common.is_empty() && self.schemas.is_empty()
    }

    /// Look up `key`, falling back views -> common -> schemas[namespace] -> the key itself
    pub fn t(&self, key: &str, namespace: Option<&str>) -> String {
        self.views
            .get(key)
            .or_else(|| self.common.get(key))
            .or_else(|| {
                namespace
                    .and_then(|ns| self.schemas.get(ns))
                    .and_then(|table| table.get(key))
            })
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Merge `other` into this map; entries from `other` win
    pub fn merge(&mut self, other: TranslationsMap) {
        self.views.extend(other.views);
        self.common.extend(other.common);
        for (namespace, table) in other.schemas {
            self.schemas.entry(namespace).or_default().extend(table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TranslationsMap {
        let mut map = TranslationsMap::default();
        map.views.insert("title".into(), "People".into());
        map.common.insert("title".into(), "Common title".into());
        map.common.insert("save".into(), "Save".into());
        map.schemas
            .entry("contact".into())
            .or_default()
            .insert("first_name".into(), "First name".into());
        map
    }

    #[test]
    fn test_lookup_order() {
        let map = sample();
        assert_eq!(map.t("title", None), "People");
        assert_eq!(map.t("save", Some("contact")), "Save");
        assert_eq!(map.t("first_name", Some("contact")), "First name");
    }

    #[test]
    fn test_missing_key_falls_back_to_raw_key() {
        let map = sample();
        assert_eq!(map.t("first_name", None), "first_name");
        assert_eq!(map.t("first_name", Some("company")), "first_name");
        assert_eq!(map.t("unknown.key", Some("contact")), "unknown.key");
    }
}
