//! Per-node render context

use serde_json::Value;

use super::form_state::{lookup_path, FormState};
use crate::domain::{DrawerRegistry, TranslationsMap};

/// What a node sees while it renders
///
/// `data` feeds rule resolution and DISPLAY_* fields. `form` feeds INPUT_*
/// fields. Array templates render with a scoped copy whose `data` is the
/// array element and whose bindings are prefixed with `<name>.<index>`.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub data: &'a Value,
    pub form: Option<&'a FormState>,
    pub drawers: Option<&'a DrawerRegistry>,
    pub translations: Option<&'a TranslationsMap>,
    pub namespace: Option<&'a str>,
    scope: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            data,
            form: None,
            drawers: None,
            translations: None,
            namespace: None,
            scope: None,
        }
    }

    pub fn with_form(mut self, form: &'a FormState) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_drawers(mut self, drawers: &'a DrawerRegistry) -> Self {
        self.drawers = Some(drawers);
        self
    }

    pub fn with_translations(mut self, translations: &'a TranslationsMap) -> Self {
        self.translations = Some(translations);
        self
    }

    pub fn with_namespace(mut self, namespace: Option<&'a str>) -> Self {
        if namespace.is_some() {
            self.namespace = namespace;
        }
        self
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope
    }

    /// Same context over different data, with bindings nested under `scope`
    pub fn scoped<'b>(&self, data: &'b Value, scope: &'b str) -> RenderContext<'b>
    where
        'a: 'b,
    {
        RenderContext {
            data,
            form: self.form,
            drawers: self.drawers,
            translations: self.translations,
            namespace: self.namespace,
            scope: Some(scope),
        }
    }

    /// Translate `key` in the current namespace
    pub fn t(&self, key: &str) -> String {
        match self.translations {
            Some(translations) => translations.t(key, self.namespace),
            None => key.to_string(),
        }
    }

    /// Full form-state path of a field named `name` in this scope
    pub fn binding(&self, name: &str) -> String {
        match self.scope {
            Some(scope) => format!("{}.{}", scope, name),
            None => name.to_string(),
        }
    }

    /// Value of `name` in the render data
    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        lookup_path(self.data, name)
    }

    /// Current value of an input: live form state first, then the render data
    pub fn input_value(&self, name: &str) -> Value {
        self.form
            .and_then(|form| form.get(&self.binding(name)))
            .or_else(|| self.lookup(name))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scoped_bindings_and_input_values() {
        let data = json!({"addresses_attributes": [{"city": "Oslo"}]});
        let mut form = FormState::new();
        form.set_value("addresses_attributes.0.city", json!("Bergen"));

        let ctx = RenderContext::new(&data).with_form(&form);
        let element = &data["addresses_attributes"][0];
        let scoped = ctx.scoped(element, "addresses_attributes.0");

        assert_eq!(scoped.binding("city"), "addresses_attributes.0.city");
        assert_eq!(scoped.input_value("city"), json!("Bergen"));
        assert_eq!(scoped.lookup("city"), Some(&json!("Oslo")));
    }

    #[test]
    fn test_input_value_falls_back_to_data() {
        let data = json!({"email": "ann@example.com"});
        let ctx = RenderContext::new(&data);
        assert_eq!(ctx.input_value("email"), json!("ann@example.com"));
        assert_eq!(ctx.input_value("missing"), Value::Null);
    }
}
