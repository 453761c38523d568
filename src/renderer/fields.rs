//! Built-in field kinds

use serde_json::Value;

use super::output::{Element, Rendered};
use super::{FieldComponent, FieldProps, Renderer};

pub(crate) fn register_defaults(renderer: &mut Renderer) {
    for (kind, input_type) in [
        ("INPUT_TEXT", "text"),
        ("INPUT_EMAIL", "email"),
        ("INPUT_NUMBER", "number"),
        ("INPUT_DATE", "date"),
        ("INPUT_PASSWORD", "password"),
    ] {
        renderer.register_kind(kind, TextInput { input_type });
    }

    renderer
        .register_kind("INPUT_TEXTAREA", TextArea)
        .register_kind("INPUT_CHECKBOX", Checkbox)
        .register_kind("INPUT_SELECT", Select)
        .register_kind("INPUT_RADIO", Radio)
        .register_kind("DISPLAY_TEXT", DisplayText { tag: "span" })
        .register_kind("DISPLAY_DATE", DisplayText { tag: "time" })
        .register_kind("DISPLAY_BADGE", DisplayText { tag: "mark" })
        .register_kind("DISPLAY_BOOLEAN", DisplayBoolean);
}

/// Plain text of a JSON value as shown to users
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// `<label>` wrapper with the error message underneath
fn labelled(props: &FieldProps<'_>, control: Element) -> Rendered {
    let mut wrapper = Element::new("label")
        .with_attr("data-kind", props.node.kind.as_deref().unwrap_or_default())
        .with_attr("for", props.binding.as_str());
    if let Some(label) = &props.label {
        wrapper = wrapper.with_child(Element::new("span").with_text(label.as_str()));
    }
    wrapper = wrapper.with_child(control);
    if let Some(error) = &props.error {
        wrapper = wrapper.with_child(
            Element::new("small")
                .with_attr("role", "alert")
                .with_text(error.as_str()),
        );
    }
    wrapper.into()
}

fn control(tag: &str, props: &FieldProps<'_>) -> Element {
    Element::new(tag)
        .with_attr("id", props.binding.as_str())
        .with_attr("name", props.binding.as_str())
        .with_opt_attr("placeholder", props.placeholder.as_deref())
        .with_flag("required", props.node.required)
        .with_flag("disabled", props.disabled())
}

#[derive(Clone, Copy, Debug)]
pub struct TextInput {
    input_type: &'static str,
}

impl FieldComponent for TextInput {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let value = value_text(&props.value);
        let input = control("input", props)
            .with_attr("type", self.input_type)
            .with_opt_attr("value", (!value.is_empty()).then_some(value));
        labelled(props, input)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TextArea;

impl FieldComponent for TextArea {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        labelled(props, control("textarea", props).with_text(value_text(&props.value)))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Checkbox;

impl FieldComponent for Checkbox {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let checked = matches!(props.value, Value::Bool(true));
        labelled(
            props,
            control("input", props)
                .with_attr("type", "checkbox")
                .with_flag("checked", checked),
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Select;

impl FieldComponent for Select {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let mut select = control("select", props);
        for option in props.node.options.as_deref().unwrap_or_default() {
            select = select.with_child(
                Element::new("option")
                    .with_attr("value", value_text(&option.value))
                    .with_flag("selected", option.value == props.value)
                    .with_text(option.label.as_str()),
            );
        }
        labelled(props, select)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Radio;

impl FieldComponent for Radio {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let mut group = Element::new("div")
            .with_attr("role", "radiogroup")
            .with_attr("id", props.binding.as_str());
        for option in props.node.options.as_deref().unwrap_or_default() {
            group = group.with_child(
                Element::new("label")
                    .with_child(
                        Element::new("input")
                            .with_attr("type", "radio")
                            .with_attr("name", props.binding.as_str())
                            .with_attr("value", value_text(&option.value))
                            .with_flag("checked", option.value == props.value)
                            .with_flag("disabled", props.disabled()),
                    )
                    .with_text(option.label.as_str()),
            );
        }
        labelled(props, group)
    }
}

/// Read-only value; options map stored values to their labels
#[derive(Clone, Copy, Debug)]
pub struct DisplayText {
    tag: &'static str,
}

impl FieldComponent for DisplayText {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let text = props
            .node
            .options
            .as_deref()
            .and_then(|options| options.iter().find(|option| option.value == props.value))
            .map(|option| option.label.clone())
            .unwrap_or_else(|| value_text(&props.value));

        display(props, Element::new(self.tag).with_text(text))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DisplayBoolean;

impl FieldComponent for DisplayBoolean {
    fn render(&self, props: &FieldProps<'_>) -> Rendered {
        let text = match props.value {
            Value::Bool(true) => "yes",
            Value::Bool(false) => "no",
            _ => "",
        };
        display(props, Element::new("span").with_text(text))
    }
}

fn display(props: &FieldProps<'_>, value: Element) -> Rendered {
    let mut wrapper = Element::new("div")
        .with_attr("data-kind", props.node.kind.as_deref().unwrap_or_default())
        .with_attr("data-name", props.binding.as_str());
    if let Some(label) = &props.label {
        wrapper = wrapper.with_child(Element::new("dt").with_text(label.as_str()));
    }
    wrapper.with_child(Element::new("dd").with_child(value)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!("a")), "a");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!(["a", 2])), "a, 2");
    }
}
