use serde_json::{json, Value};

use super::*;
use crate::compiler::{NodeAttrs, Relation, View, ViewBuilder, CompileResult};
use crate::domain::{Column, Condition, Rule, SchemaNode, TranslationsMap};

fn field(name: &str, kind: &str) -> SchemaNode {
    let mut node = SchemaNode::named(NodeType::Field, name);
    node.kind = Some(kind.to_string());
    node
}

fn container(node_type: NodeType, elements: Vec<SchemaNode>) -> SchemaNode {
    let mut node = SchemaNode::new(node_type);
    node.elements = Some(elements);
    node
}

fn render(node: &SchemaNode, data: &Value) -> Option<Rendered> {
    Renderer::with_defaults().render(node, &RenderContext::new(data))
}

fn input<'a>(tree: &'a Rendered, name: &str) -> Option<&'a Element> {
    tree.find_all(&|el: &Element| el.tag == "input" && el.attr("name") == Some(name))
        .into_iter()
        .next()
}

#[test]
fn test_hidden_node_skips_its_subtree() {
    let mut child = field("nickname", "INPUT_TEXT");
    child.rules = Some(vec![Rule::show(Condition::eq("status", "archived"))]);

    let mut group = container(NodeType::Group, vec![child]);
    group.rules = Some(vec![Rule::hide(Condition::eq("status", "archived"))]);
    let form = container(NodeType::Form, vec![group, field("first_name", "INPUT_TEXT")]);

    let data = json!({"status": "archived"});
    let tree = render(&form, &data).unwrap();

    assert!(input(&tree, "nickname").is_none());
    assert!(tree.find_by_attr("data-type", "GROUP").is_none());
    assert!(input(&tree, "first_name").is_some());
}

#[test]
fn test_hidden_root_renders_nothing() {
    let mut page = container(NodeType::Page, vec![field("first_name", "INPUT_TEXT")]);
    page.rules = Some(vec![Rule::hide(Condition::empty("id"))]);

    assert!(render(&page, &json!({})).is_none());
    assert!(render(&page, &json!({"id": 7})).is_some());
}

#[test]
fn test_disable_rule_renders_disabled_input() {
    let mut email = field("email", "INPUT_EMAIL");
    email.rules = Some(vec![Rule::disable(Condition::eq("status", "locked"))]);
    let form = container(NodeType::Form, vec![email]);

    let locked = json!({"status": "locked", "email": "ann@example.com"});
    let tree = render(&form, &locked).unwrap();
    let control = input(&tree, "email").unwrap();
    assert!(control.has_attr("disabled"));
    assert_eq!(control.attr("type"), Some("email"));
    assert_eq!(control.attr("value"), Some("ann@example.com"));

    let open = json!({"status": "open"});
    let tree = render(&form, &open).unwrap();
    assert!(!input(&tree, "email").unwrap().has_attr("disabled"));
}

#[test]
fn test_unknown_type_and_kind_render_nothing_but_siblings_survive() {
    let form = container(
        NodeType::Form,
        vec![
            field("first_name", "INPUT_TEXT"),
            SchemaNode::named("MAP_WIDGET", "location"),
            field("rating", "INPUT_STARS"),
            field("notes", "WIDGET_NOTES"),
            field("last_name", "INPUT_TEXT"),
        ],
    );

    let tree = render(&form, &json!({})).unwrap();
    let names: Vec<_> = tree
        .find_all(&|el: &Element| el.tag == "input")
        .into_iter()
        .filter_map(|el| el.attr("name"))
        .collect();
    assert_eq!(names, vec!["first_name", "last_name"]);
    assert!(tree.find_by_attr("name", "location").is_none());
}

#[test]
fn test_siblings_render_in_document_order() {
    let mut title = SchemaNode::new(NodeType::Alert);
    title.label = Some("Heads up".to_string());
    let mut submit = SchemaNode::new(NodeType::Submit);
    submit.label = Some("Save".to_string());

    let form = container(NodeType::Form, vec![title, field("first_name", "INPUT_TEXT"), submit]);
    let Some(Rendered::Element(element)) = render(&form, &json!({})) else {
        panic!("form did not render an element");
    };

    let tags: Vec<_> = element
        .children
        .iter()
        .filter_map(|child| match child {
            Rendered::Element(el) => Some(el.tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec!["div", "label", "button"]);
}

#[test]
fn test_form_array_binds_template_fields_per_item() {
    let mut array = SchemaNode::named(NodeType::FormArray, "addresses_attributes");
    array.template = Some(vec![field("city", "INPUT_TEXT")]);
    let form = container(NodeType::Form, vec![array]);

    let data = json!({
        "addresses_attributes": [
            {"id": 1, "city": "Oslo"},
            {"id": 2, "city": "Bergen", "_destroy": true},
            {"city": "Trondheim"}
        ]
    });
    let tree = render(&form, &data).unwrap();

    let oslo = input(&tree, "addresses_attributes.0.city").unwrap();
    assert_eq!(oslo.attr("value"), Some("Oslo"));
    assert!(input(&tree, "addresses_attributes.1.city").is_none());
    let trondheim = input(&tree, "addresses_attributes.2.city").unwrap();
    assert_eq!(trondheim.attr("value"), Some("Trondheim"));
}

#[test]
fn test_form_array_prefers_live_form_state() {
    let mut array = SchemaNode::named(NodeType::FormArray, "addresses_attributes");
    array.template = Some(vec![field("city", "INPUT_TEXT")]);

    let data = json!({"addresses_attributes": [{"city": "Oslo"}]});
    let mut form = FormState::with_values(data.clone());
    form.apply_change("addresses_attributes.0.city", json!("Stavanger"));
    form.set_error("addresses_attributes.0.city", "is too far");

    let renderer = Renderer::with_defaults();
    let ctx = RenderContext::new(&data).with_form(&form);
    let tree = renderer.render(&array, &ctx).unwrap();

    assert_eq!(
        input(&tree, "addresses_attributes.0.city").unwrap().attr("value"),
        Some("Stavanger")
    );
    assert!(tree.text_content().contains("is too far"));
}

#[test]
fn test_template_rules_resolve_against_each_item() {
    let mut zip = field("zip", "INPUT_TEXT");
    zip.rules = Some(vec![Rule::show(Condition::eq("country", "US"))]);
    let mut array = SchemaNode::named(NodeType::DisplayArray, "addresses");
    array.template = Some(vec![zip]);

    let data = json!({"addresses": [{"country": "US", "zip": "10001"}, {"country": "NO"}]});
    let tree = render(&array, &data).unwrap();

    assert!(input(&tree, "addresses.0.zip").is_some());
    assert!(input(&tree, "addresses.1.zip").is_none());
}

#[test]
fn test_display_field_prefers_literal_value() {
    let mut status = field("status", "DISPLAY_BADGE");
    status.value = Some(json!("Draft"));
    let show = container(NodeType::Show, vec![status, field("name", "DISPLAY_TEXT")]);

    let data = json!({"status": "published", "name": "Ann"});
    let tree = render(&show, &data).unwrap();

    let badge = tree.find_all(&|el: &Element| el.tag == "mark");
    assert_eq!(badge[0].text_content(), "Draft");
    assert_eq!(tree.find_by_attr("data-name", "name").unwrap().text_content(), "Ann");
}

#[test]
fn test_labels_translate_within_schema_namespace() {
    let mut translations = TranslationsMap::default();
    translations.common.insert("save".into(), "Lagre".into());
    translations
        .schemas
        .entry("person".into())
        .or_default()
        .insert("first_name".into(), "Fornavn".into());

    let mut first_name = field("first_name", "INPUT_TEXT");
    first_name.label = Some("first_name".to_string());
    let mut submit = SchemaNode::new(NodeType::Submit);
    submit.label = Some("save".to_string());
    let mut form = container(NodeType::Form, vec![first_name, submit]);
    form.schema = Some("person".to_string());

    let data = json!({});
    let ctx = RenderContext::new(&data).with_translations(&translations);
    let tree = Renderer::with_defaults().render(&form, &ctx).unwrap();

    let text = tree.text_content();
    assert!(text.contains("Fornavn"));
    assert!(text.contains("Lagre"));
}

#[test]
fn test_table_renders_live_rows_with_actions() {
    let mut edit = SchemaNode::new(NodeType::Button);
    edit.label = Some("Edit".to_string());
    let mut table = SchemaNode::named(NodeType::Table, "people");
    table.columns = Some(vec![
        Column::new("name").label("Name"),
        Column::new("active").kind("DISPLAY_BOOLEAN"),
    ]);
    table.elements = Some(vec![edit]);

    let data = json!({"people": [
        {"id": 1, "name": "Ann", "active": true},
        {"id": 2, "name": "Bob", "_destroy": "1"},
        {"id": 3, "name": "Cid", "active": false}
    ]});
    let tree = render(&table, &data).unwrap();

    let rows = tree.find_all(&|el: &Element| el.tag == "tr" && el.has_attr("data-id"));
    let ids: Vec<_> = rows.iter().filter_map(|row| row.attr("data-id")).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(rows[0].text_content(), "AnnyesEdit");
    assert_eq!(rows[1].text_content(), "CidnoEdit");
}

#[test]
fn test_custom_kind_via_closure() {
    let mut renderer = Renderer::with_defaults();
    renderer.register_kind_fn("INPUT_COLOR", |props| {
        Element::new("input")
            .with_attr("type", "color")
            .with_attr("name", props.binding.as_str())
            .with_flag("disabled", props.disabled())
            .into()
    });
    assert!(renderer.has_kind("INPUT_COLOR"));

    let mut color = field("color", "INPUT_COLOR");
    color.rules = Some(vec![Rule::enable(Condition::eq("role", "admin"))]);
    let data = json!({"role": "guest"});
    let tree = renderer.render(&color, &RenderContext::new(&data)).unwrap();

    let control = input(&tree, "color").unwrap();
    assert_eq!(control.attr("type"), Some("color"));
    assert!(control.has_attr("disabled"));
}

#[test]
fn test_empty_renderer_renders_nothing() {
    let renderer = Renderer::new();
    let data = json!({});
    assert!(renderer
        .render(&field("first_name", "INPUT_TEXT"), &RenderContext::new(&data))
        .is_none());
    assert!(!renderer.has_type(&NodeType::Form));
}

struct PersonView;

impl View for PersonView {
    fn name(&self) -> &str {
        "person"
    }

    fn builder(&self) -> ViewBuilder {
        ViewBuilder::new()
            .with_relation("spouse", Relation::one())
            .with_relation("contacts", Relation::many().resource("/contacts"))
    }

    fn define(&self, view: &mut ViewBuilder) -> CompileResult<()> {
        view.drawer("help", NodeAttrs::new().label("Help"), |d| {
            d.alert("Fill in every field", NodeAttrs::new())
        })?;
        view.form("person", NodeAttrs::new().schema("person"), |f| {
            f.field("first_name", NodeAttrs::new().label("First name").required())?;
            f.relationship("spouse", NodeAttrs::new(), |r| {
                r.field("first_name", NodeAttrs::new())
            })?;
            f.relationship_picker_with_create("contacts", NodeAttrs::new(), |c| {
                c.field("name", NodeAttrs::new().required())
            })?;
            f.link("Help", NodeAttrs::new().opens("help"))?;
            f.submit("Save", NodeAttrs::new())
        })
    }
}

#[test]
fn test_render_compiled_view() {
    let schema = PersonView.compile().unwrap();
    let data = json!({
        "first_name": "Ann",
        "spouse_attributes": {"first_name": "Bob"},
        "contacts": [{"id": 4, "name": "Cid"}]
    });

    let tree = Renderer::with_defaults().render_view(&schema, &data, None).unwrap();

    assert_eq!(input(&tree, "first_name").unwrap().attr("value"), Some("Ann"));
    assert!(input(&tree, "first_name").unwrap().has_attr("required"));
    assert_eq!(
        input(&tree, "spouse_attributes.first_name").unwrap().attr("value"),
        Some("Bob")
    );

    let picker = tree.find_by_attr("data-type", "RELATIONSHIP_PICKER").unwrap();
    assert_eq!(picker.attr("data-cardinality"), Some("many"));
    assert_eq!(picker.attr("data-resource"), Some("/contacts"));
    assert!(picker.attr("data-create-template").unwrap().contains("\"name\""));
    assert!(tree.find_by_attr("data-id", "4").is_some());

    let link = tree.find_by_attr("data-opens", "help").unwrap();
    assert_eq!(link.tag, "a");
    assert!(tree.to_html().starts_with("<main"));
}

#[test]
fn test_render_drawer_by_name() {
    let schema = PersonView.compile().unwrap();
    let data = json!({});
    let renderer = Renderer::with_defaults();
    let ctx = RenderContext::new(&data).with_drawers(schema.drawers.as_ref().unwrap());

    let drawer = renderer.render_drawer("help", &ctx).unwrap();
    assert!(drawer.to_html().starts_with("<aside"));
    assert!(drawer.text_content().contains("Fill in every field"));

    assert!(renderer.render_drawer("missing", &ctx).is_none());
}
