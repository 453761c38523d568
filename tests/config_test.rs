use std::fs;
use tempfile::TempDir;
use trellis::config::Settings;

#[test]
fn test_load_view_definitions() -> anyhow::Result<()> {
    // Create a temporary directory
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("screens"))?;

    // Create trellis.toml
    let trellis_toml = r#"
[server]
host = "127.0.0.1"
port = 4000

[views]
dir = "screens"

[picker]
per_page = 25
"#;
    fs::write(root.join("trellis.toml"), trellis_toml)?;

    // A view in JSON
    let people_json = r#"
{
    "name": "people",
    "elements": [
        {
            "node": "table",
            "name": "people",
            "columns": [{"name": "name", "label": "Name"}]
        }
    ]
}
"#;
    fs::write(root.join("screens/people.json"), people_json)?;

    // A view in YAML
    let person_yaml = r#"
name: person_form
relations:
  spouse: { cardinality: one }
elements:
  - node: form
    name: person
    elements:
      - node: field
        name: first_name
      - node: relationship
        name: spouse
        elements:
          - node: field
            name: first_name
"#;
    fs::write(root.join("screens/person.yaml"), person_yaml)?;
    fs::write(root.join("screens/README.md"), "not a view")?;

    // Load settings
    let settings = Settings::from_root(root.to_str().unwrap())?;

    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.picker.per_page, 25);
    assert_eq!(settings.definitions.len(), 2);
    assert!(settings.definition("people").is_some());
    assert!(settings.definition("person_form").is_some());

    let catalog = settings.view_catalog()?;
    assert_eq!(catalog.names(), vec!["people".to_string(), "person_form".to_string()]);
    let schema = catalog.get("person_form").unwrap();
    let spouse = &schema.elements[0].elements()[1];
    assert_eq!(spouse.elements()[0].name.as_deref(), Some("spouse_attributes.first_name"));

    Ok(())
}

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_root(temp_dir.path().to_str().unwrap())?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.picker.per_page, 10);
    assert!(settings.picker.api_base_url.is_none());
    assert!(settings.definitions.is_empty());
    Ok(())
}

#[test]
fn test_view_that_fails_to_compile_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("views"))?;

    // Relationship to an undeclared relation
    let broken = r#"
name: broken
elements:
  - node: form
    name: person
    elements:
      - node: relationship
        name: spouse
        elements:
          - node: field
            name: first_name
"#;
    fs::write(root.join("views/broken.yaml"), broken)?;

    let error = Settings::from_root(root.to_str().unwrap()).unwrap_err();
    assert!(error.to_string().contains("validation failed"));
    Ok(())
}

#[test]
fn test_malformed_definition_names_the_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    fs::create_dir_all(root.join("views"))?;
    fs::write(root.join("views/bad.json"), "{ not json")?;

    let error = Settings::from_root(root.to_str().unwrap()).unwrap_err();
    assert!(error.to_string().contains("bad.json"));
    Ok(())
}
