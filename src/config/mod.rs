use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;
use crate::compiler::{View, ViewCatalog, ViewDefinition};
use crate::picker::DEFAULT_PER_PAGE;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub views: ViewsSettings,
    #[serde(default)]
    pub picker: PickerSettings,
    /// View definitions loaded from `views.dir`
    #[serde(skip)]
    pub definitions: Vec<ViewDefinition>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewsSettings {
    /// Directory of `*.json` / `*.yaml` / `*.yml` view definitions, relative to the config file
    #[serde(default = "default_views_dir")]
    pub dir: String,
}

impl Default for ViewsSettings {
    fn default() -> Self {
        Self {
            dir: default_views_dir(),
        }
    }
}

fn default_views_dir() -> String {
    "views".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PickerSettings {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Base URL of an external record API; the built-in store is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            api_base_url: None,
        }
    }
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            views: ViewsSettings::default(),
            picker: PickerSettings::default(),
            definitions: Vec::new(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, then CLI/env overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(".");

        let s = Config::builder()
            .add_source(File::from(config_path.clone()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        let views_dir = match &cli.views_dir {
            Some(dir) => dir.clone(),
            None => settings.views_path(root),
        };
        settings.load_views_from_dir(&views_dir)?;

        settings.validate()?;
        Ok(settings)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(dir) = &cli.views_dir {
            self.views.dir = dir.to_string_lossy().into_owned();
        }
    }

    /// Load `<root>/trellis.{toml,yaml,json}` and the views next to it
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("trellis");
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;

        let views_dir = settings.views_path(root);
        settings.load_views_from_dir(&views_dir)?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Configuration validation failed:\n{}", error_messages.join("\n"))
        })
    }

    fn views_path(&self, root: &str) -> PathBuf {
        let dir = Path::new(&self.views.dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            Path::new(root).join(dir)
        }
    }

    /// Read every view definition in `path`; a missing directory loads nothing
    pub fn load_views_from_dir(&mut self, path: &Path) -> Result<(), anyhow::Error> {
        if !path.is_dir() {
            tracing::debug!("No views directory at {}", path.display());
            return Ok(());
        }

        let pattern = format!("{}/*", path.display());
        let mut entries: Vec<PathBuf> = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => entries.push(path),
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        entries.sort();

        for path in entries {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if matches!(ext, "json" | "yaml" | "yml") {
                    let content = std::fs::read_to_string(&path)?;
                    let definition: ViewDefinition = if ext == "json" {
                        serde_json::from_str(&content)
                            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                    } else {
                        serde_yaml::from_str(&content)
                            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                    };
                    tracing::debug!("Loaded view '{}' from {}", definition.name, path.display());
                    self.definitions.push(definition);
                } else {
                    tracing::warn!("Skipping {}: not a view definition", path.display());
                }
            }
        }
        Ok(())
    }

    /// Compile every loaded definition once
    pub fn view_catalog(&self) -> Result<ViewCatalog, anyhow::Error> {
        ViewCatalog::compile_all(&self.definitions).map_err(|errors| {
            let messages: Vec<String> = errors
                .iter()
                .map(|(name, e)| format!("view '{}': {}", name, e))
                .collect();
            anyhow::anyhow!("View compilation failed:\n{}", messages.join("\n"))
        })
    }

    pub fn definition(&self, name: &str) -> Option<&ViewDefinition> {
        self.definitions.iter().find(|d| d.name() == name)
    }
}
