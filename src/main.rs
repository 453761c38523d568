use clap::Parser;
use serde_json::Value;
use std::net::SocketAddr;
use tracing::info;
use trellis::cli::{Cli, Command};
use trellis::config::Settings;
use trellis::renderer::Renderer;
use trellis::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    match cli.command() {
        Command::Serve => serve(settings).await,
        Command::Compile { view, pretty } => compile(&settings, &view, pretty),
        Command::Render { view, data } => render(&settings, &view, data.as_deref()),
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    info!("Starting Trellis on {}:{}", host, port);

    let state = AppState::new(settings)?;
    info!("Compiled {} view(s): {}", state.catalog.len(), state.catalog.names().join(", "));
    let app = trellis::create_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn compile(settings: &Settings, view: &str, pretty: bool) -> anyhow::Result<()> {
    let catalog = settings.view_catalog()?;
    let schema = catalog
        .get(view)
        .ok_or_else(|| anyhow::anyhow!("View not found: {}", view))?;

    let json = if pretty {
        serde_json::to_string_pretty(schema.as_ref())?
    } else {
        serde_json::to_string(schema.as_ref())?
    };
    println!("{}", json);
    Ok(())
}

fn render(settings: &Settings, view: &str, data: Option<&std::path::Path>) -> anyhow::Result<()> {
    let catalog = settings.view_catalog()?;
    let schema = catalog
        .get(view)
        .ok_or_else(|| anyhow::anyhow!("View not found: {}", view))?;

    let data: Value = match data {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Value::Object(Default::default()),
    };

    let html = Renderer::with_defaults()
        .render_view(&schema, &data, None)
        .map(|rendered| rendered.to_html())
        .unwrap_or_default();
    println!("{}", html);
    Ok(())
}
