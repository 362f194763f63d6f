//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use graphlens_core::{Capabilities, DataSource, GraphView, RenderContext, Workspace};
use graphlens_server::{GraphLensServer, ServerConfig, ServerState};

use crate::config::AppConfig;
use crate::QueryArgs;

/// Register configured loaders and the built-in renderers.
pub fn build_capabilities(config: &AppConfig) -> anyhow::Result<Capabilities> {
    let mut caps = Capabilities::new().with_default_renderer(config.render.visualizer.clone());
    graphlens_loaders::register_loaders(&mut caps, &config.datasets())?;
    graphlens_render::register_renderers(&mut caps)?;
    if !caps.renderers.contains(caps.default_renderer()) {
        anyhow::bail!("Unknown default visualizer: {}", caps.default_renderer());
    }
    Ok(caps)
}

pub async fn serve(
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    open: bool,
    startup: Option<(String, PathBuf)>,
) -> anyhow::Result<()> {
    let caps = Arc::new(build_capabilities(&config)?);
    let state = ServerState::new(Arc::clone(&caps), config.render.settings())
        .with_data_dir(config.server.data_dir.clone());
    tracing::info!("Serving data files from {}", state.data_dir().display());

    if let Some((loader, path)) = startup {
        let graph = caps.load(&loader, &path)?;
        state.manager.write().await.create(graph);
    }

    let server_config = ServerConfig {
        host: host.unwrap_or(config.server.host),
        port: port.unwrap_or(config.server.port),
    };
    let server = GraphLensServer::new(state, server_config);
    tracing::info!("Starting GraphLens server on {}", server.address());

    if open {
        let url = format!("http://{}", server.address());
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser at {}: {}", url, e);
        }
    }

    server.start().await
}

/// Load `path` with `loader` and apply every search, then every filter.
fn query(caps: &Capabilities, loader: &str, path: &Path, queries: &QueryArgs) -> anyhow::Result<Workspace> {
    let mut workspace = Workspace::new(caps.load(loader, path)?);
    for text in &queries.search {
        workspace.apply_search(text)?;
    }
    for expr in &queries.filter {
        workspace.apply_filter(expr)?;
    }
    tracing::info!(
        "{} of {} nodes after {} queries",
        workspace.current().node_count(),
        workspace.baseline().node_count(),
        workspace.queries().len()
    );
    Ok(workspace)
}

pub fn show(config: &AppConfig, loader: &str, path: &Path, queries: &QueryArgs) -> anyhow::Result<()> {
    let caps = build_capabilities(config)?;
    let workspace = query(&caps, loader, path, queries)?;
    let view = GraphView::from(workspace.current().as_ref());
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

pub struct RenderOptions {
    pub visualizer: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub fn render(
    config: &AppConfig,
    loader: &str,
    path: &Path,
    queries: &QueryArgs,
    options: RenderOptions,
) -> anyhow::Result<()> {
    let caps = build_capabilities(config)?;
    let workspace = query(&caps, loader, path, queries)?;
    let ctx = RenderContext {
        visualizer: options.visualizer,
        ..Default::default()
    };
    let markup = caps.render(
        workspace.current(),
        options.width.unwrap_or(config.render.width),
        options.height.unwrap_or(config.render.height),
        &ctx,
    )?;
    println!("{markup}");
    Ok(())
}

pub fn plugins(config: &AppConfig) -> anyhow::Result<()> {
    let caps = build_capabilities(config)?;
    println!("Loaders:");
    for key in caps.loaders.list() {
        let loader = caps.loaders.get(&key)?;
        println!("  {:<22} {}", loader.id(), loader.name());
    }
    println!("Renderers:");
    for key in caps.renderers.list() {
        let marker = if key == caps.default_renderer() { " (default)" } else { "" };
        println!("  {key}{marker}");
    }
    Ok(())
}
