//! Data-source plugins for GraphLens

pub mod config;
pub mod json;
pub mod xml;

#[cfg(test)]
pub mod tests;

use std::sync::Arc;

use graphlens_core::Capabilities;

pub use config::{builtin_presets, JsonLoaderConfig};
pub use json::JsonDataSource;
pub use xml::{XmlDataSource, XML_LOADER_ID};

/// Register one JSON loader per configuration, keyed by its `loader_id`,
/// followed by the XML loader.
pub fn register_loaders(caps: &mut Capabilities, configs: &[JsonLoaderConfig]) -> anyhow::Result<()> {
    for config in configs {
        caps.loaders.register(
            config.loader_id.clone(),
            Arc::new(JsonDataSource::new(config.clone())),
        )?;
    }
    caps.loaders.register(XML_LOADER_ID, Arc::new(XmlDataSource::new()))?;
    Ok(())
}
