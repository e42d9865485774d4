//! Message override loader.
//!
//! Keys are written as strings and parsed with the same snake_case names the
//! engine uses, so a typo is reported instead of silently ignored.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use essentials_core::{MessageKey, Module};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};
use crate::messages::MessageCatalog;

/// Example overrides shipped with the server.
pub const DEFAULT_MESSAGES: &str = include_str!("../../data/messages.ron");

/// Layout of `messages.ron`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessagesRon {
    prefixes: BTreeMap<String, String>,
    templates: BTreeMap<String, String>,
    per_kind: BTreeMap<String, BTreeMap<String, String>>,
}

fn module(name: &str) -> LoadResult<Module> {
    Module::from_str(name).map_err(|_| anyhow::anyhow!("Unknown module '{}' in messages", name))
}

fn key(name: &str) -> LoadResult<MessageKey> {
    MessageKey::from_str(name).map_err(|_| anyhow::anyhow!("Unknown message key '{}'", name))
}

/// Loader for message overrides from RON files.
pub struct MessageLoader;

impl MessageLoader {
    /// Parses override text on top of the built-in catalog.
    pub fn parse(content: &str) -> LoadResult<MessageCatalog> {
        let data: MessagesRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse messages RON: {}", e))?;

        let mut catalog = MessageCatalog::new();
        for (name, prefix) in data.prefixes {
            catalog.set_prefix(module(&name)?, prefix);
        }
        for (name, template) in data.templates {
            catalog.set_template(key(&name)?, template);
        }
        for (name, templates) in data.per_kind {
            let module = module(&name)?;
            for (name, template) in templates {
                catalog.set_kind_template(module, key(&name)?, template);
            }
        }
        Ok(catalog)
    }

    /// Load message overrides from a RON file.
    pub fn load(path: &Path) -> LoadResult<MessageCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Load overrides, writing the shipped example first when the file is missing.
    pub fn load_or_create(path: &Path) -> LoadResult<MessageCatalog> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create {}: {}", parent.display(), e)
                })?;
            }
            std::fs::write(path, DEFAULT_MESSAGES)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "default messages written");
        }
        Self::load(path)
    }
}
