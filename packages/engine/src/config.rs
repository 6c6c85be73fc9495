use crate::error::ConfigResult;
use crate::params::{AttachOptions, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "element-adapter.config.json";

/// Declarative form of attach options: query text mapped to a label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    #[serde(default)]
    pub queries: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_properties: Option<Vec<String>>,
}

impl AdapterConfig {
    pub fn from_json(source: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Attach options for `target`, one label behavior per query
    pub fn into_options<N>(self, target: Target<N>) -> AttachOptions<N> {
        let mut options = self
            .queries
            .into_iter()
            .fold(AttachOptions::new(target), |options, (query, label)| {
                options.label(query, label)
            });
        options.watched_properties = self.watched_properties;
        options
    }
}
