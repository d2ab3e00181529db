// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Layered configuration files: `base.toml`, then `site.toml`, then
//! `run.json`, merged key by key into one JSON tree.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ::tracing::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Paths of the three layers. A path that does not exist is skipped on load.
#[derive(Clone, Debug, Default)]
pub struct ConfigLayering {
    pub base: Option<PathBuf>,
    pub site: Option<PathBuf>,
    pub run: Option<PathBuf>,
}

impl ConfigLayering {
    /// Resolves each layer from `HYPER_CONFIG_BASE`/`_SITE`/`_RUN`, falling
    /// back to the file of the same name under `HYPER_CONFIG_ROOT` (default
    /// `~/.hyper/config`, or `~/.hyper` when that directory is absent).
    pub fn discover() -> Self {
        let root = std::env::var_os("HYPER_CONFIG_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(default_root);
        let resolve = |layer: ConfigLayer| {
            let path = std::env::var_os(layer.env_var())
                .map(PathBuf::from)
                .unwrap_or_else(|| root.join(layer.file_name()));
            path.exists().then_some(path)
        };
        Self {
            base: resolve(ConfigLayer::Base),
            site: resolve(ConfigLayer::Site),
            run: resolve(ConfigLayer::Run),
        }
    }

    pub fn with_base<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.base = Some(path.into());
        self
    }

    pub fn with_site<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.site = Some(path.into());
        self
    }

    pub fn with_run<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.run = Some(path.into());
        self
    }

    /// Configured layers in merge order.
    fn layers(&self) -> impl Iterator<Item = (ConfigLayer, &Path)> {
        [
            (ConfigLayer::Base, &self.base),
            (ConfigLayer::Site, &self.site),
            (ConfigLayer::Run, &self.run),
        ]
        .into_iter()
        .filter_map(|(layer, path)| path.as_deref().map(|path| (layer, path)))
    }
}

fn default_root() -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(".");
    };
    let nested = home.join(".hyper").join("config");
    if nested.is_dir() {
        nested
    } else {
        home.join(".hyper")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigLayer {
    Base,
    Site,
    Run,
}

impl ConfigLayer {
    fn env_var(self) -> &'static str {
        match self {
            ConfigLayer::Base => "HYPER_CONFIG_BASE",
            ConfigLayer::Site => "HYPER_CONFIG_SITE",
            ConfigLayer::Run => "HYPER_CONFIG_RUN",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            ConfigLayer::Base => "base.toml",
            ConfigLayer::Site => "site.toml",
            ConfigLayer::Run => "run.json",
        }
    }

    fn parse(self, path: &Path, text: &str) -> Result<Value, LayeredConfigError> {
        match self {
            ConfigLayer::Base | ConfigLayer::Site => {
                toml::from_str(text).map_err(|source| LayeredConfigError::Toml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            ConfigLayer::Run => {
                serde_json::from_str(text).map_err(|source| LayeredConfigError::Json {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigLayer::Base => "base",
            ConfigLayer::Site => "site",
            ConfigLayer::Run => "run",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LayeredConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to parse JSON {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The merged tree plus the layers that actually contributed to it.
#[derive(Clone, Debug)]
pub struct LayeredConfig {
    value: Value,
    applied: Vec<(ConfigLayer, PathBuf)>,
}

impl LayeredConfig {
    /// Reads every existing layer and merges them base → site → run. Tables
    /// merge recursively; any other value replaces what was there.
    pub fn load(layering: ConfigLayering) -> Result<Self, LayeredConfigError> {
        let mut value = Value::Object(Map::new());
        let mut applied = Vec::new();
        for (layer, path) in layering.layers() {
            if !path.exists() {
                debug!(target: "hyper::config", %layer, ?path, "layer not present");
                continue;
            }
            let text = fs::read_to_string(path).map_err(|source| LayeredConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let overlay = layer.parse(path, &text)?;
            let overrides = overlay_value(&mut value, overlay, layer, &mut String::new());
            info!(target: "hyper::config", %layer, ?path, overrides, "layer applied");
            applied.push((layer, path.to_path_buf()));
        }
        Ok(Self { value, applied })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Layers that were read, in merge order.
    pub fn applied(&self) -> &[(ConfigLayer, PathBuf)] {
        &self.applied
    }

    /// Decodes the subtree at `path`; `Ok(None)` when any key is missing.
    pub fn section<T: DeserializeOwned>(&self, path: &[&str]) -> Result<Option<T>, serde_json::Error> {
        let node = path
            .iter()
            .try_fold(&self.value, |node, key| node.as_object()?.get(*key));
        node.map(|node| T::deserialize(node)).transpose()
    }
}

/// Merges `src` into `dest`, returning how many existing leaves changed.
fn overlay_value(dest: &mut Value, src: Value, layer: ConfigLayer, key: &mut String) -> usize {
    match (dest, src) {
        (Value::Object(dest), Value::Object(src)) => {
            let mut changed = 0;
            for (name, child) in src {
                let mark = key.len();
                if !key.is_empty() {
                    key.push('.');
                }
                key.push_str(&name);
                match dest.get_mut(&name) {
                    Some(slot) => changed += overlay_value(slot, child, layer, key),
                    None => {
                        dest.insert(name, child);
                    }
                }
                key.truncate(mark);
            }
            changed
        }
        (slot, src) => {
            if *slot == src {
                return 0;
            }
            debug!(target: "hyper::config", %layer, key = %key, previous = %slot, current = %src, "override");
            *slot = src;
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn later_layers_override_earlier_ones() {
        let root = tempdir().unwrap();
        let base = root.path().join("base.toml");
        let site = root.path().join("site.toml");
        let run = root.path().join("run.json");
        fs::write(
            &base,
            "[frft.patterns]\nemergent_sigma = 2.0\nrecursion_threshold = 0.7\n",
        )
        .unwrap();
        fs::write(
            &site,
            "[frft.patterns]\nrecursion_threshold = 0.8\ntemporal_disagreement = 0.65\n",
        )
        .unwrap();
        fs::write(&run, r#"{"frft":{"patterns":{"emergent_sigma":3.0}}}"#).unwrap();

        let merged = LayeredConfig::load(
            ConfigLayering::default()
                .with_base(&base)
                .with_site(&site)
                .with_run(&run),
        )
        .unwrap();

        let patterns: Value = merged.section(&["frft", "patterns"]).unwrap().unwrap();
        assert_eq!(patterns["emergent_sigma"], Value::from(3.0));
        assert_eq!(patterns["recursion_threshold"], Value::from(0.8));
        assert_eq!(patterns["temporal_disagreement"], Value::from(0.65));
        let layers: Vec<ConfigLayer> = merged.applied().iter().map(|(layer, _)| *layer).collect();
        assert_eq!(layers, [ConfigLayer::Base, ConfigLayer::Site, ConfigLayer::Run]);
    }

    #[test]
    fn scalar_replaces_table() {
        let mut dest = serde_json::json!({"frft": {"orders": {"a": 1}}, "keep": true});
        let changed = overlay_value(
            &mut dest,
            serde_json::json!({"frft": {"orders": ["temporal"]}}),
            ConfigLayer::Run,
            &mut String::new(),
        );
        assert_eq!(changed, 1);
        assert_eq!(dest, serde_json::json!({"frft": {"orders": ["temporal"]}, "keep": true}));
    }

    #[test]
    fn absent_files_and_sections_yield_none() {
        let root = tempdir().unwrap();
        let merged =
            LayeredConfig::load(ConfigLayering::default().with_site(root.path().join("site.toml")))
                .unwrap();
        assert!(merged.applied().is_empty());
        let missing: Option<Value> = merged.section(&["frft"]).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn malformed_toml_is_reported_with_path() {
        let root = tempdir().unwrap();
        let base = root.path().join("base.toml");
        fs::write(&base, "[frft\nbroken = ").unwrap();
        let err = LayeredConfig::load(ConfigLayering::default().with_base(&base)).unwrap_err();
        assert!(matches!(err, LayeredConfigError::Toml { .. }));
        assert!(err.to_string().contains("base.toml"));
    }
}
