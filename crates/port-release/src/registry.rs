//! Private registry merging
//!
//! The registry configuration is either embedded in `vcpkg.json` under the
//! `configuration` key or kept in a separate `vcpkg-configuration.json`. Where it
//! was found decides where it is written back: [`ConfigSource`] is carried from
//! discovery to write-back so the two cannot disagree.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::inputs::MergeInputs;
use crate::manifest::{MANIFEST_FILE, json_kind, read_json, read_json_object, write_json_pretty};
use crate::{PortError, Result};

/// Separate configuration file, relative to the root
pub const CONFIGURATION_FILE: &str = "vcpkg-configuration.json";

/// Manifest key holding an embedded configuration
pub const CONFIGURATION_KEY: &str = "configuration";

pub const REGISTRIES_KEY: &str = "registries";

/// Private registry added by default
pub const DEFAULT_REGISTRY_URL: &str = "https://github.com/ridgetradinggroup/vcpkg-ridge";

/// One entry of the `registries` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub kind: String,
    pub repository: String,
    /// Registry commit the package versions are resolved against
    pub baseline: String,
    pub packages: Vec<String>,
}

impl RegistryEntry {
    /// Git registry providing a single package
    pub fn git(repository: &str, baseline: &str, package: &str) -> Self {
        Self {
            kind: "git".into(),
            repository: repository.into(),
            baseline: baseline.into(),
            packages: vec![package.into()],
        }
    }
}

/// Where a configuration was read from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Nested under `configuration` in the manifest; the full manifest is kept
    /// so it can be rewritten around the updated configuration.
    Embedded {
        path: PathBuf,
        manifest: Map<String, Value>,
    },
    /// The whole of the separate configuration file
    Separate { path: PathBuf },
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Embedded { path, .. } | Self::Separate { path } => path,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Embedded { .. } => "embedded",
            Self::Separate { .. } => "separate",
        }
    }

    /// JSON pointer to the registries array inside the file
    fn registries_pointer(&self) -> &'static str {
        match self {
            Self::Embedded { .. } => "/configuration/registries",
            Self::Separate { .. } => "/registries",
        }
    }
}

/// A registry configuration together with its origin
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    source: ConfigSource,
    config: Map<String, Value>,
}

impl RegistryConfig {
    /// Locate the configuration below `root`.
    ///
    /// The manifest wins when it parses and carries a `configuration` object;
    /// otherwise the separate file is used. A candidate that fails to parse is
    /// skipped with a warning.
    pub fn discover(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        let separate_path = root.join(CONFIGURATION_FILE);

        if let Some(manifest) = read_candidate(&manifest_path)? {
            match manifest.get(CONFIGURATION_KEY) {
                Some(Value::Object(config)) => {
                    info!("Using configuration embedded in {}", manifest_path.display());
                    return Ok(Self {
                        config: config.clone(),
                        source: ConfigSource::Embedded {
                            path: manifest_path,
                            manifest,
                        },
                    });
                }
                Some(other) => warn!(
                    "Ignoring '{CONFIGURATION_KEY}' in {}: expected an object, found {}",
                    manifest_path.display(),
                    json_kind(other)
                ),
                None => info!(
                    "{} has no '{CONFIGURATION_KEY}' key",
                    manifest_path.display()
                ),
            }
        }

        if let Some(config) = read_candidate(&separate_path)? {
            info!("Using configuration from {}", separate_path.display());
            return Ok(Self {
                config,
                source: ConfigSource::Separate {
                    path: separate_path,
                },
            });
        }

        Err(PortError::NotFound(format!(
            "no registry configuration found; tried {} and {}",
            manifest_path.display(),
            separate_path.display()
        )))
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn registries_len(&self) -> usize {
        registries_len(self.config.get(REGISTRIES_KEY))
    }

    /// Append `entry` to `registries`, creating the array when absent.
    ///
    /// Existing entries are never touched or de-duplicated. Returns the new length.
    pub fn append(&mut self, entry: &RegistryEntry) -> Result<usize> {
        if !self.config.contains_key(REGISTRIES_KEY) {
            info!("Created new registries array");
        }
        let registries = self
            .config
            .entry(REGISTRIES_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));

        match registries {
            Value::Array(registries) => {
                registries.push(serde_json::to_value(entry)?);
                Ok(registries.len())
            }
            other => Err(PortError::malformed(
                self.source.path(),
                format!("'{REGISTRIES_KEY}' must be an array, found {}", json_kind(other)),
            )),
        }
    }

    /// Write the configuration back in the shape it was read in
    pub fn write(&self) -> Result<&Path> {
        match &self.source {
            ConfigSource::Embedded { path, manifest } => {
                let mut manifest = manifest.clone();
                manifest.insert(CONFIGURATION_KEY.into(), Value::Object(self.config.clone()));
                write_json_pretty(path, &manifest)?;
            }
            ConfigSource::Separate { path } => write_json_pretty(path, &self.config)?,
        }
        Ok(self.source.path())
    }

    /// Re-read the written file and count its registries
    pub fn verify(&self) -> Result<usize> {
        let written = read_json(self.source.path())?;
        Ok(registries_len(written.pointer(self.source.registries_pointer())))
    }
}

fn registries_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Read a discovery candidate; `None` when absent or unparsable
fn read_candidate(path: &Path) -> Result<Option<Map<String, Value>>> {
    match read_json_object(path) {
        Ok(map) => Ok(Some(map)),
        Err(PortError::NotFound(_)) => {
            info!("{} not found", path.display());
            Ok(None)
        }
        Err(err @ PortError::MalformedInput { .. }) => {
            warn!("Skipping {}: {err}", path.display());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub format: &'static str,
    pub registries: usize,
    pub verified_registries: usize,
}

/// Adds the private registry entry to the configuration under a root
#[derive(Debug, Clone)]
pub struct RegistryMerger {
    root: PathBuf,
    registry_url: String,
}

impl RegistryMerger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            registry_url: DEFAULT_REGISTRY_URL.into(),
        }
    }

    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = url.into();
        self
    }

    pub fn run(&self, inputs: &MergeInputs) -> Result<MergeOutcome> {
        let mut config = RegistryConfig::discover(&self.root)?;
        info!(
            "Loaded {} configuration with {} registries, keys: {:?}",
            config.source().label(),
            config.registries_len(),
            config.config().keys().collect::<Vec<_>>()
        );

        let entry = RegistryEntry::git(&self.registry_url, &inputs.commit_hash, &inputs.package_name);
        info!("Adding registry: {}", serde_json::to_string_pretty(&entry)?);
        let registries = config.append(&entry)?;

        let path = config.write()?.to_path_buf();
        info!("Final config registries count: {registries}");
        info!("Merged private registry into {}", path.display());

        let verified_registries = config.verify()?;
        info!("Verification: config has {verified_registries} registries");

        Ok(MergeOutcome {
            path,
            format: config.source().label(),
            registries,
            verified_registries,
        })
    }
}
