//! Environment inputs provided by the CI pipeline
//!
//! Inputs are resolved through a lookup function instead of reading the process
//! environment directly, so callers (and tests) can supply their own source.
//! An empty value is treated the same as an unset one.

use std::fmt;
use std::str::FromStr;

use crate::{PortError, Result};

pub const REPO_NAME: &str = "REPO_NAME";
pub const TAG_VERSION: &str = "TAG_VERSION";
pub const HASH: &str = "HASH";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const COMMIT_HASH: &str = "COMMIT_HASH";
pub const VCPKG_PACKAGE_NAME: &str = "VCPKG_PACKAGE_NAME";

/// Lookup backed by the process environment
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve every key, reporting all unset ones at once.
fn require<const N: usize>(
    lookup: impl Fn(&str) -> Option<String>,
    keys: [&'static str; N],
) -> Result<[String; N]> {
    let values = keys.map(|key| lookup(key).filter(|v| !v.is_empty()));

    let missing: Vec<&'static str> = keys
        .iter()
        .zip(&values)
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(PortError::MissingEnvironment(missing));
    }

    Ok(values.map(Option::unwrap_or_default))
}

/// `owner/repo` identifier of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepositoryId {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(PortError::InvalidInput(format!(
                "{GITHUB_REPOSITORY} must be of the form owner/repo, got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Inputs of the port file generator
#[derive(Debug, Clone)]
pub struct PortInputs {
    /// Short repository name
    pub repo_name: String,
    /// Release tag, usually `v`-prefixed
    pub tag_version: String,
    /// Pre-computed SHA512 of the source archive
    pub hash: String,
    pub repository: RepositoryId,
}

impl PortInputs {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [repo_name, tag_version, hash, repository] =
            require(lookup, [REPO_NAME, TAG_VERSION, HASH, GITHUB_REPOSITORY])?;

        Ok(Self {
            repo_name,
            tag_version,
            hash,
            repository: repository.parse()?,
        })
    }

    /// First 16 characters of the hash, for logs
    pub fn hash_preview(&self) -> String {
        let head: String = self.hash.chars().take(16).collect();
        format!("{head}...")
    }
}

/// Inputs of the registry merger
#[derive(Debug, Clone)]
pub struct MergeInputs {
    /// Registry commit to use as the baseline
    pub commit_hash: String,
    pub package_name: String,
}

impl MergeInputs {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(process_env)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let [commit_hash, package_name] = require(lookup, [COMMIT_HASH, VCPKG_PACKAGE_NAME])?;
        Ok(Self {
            commit_hash,
            package_name,
        })
    }
}
