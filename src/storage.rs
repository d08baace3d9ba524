//! Storage containers and the mount table that exposes them as paths.
//!
//! Containers are addressed the way the data lake addresses them
//! (`abfss://{container}@{account}.dfs.core.windows.net/`). The mount table
//! backs each container with a local directory laid out as
//! `{root}/{account}/{container}`, and hands out paths under logical mount
//! points such as `/mnt/input`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

const SCHEME: &str = "abfss://";
const DFS_HOST_SUFFIX: &str = ".dfs.core.windows.net";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid container URI '{0}'")]
    InvalidUri(String),

    #[error("'{0}' is not mounted")]
    UnknownMount(String),

    #[error("mount point '{mount_point}' is already backed by {existing}")]
    MountConflict {
        mount_point: String,
        existing: ContainerUri,
    },

    #[error("container {uri} does not exist (expected directory {path:?})")]
    MissingContainer { uri: ContainerUri, path: PathBuf },

    #[error("path '{0}' escapes its mount point")]
    PathEscapesMount(String),

    #[error("failed to prepare {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerUri {
    pub account: String,
    pub container: String,
}

impl ContainerUri {
    pub fn new(account: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            container: container.into(),
        }
    }

    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let invalid = || StorageError::InvalidUri(uri.to_string());

        let authority = uri
            .strip_prefix(SCHEME)
            .ok_or_else(invalid)?
            .trim_end_matches('/');
        let (container, host) = authority.split_once('@').ok_or_else(invalid)?;
        let account = host.strip_suffix(DFS_HOST_SUFFIX).ok_or_else(invalid)?;

        if !is_valid_container_name(container) || !is_valid_account_name(account) {
            return Err(invalid());
        }

        Ok(Self::new(account, container))
    }
}

impl fmt::Display for ContainerUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}@{}{}/", SCHEME, self.container, self.account, DFS_HOST_SUFFIX)
    }
}

impl FromStr for ContainerUri {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// 3-24 lowercase letters and digits.
pub fn is_valid_account_name(name: &str) -> bool {
    (3..=24).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// 3-63 lowercase letters, digits and single hyphens, starting and ending
/// with a letter or digit.
pub fn is_valid_container_name(name: &str) -> bool {
    if !(3..=63).contains(&name.len()) || name.contains("--") {
        return false;
    }
    if name.starts_with('-') || name.ends_with('-') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    /// The backing container must already exist.
    ReadOnly,
    /// The backing container is created when absent.
    ReadWrite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub mount_point: String,
    pub source: ContainerUri,
    pub local_path: PathBuf,
    pub mode: MountMode,
}

#[derive(Debug)]
pub struct MountTable {
    root: PathBuf,
    mounts: BTreeMap<String, Mount>,
}

impl MountTable {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mounts: BTreeMap::new(),
        }
    }

    /// Mounts `source` at `mount_point`.
    ///
    /// Mounting the same source at the same point again is a no-op.
    pub fn mount(
        &mut self,
        source: ContainerUri,
        mount_point: &str,
        mode: MountMode,
    ) -> Result<&Mount, StorageError> {
        let mount_point = mount_point.trim_end_matches('/');

        match self.mounts.get(mount_point) {
            Some(existing) if existing.source != source => {
                return Err(StorageError::MountConflict {
                    mount_point: mount_point.to_string(),
                    existing: existing.source.clone(),
                });
            }
            Some(_) => {
                info!(action = "skip", component = "mount", mount_point, source = %source, "Already mounted");
            }
            None => {
                let local_path = self.root.join(&source.account).join(&source.container);
                match mode {
                    MountMode::ReadOnly if !local_path.is_dir() => {
                        return Err(StorageError::MissingContainer {
                            uri: source,
                            path: local_path,
                        });
                    }
                    MountMode::ReadOnly => {}
                    MountMode::ReadWrite => {
                        fs::create_dir_all(&local_path).map_err(|e| StorageError::Io {
                            path: local_path.clone(),
                            source: e,
                        })?;
                    }
                }

                info!(action = "mount", component = "mount", mount_point, source = %source, local_path = ?local_path, mode = ?mode, "Mounted container");
                self.mounts.insert(
                    mount_point.to_string(),
                    Mount {
                        mount_point: mount_point.to_string(),
                        source,
                        local_path,
                        mode,
                    },
                );
            }
        }

        Ok(&self.mounts[mount_point])
    }

    pub fn unmount(&mut self, mount_point: &str) -> Result<Mount, StorageError> {
        let mount_point = mount_point.trim_end_matches('/');
        let removed = self
            .mounts
            .remove(mount_point)
            .ok_or_else(|| StorageError::UnknownMount(mount_point.to_string()))?;
        info!(action = "unmount", component = "mount", mount_point, "Unmounted container");
        Ok(removed)
    }

    pub fn mounts(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.values()
    }

    pub fn is_mounted(&self, mount_point: &str) -> bool {
        self.mounts.contains_key(mount_point.trim_end_matches('/'))
    }

    /// Maps `relative` inside the container mounted at `mount_point` to a
    /// local path.
    pub fn resolve(&self, mount_point: &str, relative: &Path) -> Result<PathBuf, StorageError> {
        let mount_point = mount_point.trim_end_matches('/');
        let mount = self
            .mounts
            .get(mount_point)
            .ok_or_else(|| StorageError::UnknownMount(mount_point.to_string()))?;

        let mut resolved = mount.local_path.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::PathEscapesMount(relative.display().to_string()));
                }
            }
        }
        Ok(resolved)
    }

    /// Resolves a full mounted path such as `/mnt/input/census.csv`.
    pub fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let mount = self
            .mounts
            .values()
            .filter(|m| {
                path.strip_prefix(m.mount_point.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .max_by_key(|m| m.mount_point.len())
            .ok_or_else(|| StorageError::UnknownMount(path.to_string()))?;

        let relative = path[mount.mount_point.len()..].trim_start_matches('/');
        self.resolve(&mount.mount_point, Path::new(relative))
    }
}
