//! Destinations for extracted resources.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::trace;

use crate::error::Result;

/// Receives the bytes of each extracted resource
pub trait ResourceSink {
    /// Store `data` under `path`, a `/` separated path relative to the sink root
    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()>;
}

/// Writes resources below a directory, creating parent directories as needed
///
/// # Warnings
///
/// Paths are joined onto the root as they are found in the container. A crafted container
/// can use absolute paths or `..` components to write outside of the root.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory resources are written below
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSink for DirectorySink {
    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        trace!("writing {}", target.display());
        std::fs::write(&target, data)?;
        Ok(())
    }
}

/// Keeps resources in memory, in the order they were extracted
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    resources: IndexMap<String, Vec<u8>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources keyed by path
    pub fn resources(&self) -> &IndexMap<String, Vec<u8>> {
        &self.resources
    }

    /// Take the collected resources
    pub fn into_inner(self) -> IndexMap<String, Vec<u8>> {
        self.resources
    }
}

impl ResourceSink for MemorySink {
    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.resources.insert(path.to_owned(), data.to_vec());
        Ok(())
    }
}

impl<S: ResourceSink + ?Sized> ResourceSink for &mut S {
    fn write_resource(&mut self, path: &str, data: &[u8]) -> Result<()> {
        (**self).write_resource(path, data)
    }
}
