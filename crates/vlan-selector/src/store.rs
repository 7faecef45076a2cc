//! Config Store
//!
//! Owns the live [`MacVlanMapping`] snapshot. Readers clone an `Arc` to the
//! current snapshot and keep using it for the rest of the request; a reload
//! builds a complete new snapshot before swapping the pointer, so a reader
//! sees either the old table or the new one, never a mix.

use crate::config::{Config, ConfigError};
use crate::mapping::{LoadReport, MacVlanMapping};
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, info, warn};

/// Where the mapping section comes from
pub trait MappingSource: Send + Sync {
    /// Produce the current mapping section
    fn load(&self) -> Result<Mapping, ConfigError>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}

/// Reads the `mapping` section of a YAML configuration file on every load
#[derive(Debug, Clone)]
pub struct FileMappingSource {
    path: PathBuf,
}

impl FileMappingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMappingSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for FileMappingSource {
    fn load(&self) -> Result<Mapping, ConfigError> {
        let config = Config::from_file(&self.path)?;
        config.mapping_section().cloned()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A fixed mapping, mostly useful for tests and embedding
#[derive(Debug, Clone)]
pub struct StaticMappingSource(pub Mapping);

impl MappingSource for StaticMappingSource {
    fn load(&self) -> Result<Mapping, ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static mapping".to_string()
    }
}

/// Holds the current MAC to VLAN snapshot
pub struct ConfigStore {
    source: Box<dyn MappingSource>,
    current: RwLock<Arc<MacVlanMapping>>,
}

impl ConfigStore {
    /// Load the initial snapshot; failure here is fatal for the caller
    pub fn new(source: impl MappingSource + 'static) -> Result<Self, ConfigError> {
        let snapshot = Self::build(&source)?;
        info!(
            source = %source.describe(),
            macs = snapshot.len(),
            vlans = snapshot.vlan_count(),
            default_vlan = ?snapshot.default_vlan().map(|v| v.get()),
            skipped = snapshot.report().total_skipped(),
            "Loaded MAC to VLAN mapping"
        );

        Ok(ConfigStore {
            source: Box::new(source),
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    fn build(source: &dyn MappingSource) -> Result<MacVlanMapping, ConfigError> {
        let mapping = source.load()?;
        let snapshot = MacVlanMapping::from_mapping(&mapping);
        if !snapshot.report().is_clean() {
            warn!(
                source = %source.describe(),
                report = ?snapshot.report(),
                "Some mapping entries were skipped"
            );
        }
        Ok(snapshot)
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<MacVlanMapping> {
        // A panicking writer cannot leave a half-built snapshot behind,
        // the pointer is either swapped or not
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Rebuild the snapshot from the source and swap it in
    ///
    /// On failure the previous snapshot stays live.
    pub fn reload(&self) -> Result<LoadReport, ConfigError> {
        let snapshot = match Self::build(self.source.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(
                    source = %self.source.describe(),
                    error = %e,
                    "Reload failed, keeping previous mapping"
                );
                return Err(e);
            }
        };

        let report = *snapshot.report();
        info!(
            source = %self.source.describe(),
            macs = snapshot.len(),
            vlans = snapshot.vlan_count(),
            default_vlan = ?snapshot.default_vlan().map(|v| v.get()),
            skipped = report.total_skipped(),
            "Reloaded MAC to VLAN mapping"
        );

        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;

        Ok(report)
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }
}
