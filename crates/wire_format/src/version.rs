//! TISS version registry
//!
//! Resolves a wire-format version string to its XSD schema artifact. The
//! registry is an explicit, constructed value passed to the components that
//! need it; there is no package-level default. Schema documents are compiled
//! lazily and cached, since versions are read-mostly after startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::xsd::Schema;

/// The current TISS version published by ANS
pub const CURRENT_TISS_VERSION: &str = "3.05.02";

/// Versions this core can render and validate
pub const SUPPORTED_VERSIONS: &[&str] = &["3.05.02", "3.03.00"];

/// Metadata for one registered TISS version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub schema_file: PathBuf,
    pub is_active: bool,
    pub release_date: Option<NaiveDate>,
    pub end_of_life_date: Option<NaiveDate>,
}

/// Registry of supported TISS versions and their schema artifacts
pub struct VersionRegistry {
    schema_dir: PathBuf,
    versions: Vec<VersionInfo>,
    current: String,
    cache: RwLock<HashMap<String, Arc<Schema>>>,
}

impl VersionRegistry {
    /// Creates a registry over the default supported versions, resolving
    /// schema files as `{schema_dir}/tiss_{version with dots as underscores}.xsd`
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        let schema_dir = schema_dir.into();
        let versions = SUPPORTED_VERSIONS
            .iter()
            .map(|v| VersionInfo {
                version: (*v).to_string(),
                schema_file: schema_dir.join(schema_file_name(v)),
                is_active: *v == CURRENT_TISS_VERSION,
                release_date: None,
                end_of_life_date: None,
            })
            .collect();

        Self {
            schema_dir,
            versions,
            current: CURRENT_TISS_VERSION.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry with an explicit version list; the first active
    /// entry becomes the current default
    pub fn with_versions(schema_dir: impl Into<PathBuf>, versions: Vec<VersionInfo>) -> Self {
        let current = versions
            .iter()
            .find(|v| v.is_active)
            .or_else(|| versions.first())
            .map(|v| v.version.clone())
            .unwrap_or_else(|| CURRENT_TISS_VERSION.to_string());

        Self {
            schema_dir: schema_dir.into(),
            versions,
            current,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the current default version string
    pub fn current_version(&self) -> &str {
        &self.current
    }

    /// Returns the registered version strings
    pub fn supported_versions(&self) -> Vec<&str> {
        self.versions.iter().map(|v| v.version.as_str()).collect()
    }

    /// Returns true if the version is registered
    pub fn is_supported(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v.version == version)
    }

    /// Returns metadata for a version, if registered
    pub fn version_info(&self, version: &str) -> Option<&VersionInfo> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Resolves a version string to its schema artifact path.
    ///
    /// Returns None when the version is not registered or its schema file
    /// does not exist on disk.
    pub fn resolve(&self, version: &str) -> Option<PathBuf> {
        let info = self.version_info(version)?;
        if info.schema_file.exists() {
            Some(info.schema_file.clone())
        } else {
            None
        }
    }

    /// Returns the compiled schema for a version, loading and caching it on
    /// first use. `Ok(None)` means the version has no resolvable schema,
    /// which validation reports as a configuration problem rather than a
    /// document defect.
    pub fn schema(&self, version: &str) -> Result<Option<Arc<Schema>>, WireError> {
        if let Some(cached) = self
            .cache
            .read()
            .expect("version cache poisoned")
            .get(version)
        {
            return Ok(Some(Arc::clone(cached)));
        }

        let Some(path) = self.resolve(version) else {
            return Ok(None);
        };

        let schema = Arc::new(Schema::load(&path)?);
        self.cache
            .write()
            .expect("version cache poisoned")
            .insert(version.to_string(), Arc::clone(&schema));

        tracing::debug!(version, path = %path.display(), "compiled TISS schema");
        Ok(Some(schema))
    }

    /// The directory schema artifacts are resolved under
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }
}

fn schema_file_name(version: &str) -> String {
    format!("tiss_{}.xsd", version.replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_versions() {
        let registry = VersionRegistry::new("schemas");
        assert_eq!(registry.current_version(), "3.05.02");
        assert_eq!(registry.supported_versions(), vec!["3.05.02", "3.03.00"]);
        assert!(registry.is_supported("3.03.00"));
        assert!(!registry.is_supported("2.02.03"));
    }

    #[test]
    fn test_schema_file_naming() {
        assert_eq!(schema_file_name("3.05.02"), "tiss_3_05_02.xsd");
    }

    #[test]
    fn test_resolve_missing_file_is_none() {
        let registry = VersionRegistry::new("/nonexistent/dir");
        assert!(registry.resolve("3.05.02").is_none());
    }

    #[test]
    fn test_unregistered_version_has_no_schema() {
        let registry = VersionRegistry::new("schemas");
        assert!(registry.schema("9.99.99").unwrap().is_none());
    }
}
