//! Source resolver over an SDK library checkout.
//!
//! Layout read from the checkout root:
//!
//! ```text
//! package.json                    "version" → SDK version
//! lib/browser.js                  core runtime entry point
//! lib/services/<service>.js       header source
//! apis/<service>-<version>.json   API definition per version
//! ```
//!
//! The catalog is built once at [`SdkLibrary::open`] and never changes.
//! Lookups after that do no caching of their own.

use sdkpack_core::catalog::ServiceCatalog;
use sdkpack_core::error::SourceError;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::definition::ApiDefinition;

/// What the resolver knows about one service.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    pub service: String,
    /// Raw header source text.
    pub source: String,
    /// Known versions, ascending.
    pub versions: Vec<String>,
}

#[derive(Deserialize)]
struct PackageManifest {
    version: Option<String>,
}

/// An opened SDK library checkout.
#[derive(Debug, Clone)]
pub struct SdkLibrary {
    root: PathBuf,
    core_entry: PathBuf,
    catalog: ServiceCatalog,
}

impl SdkLibrary {
    /// Open a checkout and build its catalog from `apis/`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        let apis = root.join("apis");

        let mut catalog = ServiceCatalog::new();
        if let Some(version) = read_sdk_version(&root).await? {
            catalog = catalog.with_sdk_version(version);
        }

        let mut dir = tokio::fs::read_dir(&apis)
            .await
            .map_err(|e| read_error(&apis, e))?;
        while let Some(entry) = dir.next_entry().await.map_err(|e| read_error(&apis, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match parse_api_stem(stem) {
                Some((service, version)) => catalog.insert_version(service, version),
                None => warn!(file = %path.display(), "Skipping unrecognized API file"),
            }
        }

        debug!(
            root = %root.display(),
            services = catalog.len(),
            sdk_version = catalog.sdk_version().unwrap_or("unknown"),
            "Opened SDK library"
        );

        Ok(Self {
            root,
            core_entry: PathBuf::from("lib").join("browser.js"),
            catalog,
        })
    }

    /// Override the core entry point, relative to the root.
    pub fn with_core_entry(mut self, entry: impl Into<PathBuf>) -> Self {
        self.core_entry = entry.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn entry_point(&self) -> PathBuf {
        self.root.join(&self.core_entry)
    }

    /// Name of this library's cache root: `v<sdk version>`, else the
    /// checkout directory name.
    pub fn cache_name(&self) -> String {
        if let Some(version) = self.catalog.sdk_version() {
            return format!("v{version}");
        }
        self.root
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| sdkpack_core::LATEST.to_string())
    }

    fn header_path(&self, service: &str) -> PathBuf {
        self.root
            .join("lib")
            .join("services")
            .join(format!("{service}.js"))
    }

    fn definition_path(&self, service: &str, version: &str) -> PathBuf {
        self.root.join("apis").join(format!("{service}-{version}.json"))
    }

    /// Look up a service. Unknown services and missing header sources are
    /// [`SourceError::NotFound`].
    pub async fn resolve(&self, service: &str) -> Result<SourceHandle, SourceError> {
        let versions: Vec<String> = match self.catalog.versions(service) {
            Some(versions) => versions.map(str::to_string).collect(),
            None => return Err(SourceError::NotFound(service.to_string())),
        };

        let path = self.header_path(service);
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(service.to_string()));
            }
            Err(e) => return Err(read_error(&path, e)),
        };

        Ok(SourceHandle {
            service: service.to_string(),
            source,
            versions,
        })
    }

    /// Load the definition document of one concrete version.
    pub async fn definition(&self, service: &str, version: &str) -> Result<ApiDefinition, SourceError> {
        if self.catalog.resolve_version(service, version).is_none() {
            return Err(SourceError::NotFound(format!("{service}-{version}")));
        }

        let path = self.definition_path(service, version);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(format!("{service}-{version}")));
            }
            Err(e) => return Err(read_error(&path, e)),
        };
        ApiDefinition::parse(&text, &path)
    }
}

/// `s3-2006-03-01` → `("s3", "2006-03-01")`. Stems with a `.` (e.g.
/// `s3-2006-03-01.paginators`) and non-lowercase service names are rejected.
fn parse_api_stem(stem: &str) -> Option<(&str, &str)> {
    if stem.contains('.') {
        return None;
    }
    let (service, version) = stem.split_once('-')?;
    let valid_service = !service.is_empty()
        && service
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    (valid_service && !version.is_empty()).then_some((service, version))
}

async fn read_sdk_version(root: &Path) -> Result<Option<String>, SourceError> {
    let path = root.join("package.json");
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(read_error(&path, e)),
    };
    let manifest: PackageManifest = serde_json::from_str(&text).map_err(|e| SourceError::InvalidDefinition {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(manifest.version)
}

fn read_error(path: &Path, e: std::io::Error) -> SourceError {
    SourceError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_fixture_library;

    #[test]
    fn api_stems() {
        assert_eq!(parse_api_stem("s3-2006-03-01"), Some(("s3", "2006-03-01")));
        assert_eq!(
            parse_api_stem("dynamodb-2011-12-05-preview"),
            Some(("dynamodb", "2011-12-05-preview"))
        );
        assert_eq!(parse_api_stem("s3-2006-03-01.paginators"), None);
        assert_eq!(parse_api_stem("S3-2006-03-01"), None);
        assert_eq!(parse_api_stem("metadata"), None);
        assert_eq!(parse_api_stem("s3-"), None);
    }

    #[tokio::test]
    async fn open_builds_catalog() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());

        let lib = SdkLibrary::open(dir.path()).await.unwrap();
        let catalog = lib.catalog();
        assert_eq!(catalog.sdk_version(), Some("2.0.0"));
        assert!(catalog.contains("s3"));
        assert!(catalog.contains("sts"));
        assert_eq!(catalog.latest("s3"), Some("2006-03-01"));
        assert_eq!(lib.cache_name(), "v2.0.0");
        assert_eq!(lib.entry_point(), dir.path().join("lib").join("browser.js"));
    }

    #[tokio::test]
    async fn resolve_returns_header_and_versions() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let lib = SdkLibrary::open(dir.path()).await.unwrap();

        let handle = lib.resolve("dynamodb").await.unwrap();
        assert!(handle.source.contains("AWS.DynamoDB"));
        assert_eq!(handle.versions, vec!["2011-12-05-preview", "2012-08-10"]);
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let lib = SdkLibrary::open(dir.path()).await.unwrap();

        assert!(matches!(
            lib.resolve("doesnotexist").await,
            Err(SourceError::NotFound(name)) if name == "doesnotexist"
        ));
        assert!(matches!(
            lib.definition("s3", "1999-01-01").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn definition_loads_document() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_library(dir.path());
        let lib = SdkLibrary::open(dir.path()).await.unwrap();

        let def = lib.definition("s3", "2006-03-01").await.unwrap();
        assert_eq!(def.class_name().as_deref(), Some("S3"));
    }

    #[tokio::test]
    async fn missing_apis_dir_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SdkLibrary::open(dir.path()).await,
            Err(SourceError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn cache_name_without_manifest_uses_dir_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("aws-sdk-master");
        std::fs::create_dir_all(root.join("apis")).unwrap();
        let lib = SdkLibrary::open(&root).await.unwrap();
        assert_eq!(lib.cache_name(), "aws-sdk-master");
    }
}
