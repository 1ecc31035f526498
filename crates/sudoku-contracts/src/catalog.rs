//! Schema catalog & loader (C3).
//!
//! `PuzzleContracts/catalog.json` maps each artifact type to
//! `{version, schema_id, schema_path}` (spec.md §6.5). Descriptors and parsed
//! schema documents are cached process-wide once loaded; tests reset the
//! cache explicitly via [`Catalog::load`] on a fresh instance rather than a
//! global singleton, so repeated test runs never see stale state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::ArtifactType;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog is missing an entry for artifact type {0}")]
    MissingType(&'static str),
    #[error("schema path '{path}' escapes the contracts directory")]
    PathEscapesRoot { path: String },
    #[error("schema path '{path}' uses a non-local URI scheme")]
    NonLocalScheme { path: String },
    #[error("failed to read schema file {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema file {path}: {source}")]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub version: String,
    pub schema_id: String,
    pub schema_path: String,
}

/// Loaded catalog plus cached, parsed schema documents.
pub struct Catalog {
    root: PathBuf,
    entries: HashMap<String, CatalogEntry>,
    schemas: OnceCell<HashMap<String, serde_json::Value>>,
}

impl Catalog {
    /// Load `catalog.json` from `contracts_root` (e.g. `PuzzleContracts/`).
    pub fn load(contracts_root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = contracts_root.as_ref().to_path_buf();
        let catalog_path = root.join("catalog.json");
        let bytes = std::fs::read(&catalog_path).map_err(|source| CatalogError::Read {
            path: catalog_path.clone(),
            source,
        })?;
        let entries: HashMap<String, CatalogEntry> =
            serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse {
                path: catalog_path.clone(),
                source,
            })?;

        for entry in entries.values() {
            validate_schema_path(&root, &entry.schema_path)?;
        }

        Ok(Self {
            root,
            entries,
            schemas: OnceCell::new(),
        })
    }

    pub fn entry(&self, artifact_type: ArtifactType) -> Result<&CatalogEntry, CatalogError> {
        self.entries
            .get(artifact_type.as_str())
            .ok_or(CatalogError::MissingType(artifact_type.as_str()))
    }

    /// The catalog's expectation for an artifact's `schema_version`,
    /// `schema_id`, and `schema_path` fields must match exactly
    /// (spec.md §3.1).
    pub fn matches(
        &self,
        artifact_type: ArtifactType,
        schema_version: &str,
        schema_id: &str,
        schema_path: &str,
    ) -> Result<bool, CatalogError> {
        let entry = self.entry(artifact_type)?;
        Ok(entry.version == schema_version
            && entry.schema_id == schema_id
            && entry.schema_path == schema_path)
    }

    /// Load (and cache) the parsed JSON Schema document for `artifact_type`.
    pub fn schema_for(&self, artifact_type: ArtifactType) -> Result<&serde_json::Value, CatalogError> {
        let schemas = self.schemas.get_or_try_init(|| self.load_all_schemas())?;
        schemas
            .get(artifact_type.as_str())
            .ok_or(CatalogError::MissingType(artifact_type.as_str()))
    }

    fn load_all_schemas(&self) -> Result<HashMap<String, serde_json::Value>, CatalogError> {
        let mut out = HashMap::new();
        for (type_name, entry) in &self.entries {
            let schema_path = self.root.join(&entry.schema_path);
            let bytes = std::fs::read(&schema_path).map_err(|source| CatalogError::SchemaRead {
                path: schema_path.clone(),
                source,
            })?;
            let value: serde_json::Value =
                serde_json::from_slice(&bytes).map_err(|source| CatalogError::SchemaParse {
                    path: schema_path.clone(),
                    source,
                })?;
            out.insert(type_name.clone(), value);
        }
        Ok(out)
    }
}

/// Reject any schema path that escapes the contracts directory or uses a
/// non-local URI scheme (spec.md §4.3).
fn validate_schema_path(root: &Path, schema_path: &str) -> Result<(), CatalogError> {
    if schema_path.contains("://") {
        return Err(CatalogError::NonLocalScheme {
            path: schema_path.to_string(),
        });
    }
    let candidate = Path::new(schema_path);
    if candidate.is_absolute() {
        return Err(CatalogError::PathEscapesRoot {
            path: schema_path.to_string(),
        });
    }

    let mut depth: i64 = 0;
    for component in candidate.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(CatalogError::PathEscapesRoot {
                    path: schema_path.to_string(),
                })
            }
        }
        if depth < 0 {
            return Err(CatalogError::PathEscapesRoot {
                path: schema_path.to_string(),
            });
        }
    }

    let _ = root.join(candidate);
    Ok(())
}
