//! Content-addressed artifact store (C2).
//!
//! Layout: `<root>/artifacts/<Type>/<artifact_id>.json`. The store owns the
//! on-disk bytes exclusively; callers hand it values, never paths, except
//! through [`ArtifactStore::resolve_reference`].

use std::io::Write;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use sudoku_contracts::ArtifactType;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("artifact not found: {0}")]
    NotFound(String),
    #[error(
        "caller-supplied artifact_id '{supplied}' does not match computed id '{computed}'"
    )]
    IdMismatch { supplied: String, computed: String },
    #[error("stored value is not a JSON object")]
    NotAnObject,
    #[error("canonicalization failed: {0}")]
    Codec(#[from] sudoku_codec::CodecError),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored JSON at {path} failed to parse: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A reference as accepted by `resolve_reference`: either a content id or a
/// filesystem path relative to the project root (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Digest(String),
    Path(Utf8PathBuf),
}

pub struct ArtifactStore {
    root: Utf8PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn type_dir(&self, artifact_type: ArtifactType) -> Utf8PathBuf {
        self.root.join("artifacts").join(artifact_type.as_str())
    }

    /// Persist `value` (a fully-formed artifact, `artifact_id` included or
    /// not) under its computed content id. Writing an existing id with
    /// identical canonical bytes is a no-op; writing a caller-supplied id
    /// that disagrees with the computed one is refused.
    pub fn save(
        &self,
        artifact_type: ArtifactType,
        value: &serde_json::Value,
    ) -> Result<String, StoreError> {
        let computed_id = sudoku_codec::compute_artifact_id(value)?;

        if let Some(obj) = value.as_object() {
            if let Some(serde_json::Value::String(supplied)) = obj.get("artifact_id") {
                if supplied != &computed_id {
                    return Err(StoreError::IdMismatch {
                        supplied: supplied.clone(),
                        computed: computed_id,
                    });
                }
            }
        } else {
            return Err(StoreError::NotAnObject);
        }

        let mut finalized = value.clone();
        finalized["artifact_id"] = serde_json::Value::String(computed_id.clone());
        let bytes = sudoku_codec::canonicalize(&finalized)?;

        let dir = self.type_dir(artifact_type);
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(format!("{computed_id}.json"));

        write_atomic(&path, &bytes)?;
        tracing::debug!(artifact_id = %computed_id, %artifact_type, "saved artifact");
        Ok(computed_id)
    }

    /// Resolve `id` by scanning type directories; fails `NotFound` if absent.
    pub fn load(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        for artifact_type in ArtifactType::ALL {
            let path = self.type_dir(artifact_type).join(format!("{id}.json"));
            if path.exists() {
                return self.load_path(&path);
            }
        }
        Err(StoreError::NotFound(id.to_string()))
    }

    /// Load an artifact known to be of a specific type, skipping the scan.
    pub fn load_typed(
        &self,
        artifact_type: ArtifactType,
        id: &str,
    ) -> Result<serde_json::Value, StoreError> {
        let path = self.type_dir(artifact_type).join(format!("{id}.json"));
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.load_path(&path)
    }

    fn load_path(&self, path: &Utf8Path) -> Result<serde_json::Value, StoreError> {
        let bytes = std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `"sha256-..."` strings resolve as content ids; everything else is a
    /// filesystem path relative to the project root.
    pub fn resolve_reference(&self, reference: &str) -> Reference {
        if reference.starts_with("sha256-") {
            Reference::Digest(reference.to_string())
        } else {
            Reference::Path(self.root.join(reference))
        }
    }
}

fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir.as_std_path()).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    tmp.write_all(bytes).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.as_file().sync_all().map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    persist(tmp, path.as_std_path())
}

fn persist(tmp: NamedTempFile, dest: &Path) -> Result<(), StoreError> {
    tmp.persist(dest)
        .map(|_file| ())
        .map_err(|e| StoreError::Io {
            path: Utf8PathBuf::from_path_buf(dest.to_path_buf()).unwrap_or_default(),
            source: e.error,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, ArtifactStore::new(root))
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let value = json!({"type": "Spec", "name": "demo"});
        let id = store.save(ArtifactType::Spec, &value).unwrap();
        assert!(id.starts_with("sha256-"));
        let loaded = store.load(&id).unwrap();
        assert_eq!(loaded["artifact_id"], json!(id));
        assert_eq!(loaded["name"], json!("demo"));
    }

    #[test]
    fn save_is_idempotent() {
        let (_dir, store) = store();
        let value = json!({"type": "Spec", "name": "demo"});
        let id1 = store.save(ArtifactType::Spec, &value).unwrap();
        let id2 = store.save(ArtifactType::Spec, &value).unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn save_rejects_mismatched_caller_id() {
        let (_dir, store) = store();
        let value = json!({"type": "Spec", "name": "demo", "artifact_id": "sha256-deadbeef"});
        let err = store.save(ArtifactType::Spec, &value).unwrap_err();
        assert!(matches!(err, StoreError::IdMismatch { .. }));
    }

    #[test]
    fn load_missing_is_not_found() {
        let (_dir, store) = store();
        let err = store.load("sha256-missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn resolve_reference_distinguishes_digest_and_path() {
        let (_dir, store) = store();
        assert_eq!(
            store.resolve_reference("sha256-abc"),
            Reference::Digest("sha256-abc".to_string())
        );
        assert_eq!(
            store.resolve_reference("exports/demo.pdf"),
            Reference::Path(store.root().join("exports/demo.pdf"))
        );
    }
}
