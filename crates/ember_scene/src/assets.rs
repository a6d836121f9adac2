//! Asset resolution for archetype and base-document inclusion.
//!
//! The scene core only consumes the contract: a path resolves to a decoded
//! document tree. Where the bytes come from (disk, pack file, network
//! cache) is the embedder's concern.

use std::collections::HashMap;
use std::path::PathBuf;

use ember_codec::{DecodeError, Value};

/// Resolves a path to a decoded document tree.
pub trait AssetSource {
    /// Load and decode the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Asset`] when the path cannot be resolved and
    /// other [`DecodeError`] variants when the content is malformed.
    fn load(&self, path: &str) -> Result<Value, DecodeError>;
}

/// An asset source that resolves nothing.
///
/// The right choice when decoding documents that are known to contain no
/// archetype or base references.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn load(&self, path: &str) -> Result<Value, DecodeError> {
        Err(DecodeError::Asset {
            path: path.to_string(),
            reason: "no asset source configured".to_string(),
        })
    }
}

/// An in-memory asset source, for tests and programmatic documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    documents: HashMap<String, Value>,
}

impl MemoryAssets {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document under `path`, replacing any previous document.
    pub fn insert(&mut self, path: impl Into<String>, document: Value) {
        self.documents.insert(path.into(), document);
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, path: &str) -> Result<Value, DecodeError> {
        self.documents.get(path).cloned().ok_or_else(|| DecodeError::Asset {
            path: path.to_string(),
            reason: "document not found".to_string(),
        })
    }
}

/// A directory-backed asset source reading JSON documents from disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Create a source rooted at `root`; paths resolve relative to it.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn load(&self, path: &str) -> Result<Value, DecodeError> {
        let full = self.root.join(path);
        let bytes = std::fs::read(&full).map_err(|err| DecodeError::Asset {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| DecodeError::Asset {
            path: path.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_assets_always_fails() {
        let err = NoAssets.load("anything.json").unwrap_err();
        assert!(matches!(err, DecodeError::Asset { .. }));
    }

    #[test]
    fn test_memory_assets_roundtrip() {
        let mut assets = MemoryAssets::new();
        assets.insert("archetypes/tree.json", serde_json::json!({"components": []}));

        let doc = assets.load("archetypes/tree.json").unwrap();
        assert!(doc["components"].is_array());
        assert!(assets.load("missing.json").is_err());
    }

    #[test]
    fn test_dir_assets_reports_missing_files() {
        let assets = DirAssets::new("/nonexistent-root");
        let err = assets.load("scene.json").unwrap_err();
        match err {
            DecodeError::Asset { path, .. } => assert_eq!(path, "scene.json"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
