//! Input layout discovery and metadata loading.
//!
//! The input root holds documents directly, one subdirectory per batch, or
//! both. Every document may have a sibling `<stem>.json` metadata file.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, glob_with};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::InputError;
use crate::models::field::ExpectedField;

/// Kind of document file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Recognize `pdf`, `jpg`, `jpeg` and `png` (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" => Some(Self::Image),
            _ => None,
        }
    }
}

/// A document found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub path: PathBuf,
    /// File name, used as the document identifier in reports.
    pub document_id: String,
    /// Name of the batch subdirectory, if any.
    pub batch_id: Option<String>,
    pub kind: DocumentKind,
}

impl DocumentSource {
    /// Describe a single document file; `None` if its extension is not supported.
    pub fn from_path(path: impl Into<PathBuf>, batch_id: Option<String>) -> Option<Self> {
        let path = path.into();
        let kind = DocumentKind::from_path(&path)?;
        let document_id = path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            path,
            document_id,
            batch_id,
            kind,
        })
    }

    /// Sibling metadata file sharing the document's base name.
    pub fn metadata_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }
}

/// Find every document directly under `root` or one level below it.
///
/// Documents are returned grouped by batch (root-level first), sorted by
/// path within each batch.
pub fn discover_documents(root: &Path) -> Result<Vec<DocumentSource>, InputError> {
    if !root.is_dir() {
        return Err(InputError::NotADirectory(root.to_path_buf()));
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let escaped = Pattern::escape(&root.to_string_lossy());

    let mut documents = Vec::new();
    for (pattern, nested) in [(format!("{}/*", escaped), false), (format!("{}/*/*", escaped), true)] {
        for path in glob_with(&pattern, options)?.filter_map(|r| r.ok()) {
            if !path.is_file() {
                continue;
            }

            let batch_id = if nested {
                path.parent()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
            } else {
                None
            };

            if let Some(source) = DocumentSource::from_path(path, batch_id) {
                documents.push(source);
            }
        }
    }

    documents.sort_by(|a, b| (&a.batch_id, &a.path).cmp(&(&b.batch_id, &b.path)));
    debug!("Discovered {} documents under {}", documents.len(), root.display());
    Ok(documents)
}

/// Read a flat metadata mapping. A missing file is `Ok(None)`.
pub fn read_metadata(path: &Path) -> Result<Option<Map<String, Value>>, InputError> {
    if !path.exists() {
        return Ok(None);
    }

    let metadata_error = |reason: String| InputError::Metadata {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| metadata_error(e.to_string()))?;
    match serde_json::from_str(&content).map_err(|e| metadata_error(e.to_string()))? {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(metadata_error("expected a JSON object".to_string())),
    }
}

/// Expected fields for a document.
///
/// A missing or unreadable metadata file means no expected fields.
pub fn load_expected_fields(path: &Path) -> Vec<ExpectedField> {
    match read_metadata(path) {
        Ok(Some(map)) => ExpectedField::from_metadata(&map),
        Ok(None) => {
            debug!("No metadata at {}", path.display());
            Vec::new()
        }
        Err(e) => {
            warn!("Ignoring {}", e);
            Vec::new()
        }
    }
}
