//! Reads exported workflow documents from a directory

use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::workflow::classify;
use crate::domain::{DomainError, RawWorkflow, Workflow, WorkflowSummary};

/// Errors raised while reading or parsing workflow documents
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {filename}: {source}")]
    Parse {
        filename: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<LoadError> for DomainError {
    fn from(err: LoadError) -> Self {
        DomainError::storage(err.to_string())
    }
}

/// Raw bytes of one document as found on disk
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Hex SHA-256 of the document bytes
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

/// Documents read from the directory plus the number of unreadable files
#[derive(Debug, Default)]
pub struct DirectoryScan {
    pub documents: Vec<SourceDocument>,
    pub unreadable: usize,
}

/// Loads `*.json` workflow exports from a single directory
#[derive(Debug, Clone)]
pub struct WorkflowLoader {
    dir: PathBuf,
}

impl WorkflowLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a catalog file, or `None` when the name could escape the directory
    pub fn document_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename.contains("..")
            || !filename.ends_with(".json")
        {
            return None;
        }
        Some(self.dir.join(filename))
    }

    /// Read every `*.json` file (non-recursive), sorted by filename.
    ///
    /// A missing directory yields an empty scan.
    pub async fn scan(&self) -> Result<DirectoryScan, LoadError> {
        let mut scan = DirectoryScan::default();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Workflow directory not found");
                return Ok(scan);
            }
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.dir.display().to_string(),
                    source,
                });
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| LoadError::Io {
            path: self.dir.display().to_string(),
            source,
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                scan.unreadable += 1;
                continue;
            };

            match tokio::fs::read(&path).await {
                Ok(bytes) => scan.documents.push(SourceDocument {
                    filename: filename.to_string(),
                    bytes,
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read workflow file");
                    scan.unreadable += 1;
                }
            }
        }

        debug!(
            dir = %self.dir.display(),
            documents = scan.documents.len(),
            unreadable = scan.unreadable,
            "Scanned workflow directory"
        );

        Ok(scan)
    }

    /// Read the original bytes of one catalog document
    pub async fn read_document(&self, filename: &str) -> Result<Option<Vec<u8>>, LoadError> {
        let Some(path) = self.document_path(filename) else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LoadError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// Build a catalog record from a workflow document
pub fn parse_document(document: &SourceDocument) -> Result<Workflow, LoadError> {
    let raw: RawWorkflow =
        serde_json::from_slice(&document.bytes).map_err(|source| LoadError::Parse {
            filename: document.filename.clone(),
            source,
        })?;

    let name = raw
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| name_from_filename(&document.filename));

    let trigger = classify::derive_trigger(&raw.nodes);
    let node_count = raw.nodes.len();
    let integrations = classify::derive_integrations(&raw.nodes);

    let summary = WorkflowSummary {
        filename: document.filename.clone(),
        name,
        active: raw.extra.get("active").and_then(Value::as_bool).unwrap_or(false),
        description: classify::describe(trigger, integrations.len(), node_count),
        trigger: trigger.to_string(),
        complexity: classify::derive_complexity(node_count).to_string(),
        node_count,
        integrations,
        tags: extract_tags(raw.extra.get("tags")),
        created_at: string_field(&raw, "createdAt"),
        updated_at: string_field(&raw, "updatedAt"),
        file_hash: document.hash(),
        file_size: document.bytes.len() as u64,
    };

    Ok(Workflow::new(summary).with_raw_workflow(raw))
}

fn name_from_filename(filename: &str) -> String {
    let stem = filename.strip_suffix(".json").unwrap_or(filename);
    stem.replace(['_', '-'], " ").trim().to_string()
}

fn string_field(raw: &RawWorkflow, key: &str) -> Option<String> {
    raw.extra.get(key).and_then(Value::as_str).map(String::from)
}

/// Tags are either plain strings or `{ "name": ... }` objects
fn extract_tags(tags: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = tags else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(tag) => Some(tag.clone()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    fn document(filename: &str, value: Value) -> SourceDocument {
        SourceDocument {
            filename: filename.to_string(),
            bytes: serde_json::to_vec(&value).unwrap(),
        }
    }

    #[test]
    fn test_parse_document_derives_metadata() {
        let doc = document(
            "telegram_bot.json",
            json!({
                "name": "Telegram Bot",
                "active": true,
                "tags": [{"id": "1", "name": "chat"}, "bots"],
                "createdAt": "2024-01-01T00:00:00.000Z",
                "nodes": [
                    {"name": "On Message", "type": "n8n-nodes-base.telegramTrigger"},
                    {"name": "Reply", "type": "n8n-nodes-base.telegram"},
                    {"name": "Log", "type": "n8n-nodes-base.googleSheets"}
                ],
                "connections": {
                    "On Message": {"main": [[{"node": "Reply", "type": "main", "index": 0}]]}
                }
            }),
        );

        let workflow = parse_document(&doc).unwrap();
        let summary = workflow.summary();

        assert_eq!(summary.filename, "telegram_bot.json");
        assert_eq!(summary.name, "Telegram Bot");
        assert!(summary.active);
        assert_eq!(summary.trigger, "Triggered");
        assert_eq!(summary.complexity, "low");
        assert_eq!(summary.node_count, 3);
        assert_eq!(summary.integrations, vec!["Telegram", "GoogleSheets"]);
        assert_eq!(summary.tags, vec!["chat", "bots"]);
        assert_eq!(summary.created_at.as_deref(), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(summary.updated_at, None);
        assert_eq!(summary.file_hash.len(), 64);
        assert_eq!(summary.file_size, doc.bytes.len() as u64);
        assert!(summary.description.contains("2 services"));

        let raw = workflow.raw_workflow().unwrap();
        assert_eq!(raw.connections.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_document_name_fallback() {
        let doc = document("daily-report_sync.json", json!({"nodes": []}));
        let workflow = parse_document(&doc).unwrap();

        assert_eq!(workflow.summary().name, "daily report sync");
        assert!(!workflow.summary().active);
        assert_eq!(workflow.summary().trigger, "Manual");
    }

    #[test]
    fn test_parse_document_rejects_invalid_json() {
        let doc = SourceDocument {
            filename: "broken.json".to_string(),
            bytes: b"{ not json".to_vec(),
        };

        let err = parse_document(&doc).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_hash_is_stable() {
        let a = document("a.json", json!({"nodes": []}));
        let b = document("b.json", json!({"nodes": []}));
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_document_path_rejects_traversal() {
        let loader = WorkflowLoader::new("/srv/workflows");

        assert!(loader.document_path("ok.json").is_some());
        assert!(loader.document_path("../etc/passwd.json").is_none());
        assert!(loader.document_path("sub/a.json").is_none());
        assert!(loader.document_path("notes.txt").is_none());
        assert!(loader.document_path("").is_none());
    }

    #[tokio::test]
    async fn test_scan_reads_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{"nodes": []}"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{"nodes": []}"#).unwrap();
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();

        let scan = WorkflowLoader::new(dir.path()).scan().await.unwrap();
        let names: Vec<&str> = scan.documents.iter().map(|d| d.filename.as_str()).collect();

        assert_eq!(names, vec!["a.json", "b.json"]);
        assert_eq!(scan.unreadable, 0);
    }

    #[tokio::test]
    async fn test_scan_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loader = WorkflowLoader::new(dir.path().join("absent"));

        let scan = loader.scan().await.unwrap();
        assert!(scan.documents.is_empty());
    }

    #[tokio::test]
    async fn test_read_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), b"{}").unwrap();
        let loader = WorkflowLoader::new(dir.path());

        assert_eq!(loader.read_document("a.json").await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(loader.read_document("missing.json").await.unwrap(), None);
        assert_eq!(loader.read_document("../a.json").await.unwrap(), None);
    }
}
