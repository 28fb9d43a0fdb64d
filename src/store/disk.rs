//! Disk layer: a fixed set of optional JSON files in the configuration directory.

use super::model::{EntryPatch, StorePatch};
use super::merge::deep_merge;
use crate::error::{StoreError, StoreResult};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Root-shaped partial stores, merged in this order (later wins).
pub const CONFIG_FILES: [&str; 6] = [
    "seo.json",
    "brand.json",
    "labels.json",
    "templates.json",
    "pages.json",
    "overrides.json",
];

/// Legal pages live under `pages/<key>.json` as `{ "seo": <entry> }` and only
/// ever patch `pages.<key>`.
pub const LEGAL_PAGES: [&str; 3] = ["privacy", "terms", "contact"];

/// First existing directory of: configured → `seo-config` → `seo` → project root.
pub fn resolve_config_dir(configured: Option<&Path>, project_root: &Path) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain([project_root.join("seo-config"), project_root.join("seo")])
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| project_root.to_path_buf())
}

pub fn watched_files(dir: &Path) -> Vec<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .chain(LEGAL_PAGES.iter().map(|key| legal_page_path(dir, key)))
        .collect()
}

fn legal_page_path(dir: &Path, key: &str) -> PathBuf {
    dir.join("pages").join(format!("{key}.json"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Size and mtime of every watched file; `None` for absent files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSignature {
    pub dir: PathBuf,
    pub stamps: Vec<Option<FileStamp>>,
}

pub fn disk_signature(dir: &Path) -> DiskSignature {
    let stamps = watched_files(dir)
        .iter()
        .map(|path| {
            let meta = fs::metadata(path).ok().filter(|m| m.is_file())?;
            Some(FileStamp {
                size: meta.len(),
                modified: meta.modified().ok(),
            })
        })
        .collect();
    DiskSignature {
        dir: dir.to_path_buf(),
        stamps,
    }
}

/// What the configuration directory contributes. Legal pages are kept apart
/// because they apply after the environment layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskLayers {
    pub files: Option<StorePatch>,
    pub legal_pages: Option<StorePatch>,
}

impl DiskLayers {
    pub fn is_empty(&self) -> bool {
        self.files.is_none() && self.legal_pages.is_none()
    }
}

pub fn load_disk_layers(dir: &Path) -> DiskLayers {
    DiskLayers {
        files: load_config_files(dir),
        legal_pages: load_legal_pages(dir),
    }
}

/// Read and merge every present, well-formed file. `None` when nothing usable exists.
fn load_config_files(dir: &Path) -> Option<StorePatch> {
    let mut acc = Value::Object(Map::new());
    let mut found = false;

    for name in CONFIG_FILES {
        let path = dir.join(name);
        let Some(value) = read_layer_file(&path) else {
            continue;
        };
        // Validate per file so one bad file cannot poison the others.
        if let Err(e) = serde_json::from_value::<StorePatch>(value.clone()) {
            warn!("ignoring {}: {}", path.display(), StoreError::json(name, e));
            continue;
        }
        debug!("merging disk layer {}", path.display());
        deep_merge(&mut acc, value);
        found = true;
    }

    found.then(|| into_patch(acc)).flatten()
}

/// `{ "pages": { <key>: <entry> } }` for every readable legal page.
fn load_legal_pages(dir: &Path) -> Option<StorePatch> {
    let mut pages = Map::new();
    for key in LEGAL_PAGES {
        if let Some(entry) = read_legal_page(&legal_page_path(dir, key)) {
            pages.insert(key.to_owned(), entry);
        }
    }
    if pages.is_empty() {
        return None;
    }
    let mut patch = Map::new();
    patch.insert("pages".to_owned(), Value::Object(pages));
    into_patch(Value::Object(patch))
}

fn into_patch(value: Value) -> Option<StorePatch> {
    match serde_json::from_value(value) {
        Ok(patch) => Some(patch),
        Err(e) => {
            warn!("merged disk layer rejected: {e}");
            None
        }
    }
}

fn read_layer_file(path: &Path) -> Option<Value> {
    match read_json(path) {
        Ok(Some(value)) if value.is_object() => Some(value),
        Ok(Some(_)) => {
            warn!("ignoring {}: top level is not an object", path.display());
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

fn read_legal_page(path: &Path) -> Option<Value> {
    let value = read_layer_file(path)?;
    let seo = value.get("seo")?.clone();
    match serde_json::from_value::<EntryPatch>(seo.clone()) {
        Ok(_) => Some(seo),
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

/// `Ok(None)` when the file does not exist.
fn read_json(path: &Path) -> StoreResult<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::json(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn config_dir_prefers_configured_then_seo_config_then_seo() {
        let root = TempDir::new().unwrap();
        assert_eq!(resolve_config_dir(None, root.path()), root.path());

        fs::create_dir(root.path().join("seo")).unwrap();
        assert_eq!(resolve_config_dir(None, root.path()), root.path().join("seo"));

        fs::create_dir(root.path().join("seo-config")).unwrap();
        assert_eq!(resolve_config_dir(None, root.path()), root.path().join("seo-config"));

        let custom = root.path().join("custom");
        fs::create_dir(&custom).unwrap();
        assert_eq!(resolve_config_dir(Some(&custom), root.path()), custom);

        let missing = root.path().join("missing");
        assert_eq!(
            resolve_config_dir(Some(&missing), root.path()),
            root.path().join("seo-config")
        );
    }

    #[test]
    fn empty_dir_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(load_disk_layers(dir.path()).is_empty());
    }

    #[test]
    fn files_merge_in_order_and_malformed_ones_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "seo.json", r#"{"brand":{"siteName":"Base","logo":"/a.png"}}"#);
        write(dir.path(), "brand.json", r#"{"brand":{"siteName":"Acme"}}"#);
        write(dir.path(), "pages.json", "{ not json");
        write(dir.path(), "labels.json", r#"{"labels":{"sports":"not a map"}}"#);

        let layers = load_disk_layers(dir.path());
        assert!(layers.legal_pages.is_none());
        let patch = layers.files.unwrap();
        let brand = patch.brand.unwrap();
        assert_eq!(brand.site_name.as_deref(), Some("Acme"));
        assert_eq!(brand.logo.as_deref(), Some("/a.png"));
        assert!(patch.labels.is_none());
    }

    #[test]
    fn legal_pages_patch_only_their_page() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "pages/privacy.json",
            r#"{"seo":{"title":"Privacy at Acme"},"body":"ignored"}"#,
        );
        write(dir.path(), "pages/terms.json", r#"{"title":"no seo key"}"#);

        let layers = load_disk_layers(dir.path());
        assert!(layers.files.is_none());
        let patch = layers.legal_pages.unwrap();
        let pages = patch.pages.unwrap();
        assert_eq!(pages["privacy"].title.as_deref(), Some("Privacy at Acme"));
        assert!(!pages.contains_key("terms"));
        assert!(patch.brand.is_none());
    }

    #[test]
    fn signature_tracks_size_changes() {
        let dir = TempDir::new().unwrap();
        let empty = disk_signature(dir.path());
        assert!(empty.stamps.iter().all(Option::is_none));

        write(dir.path(), "seo.json", "{}");
        let one = disk_signature(dir.path());
        assert_ne!(empty, one);
        assert_eq!(one, disk_signature(dir.path()));

        write(dir.path(), "seo.json", r#"{"brand":{}}"#);
        assert_ne!(one, disk_signature(dir.path()));
    }
}
