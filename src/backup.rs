//! Versioned catalog backups
//!
//! A backup is a JSON document holding the catalog rows plus metadata with a
//! SHA-256 checksum over the serialized rows. Alongside the JSON a plain CSV
//! copy is written for eyeballing. Rotation keeps the newest N pairs.

use crate::error::{Result, SnippetError};
use crate::model::{Catalog, Snippet};
use crate::store;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const DEFAULT_KEEP: usize = 30;
pub const DEFAULT_PREFIX: &str = "backup";
/// Bumped whenever the backup document layout changes
pub const FORMAT_VERSION: &str = "2.0";

const FILENAME_STAMP: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub version: String,
    /// Filename-style stamp, e.g. "20260807_143000"
    pub timestamp: String,
    /// Full ISO-8601 creation time
    pub created_at: String,
    /// Where the rows came from (catalog path or sheet name)
    pub source: String,
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub metadata: BackupMetadata,
    pub rows: Vec<Snippet>,
}

#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub keep: usize,
    pub write_csv: bool,
}

impl BackupConfig {
    pub fn new(dir: &Path) -> Self {
        BackupConfig {
            dir: dir.to_path_buf(),
            prefix: DEFAULT_PREFIX.to_string(),
            keep: DEFAULT_KEEP,
            write_csv: true,
        }
    }
}

/// One backup file as seen by `list_backups`
#[derive(Debug, Clone)]
pub struct BackupSummary {
    pub path: PathBuf,
    pub file_name: String,
    pub created_at: String,
    pub stamp: NaiveDateTime,
    pub row_count: usize,
    pub checksum: String,
    pub size_kb: f64,
}

/// SHA-256 over the canonical JSON serialization of the rows
pub fn checksum_rows(rows: &[Snippet]) -> Result<String> {
    use std::fmt::Write;

    let canonical = serde_json::to_string(rows)?;
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}

/// Create a backup stamped with the current UTC time
pub fn create_backup(catalog: &Catalog, config: &BackupConfig, source: &str) -> Result<PathBuf> {
    let stamp = Utc::now().format(FILENAME_STAMP).to_string();
    create_backup_at(catalog, config, source, &stamp)
}

/// Create a backup with an explicit timestamp string
pub fn create_backup_at(
    catalog: &Catalog,
    config: &BackupConfig,
    source: &str,
    stamp: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.dir)?;

    let metadata = BackupMetadata {
        version: FORMAT_VERSION.to_string(),
        timestamp: stamp.to_string(),
        created_at: Utc::now().to_rfc3339(),
        source: source.to_string(),
        row_count: catalog.len(),
        column_count: catalog.headers.len(),
        headers: catalog.headers.clone(),
        checksum: checksum_rows(&catalog.rows)?,
    };

    let json_path = config.dir.join(format!("{}_{}.json", config.prefix, stamp));
    let document = BackupDocument {
        metadata,
        rows: catalog.rows.clone(),
    };
    let file = std::fs::File::create(&json_path)?;
    serde_json::to_writer_pretty(file, &document)?;

    if config.write_csv {
        let csv_path = json_path.with_extension("csv");
        store::write_catalog_file(catalog, &csv_path)?;
    }

    let removed = rotate_backups(&config.dir, &config.prefix, config.keep)?;
    for old in &removed {
        log::debug!("rotated out old backup {}", old.display());
    }

    Ok(json_path)
}

/// Read and deserialize a backup document
pub fn read_backup(path: &Path) -> Result<BackupDocument> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

/// Recompute the row checksum and compare with the recorded one
pub fn verify_backup(path: &Path) -> Result<BackupDocument> {
    let document = read_backup(path)?;
    let actual = checksum_rows(&document.rows)?;
    if actual != document.metadata.checksum {
        return Err(SnippetError::ChecksumMismatch {
            expected: document.metadata.checksum.clone(),
            actual,
        });
    }
    Ok(document)
}

/// All backups in a directory, newest first
pub fn list_backups(dir: &Path, prefix: &str) -> Result<Vec<BackupSummary>> {
    let mut backups = Vec::new();
    if !dir.exists() {
        return Ok(backups);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".json") {
            continue;
        }

        let document = match read_backup(&path) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("skipping unreadable backup {}: {}", path.display(), e);
                continue;
            }
        };

        let stamp = parse_stamp(file_name, prefix)
            .or_else(|| file_mtime(&path))
            .unwrap_or_default();
        let size_kb = entry.metadata().map(|m| m.len() as f64 / 1024.0).unwrap_or(0.0);

        backups.push(BackupSummary {
            file_name: file_name.to_string(),
            created_at: document.metadata.created_at.clone(),
            stamp,
            row_count: document.metadata.row_count,
            checksum: document.metadata.checksum.clone(),
            size_kb,
            path,
        });
    }

    backups.sort_by(|a, b| b.stamp.cmp(&a.stamp));
    Ok(backups)
}

fn parse_stamp(file_name: &str, prefix: &str) -> Option<NaiveDateTime> {
    let stamp = file_name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(".json")?;
    NaiveDateTime::parse_from_str(stamp, FILENAME_STAMP).ok()
}

fn file_mtime(path: &Path) -> Option<NaiveDateTime> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let datetime: chrono::DateTime<Utc> = modified.into();
    Some(datetime.naive_utc())
}

/// Delete the oldest backups beyond the retention count
///
/// The paired CSV is removed together with each JSON. Retention is clamped
/// to 1 so the newest backup always survives. Returns the removed paths.
pub fn rotate_backups(dir: &Path, prefix: &str, keep: usize) -> Result<Vec<PathBuf>> {
    let keep = keep.max(1);
    let backups = list_backups(dir, prefix)?;
    let mut removed = Vec::new();

    for backup in backups.into_iter().skip(keep) {
        let csv_path = backup.path.with_extension("csv");
        if csv_path.exists() {
            std::fs::remove_file(&csv_path)?;
        }
        std::fs::remove_file(&backup.path)?;
        removed.push(backup.path);
    }

    Ok(removed)
}

/// What changed between the newest backup and the current catalog
#[derive(Debug, Clone)]
pub struct ChangeReport {
    pub backup_name: String,
    pub backup_rows: usize,
    pub current_rows: usize,
    pub added_rows: usize,
    pub removed_rows: usize,
    pub changed: bool,
}

/// Compare the catalog against the newest backup; None when no backup exists
pub fn detect_changes(
    catalog: &Catalog,
    dir: &Path,
    prefix: &str,
) -> Result<Option<ChangeReport>> {
    let backups = list_backups(dir, prefix)?;
    let Some(latest) = backups.first() else {
        return Ok(None);
    };

    let document = read_backup(&latest.path)?;
    let current_checksum = checksum_rows(&catalog.rows)?;

    let backup_rows = document.metadata.row_count;
    let current_rows = catalog.len();

    Ok(Some(ChangeReport {
        backup_name: latest.file_name.clone(),
        backup_rows,
        current_rows,
        added_rows: current_rows.saturating_sub(backup_rows),
        removed_rows: backup_rows.saturating_sub(current_rows),
        changed: current_checksum != document.metadata.checksum,
    }))
}

#[derive(Debug, Clone)]
pub struct RestoreReport {
    pub restored_rows: usize,
    pub backup_created_at: String,
    pub checksum: String,
    pub safety_backup: Option<PathBuf>,
    pub row_count_verified: bool,
}

/// Replace the catalog file with a backup's contents
///
/// The backup checksum is verified before anything is touched. When a
/// safety config is given and the catalog file exists, the current contents
/// are backed up first so the restore can itself be undone.
pub fn restore_backup(
    backup_path: &Path,
    catalog_path: &Path,
    safety: Option<&BackupConfig>,
) -> Result<RestoreReport> {
    let document = verify_backup(backup_path)?;

    let safety_backup = match safety {
        Some(config) if catalog_path.exists() => {
            let current = store::read_catalog_file(catalog_path)?;
            let mut config = config.clone();
            config.write_csv = false;
            Some(create_backup(
                &current,
                &config,
                &catalog_path.display().to_string(),
            )?)
        }
        _ => None,
    };

    let restored = Catalog {
        rows: document.rows,
        headers: document.metadata.headers.clone(),
    };
    store::write_catalog_file(&restored, catalog_path)?;

    let reread = store::read_catalog_file(catalog_path)?;
    let row_count_verified = reread.len() == document.metadata.row_count;
    if !row_count_verified {
        log::warn!(
            "restore row count mismatch: expected {}, found {}",
            document.metadata.row_count,
            reread.len()
        );
    }

    Ok(RestoreReport {
        restored_rows: reread.len(),
        backup_created_at: document.metadata.created_at,
        checksum: document.metadata.checksum,
        safety_backup,
        row_count_verified,
    })
}
