//! # File I/O Module
//!
//! Reads and writes form templates, observation records and settings:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent two designers editing one template
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Everything is JSON. Form templates conventionally use `.form.json`, lock
//! files add a `.lock` extension and carry metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use form_core::file_io::{save_form, load_form, FileLock};
//! use form_core::form::FormDefinition;
//! use std::path::Path;
//!
//! let form = FormDefinition::new("Vitals");
//! let path = Path::new("vitals.form.json");
//!
//! // Acquire lock before saving
//! let lock = FileLock::acquire(path, "designer@clinic.org").unwrap();
//!
//! save_form(&form, path).unwrap();
//!
//! // Lock is released when dropped
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FormSettings;
use crate::errors::{FormError, FormResult};
use crate::form::{FormDefinition, SCHEMA_VERSION};
use crate::metadata::Concept;
use crate::obs::Obs;

/// Lock file metadata stored in .lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Holds an OS-level lock (fs2) on the sidecar file and writes [`LockInfo`]
/// into it so other users can see who is editing.
pub struct FileLock {
    form_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a form file.
    ///
    /// Fails with [`FormError::FileLocked`] while another live process holds
    /// it. Stale locks (dead process, or older than a day) are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> FormResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(FormError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                debug!(path = %lock_path.display(), "taking over stale lock");
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| FormError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            FormError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| FormError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| FormError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            form_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone does.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let info = read_lock_info(&lock_path_for(path)).ok()?;
        (!is_lock_stale(&info)).then_some(info)
    }

    pub fn form_path(&self) -> &Path {
        &self.form_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `<path>.lock`, keeping the original extension.
fn lock_path_for(path: &Path) -> PathBuf {
    with_suffix(path, "lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_lock_info(lock_path: &Path) -> FormResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone (same machine) or it is more
/// than 24 hours old.
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().is_some_and(|ours| info.machine == ours) {
        #[cfg(windows)]
        {
            use std::process::Command;
            let output = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output();
            if let Ok(output) = output {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                    return true;
                }
            }
        }
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > 24
}

// ============================================================================
// Reading and writing
// ============================================================================

fn read_to_string(path: &Path, operation: &str) -> FormResult<String> {
    let mut file =
        File::open(path).map_err(|e| FormError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| FormError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> FormResult<T> {
    let contents = read_to_string(path, "read")?;
    serde_json::from_str(&contents).map_err(|e| FormError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Write `value` as pretty JSON: temp file, fsync, rename over `path`.
fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> FormResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = with_suffix(path, "tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| FormError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| FormError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| FormError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        FormError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

/// Save a form template with atomic write semantics.
pub fn save_form(form: &FormDefinition, path: &Path) -> FormResult<()> {
    write_json_atomic(form, path)
}

/// Load a form template and check its schema version.
///
/// # Returns
///
/// * `Err(FormError::VersionMismatch)` - File schema is incompatible
/// * `Err(FormError::SerializationError)` - Invalid JSON
/// * `Err(FormError::FileError)` - I/O error
pub fn load_form(path: &Path) -> FormResult<FormDefinition> {
    let form: FormDefinition = read_json(path)?;
    validate_version(&form.schema_version)?;
    Ok(form)
}

/// Load a form, also reporting whether someone else is editing it.
pub fn load_form_with_lock_check(path: &Path) -> FormResult<(FormDefinition, Option<LockInfo>)> {
    let form = load_form(path)?;
    Ok((form, FileLock::check(path)))
}

/// Save observation records. Live records without a uuid get a fresh one.
pub fn save_observations(records: &[Obs], path: &Path) -> FormResult<()> {
    let records: Vec<Obs> = records.iter().map(Obs::with_assigned_uuids).collect();
    write_json_atomic(&records, path)
}

pub fn load_observations(path: &Path) -> FormResult<Vec<Obs>> {
    read_json(path)
}

/// Load settings; absent fields take their defaults.
pub fn load_settings(path: &Path) -> FormResult<FormSettings> {
    read_json(path)
}

/// Load a concept (with any set members) to drop into a form.
pub fn load_concept(path: &Path) -> FormResult<Concept> {
    read_json(path)
}

/// Validate that a file schema version is compatible with [`SCHEMA_VERSION`].
fn validate_version(file_version: &str) -> FormResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || FormError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(file_major), Some(current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }

    // 0.x: a newer minor may break us
    if *current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ControlMetadata;
    use serde_json::json;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("form_core_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_lock_path_generation() {
        let lock_path = lock_path_for(Path::new("/forms/vitals.json"));
        assert_eq!(lock_path, Path::new("/forms/vitals.json.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("designer@clinic.org");
        assert_eq!(info.user_id, "designer@clinic.org");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_save_and_load_form() {
        let path = temp_path("form");
        let mut form = FormDefinition::new("Vitals");
        form.controls.push(
            ControlMetadata::new("1", "obsControl").with_concept(Concept::new("p", "Pulse", "Numeric")),
        );

        save_form(&form, &path).unwrap();
        assert!(!with_suffix(&path, "tmp").exists());
        assert_eq!(load_form(&path).unwrap(), form);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_path("newer_schema");
        let form = FormDefinition {
            schema_version: "0.9.0".to_string(),
            ..FormDefinition::new("Vitals")
        };
        save_form(&form, &path).unwrap();

        let err = load_form(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_observations_get_uuids_on_save() {
        let path = temp_path("observations");
        let records = vec![Obs::new(Concept::new("p", "Pulse", "Numeric")).set_value(json!(72))];

        save_observations(&records, &path).unwrap();
        let loaded = load_observations(&path).unwrap();
        assert!(loaded[0].uuid.is_some());
        assert_eq!(loaded[0].value, Some(json!(72)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_settings_file() {
        let path = temp_path("settings");
        fs::write(&path, r#"{"minRows": 5}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.min_rows, 5);
        assert_eq!(settings.row_width, FormSettings::default().row_width);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "designer@clinic.org").unwrap();
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());
        assert!(FileLock::check(&path).is_some());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_concept_with_set_members() {
        let path = temp_path("concept");
        fs::write(
            &path,
            json!({
                "uuid": "bpUuid",
                "name": "Blood Pressure",
                "datatype": "N/A",
                "setMembers": [{"uuid": "sbpUuid", "name": "Systolic", "datatype": "Numeric"}]
            })
            .to_string(),
        )
        .unwrap();

        let concept = load_concept(&path).unwrap();
        assert_eq!(concept.name, "Blood Pressure");
        assert_eq!(concept.set_members.len(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("").is_err());
    }
}
