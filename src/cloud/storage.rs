//! Tenant-scoped file storage
//!
//! Every tenant owns a directory under the storage root. Files are named
//! `{job_id}_{role}_{original_filename}` so lookups only need the job id and
//! role, and cleanup can sweep everything a job left behind.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Error;

/// Role of a stored file within its job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Input,
    Output,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Input => "input",
            FileRole::Output => "output",
        }
    }
}

/// Filesystem storage rooted at a single directory
pub struct Storage {
    base_dir: PathBuf,
}

impl Storage {
    /// Open storage, creating the root if needed
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| Error::IoWrite {
            path: base_dir.clone(),
            source,
        })?;
        info!(dir = %base_dir.display(), "storage initialized");
        Ok(Self { base_dir })
    }

    fn tenant_dir(&self, tenant_id: &str) -> Result<PathBuf, Error> {
        let dir = self.base_dir.join(tenant_id);
        fs::create_dir_all(&dir).map_err(|source| Error::IoWrite {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Persist a file for a job under the tenant's directory
    pub fn save(
        &self,
        tenant_id: &str,
        job_id: Uuid,
        role: FileRole,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, Error> {
        let dir = self.tenant_dir(tenant_id)?;
        let path = dir.join(format!("{}_{}_{}", job_id, role.as_str(), filename));
        fs::write(&path, content).map_err(|source| Error::IoWrite {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved {} file", role.as_str());
        Ok(path)
    }

    /// Find a job's file by role; first match wins
    pub fn find_file(&self, tenant_id: &str, job_id: Uuid, role: FileRole) -> Option<PathBuf> {
        let dir = self.base_dir.join(tenant_id);
        let prefix = format!("{}_{}_", job_id, role.as_str());

        let entries = fs::read_dir(&dir).ok()?;
        let mut matches: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with(&prefix))
            })
            .collect();
        matches.sort();
        matches.into_iter().next()
    }

    /// Delete a single file; false when it was already gone
    pub fn delete_file(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted");
                true
            }
            Err(_) => false,
        }
    }

    /// Remove every file a job left under its tenant's directory
    pub fn cleanup_job(&self, tenant_id: &str, job_id: Uuid) {
        let dir = self.base_dir.join(tenant_id);
        let prefix = format!("{}_", job_id);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(&prefix));
            if matches {
                self.delete_file(&path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_find() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("store")).unwrap();
        let job_id = Uuid::new_v4();

        let saved = storage
            .save("tenant-a", job_id, FileRole::Input, "doc.rm", b"bytes")
            .unwrap();
        assert!(saved.exists());

        let found = storage.find_file("tenant-a", job_id, FileRole::Input).unwrap();
        assert_eq!(found, saved);
        assert!(storage.find_file("tenant-a", job_id, FileRole::Output).is_none());
    }

    #[test]
    fn test_tenant_directories_are_separate() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let job_id = Uuid::new_v4();

        storage
            .save("tenant-a", job_id, FileRole::Output, "doc.rm", b"a")
            .unwrap();

        // Same job id under another tenant is invisible
        assert!(storage.find_file("tenant-b", job_id, FileRole::Output).is_none());
    }

    #[test]
    fn test_cleanup_removes_all_job_files() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let job_id = Uuid::new_v4();
        let other_job = Uuid::new_v4();

        storage
            .save("tenant-a", job_id, FileRole::Input, "doc.rm", b"in")
            .unwrap();
        storage
            .save("tenant-a", job_id, FileRole::Output, "doc.rm", b"out")
            .unwrap();
        let kept = storage
            .save("tenant-a", other_job, FileRole::Input, "doc.rm", b"keep")
            .unwrap();

        storage.cleanup_job("tenant-a", job_id);

        assert!(storage.find_file("tenant-a", job_id, FileRole::Input).is_none());
        assert!(storage.find_file("tenant-a", job_id, FileRole::Output).is_none());
        assert!(kept.exists());
    }

    #[test]
    fn test_delete_missing_file_is_false() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        assert!(!storage.delete_file(Path::new("/nonexistent/file.rm")));
    }
}
