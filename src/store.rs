use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::{Builder, NamedTempFile};

use crate::config::MANIFEST_FILE_NAME;
use crate::domain::DatabaseEntry;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct ReferenceStore {
    root: Utf8PathBuf,
}

impl ReferenceStore {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn entry_path(&self, entry: &DatabaseEntry) -> Utf8PathBuf {
        self.root.join(entry.filename())
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.root.join(MANIFEST_FILE_NAME)
    }

    pub fn ensure_root(&self) -> Result<(), FetchError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| FetchError::Filesystem(format!("create {}: {err}", self.root)))
    }

    pub fn exists(&self, entry: &DatabaseEntry) -> bool {
        self.entry_path(entry).as_std_path().exists()
    }

    pub fn partial_file(&self, entry: &DatabaseEntry) -> Result<NamedTempFile, FetchError> {
        Builder::new()
            .prefix(&format!(".{}.", entry.filename()))
            .suffix(".part")
            .tempfile_in(self.root.as_std_path())
            .map_err(|err| FetchError::Filesystem(err.to_string()))
    }

    pub fn remove_partial(&self, entry: &DatabaseEntry) -> Result<(), FetchError> {
        let path = self.entry_path(entry);
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| FetchError::Filesystem(format!("remove {path}: {err}")))?;
        }
        Ok(())
    }

    pub fn render_manifest(&self, entries: &[DatabaseEntry]) -> String {
        entries
            .iter()
            .map(|entry| format!("{}/{}\n", self.root, entry.filename()))
            .collect()
    }

    pub fn write_manifest(&self, entries: &[DatabaseEntry]) -> Result<Utf8PathBuf, FetchError> {
        let path = self.manifest_path();
        let content = self.render_manifest(entries);
        let mut file = fs::File::create(path.as_std_path())
            .map_err(|err| FetchError::Filesystem(format!("create {path}: {err}")))?;
        file.write_all(content.as_bytes())
            .map_err(|err| FetchError::Filesystem(format!("write {path}: {err}")))?;
        Ok(path)
    }
}
