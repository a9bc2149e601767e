use camino::Utf8PathBuf;

use crate::domain::DatabaseEntry;
use crate::error::FetchError;
use crate::remote::DatabaseClient;
use crate::store::ReferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    Skipped,
    Downloaded,
}

#[derive(Debug, Clone)]
pub struct FetchItemResult {
    pub filename: String,
    pub action: FetchAction,
    pub path: Utf8PathBuf,
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub directory: Utf8PathBuf,
    pub items: Vec<FetchItemResult>,
}

impl FetchResult {
    pub fn downloaded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.action == FetchAction::Downloaded)
            .count()
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { directory: Utf8PathBuf },
    Skipped { filename: String },
    Downloading { filename: String },
    Downloaded { filename: String, bytes: u64 },
    Failed { filename: String, message: String },
    Ready { directory: Utf8PathBuf },
    ManifestWritten { path: Utf8PathBuf },
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: DatabaseClient> {
    store: ReferenceStore,
    client: C,
}

impl<C: DatabaseClient> App<C> {
    pub fn new(store: ReferenceStore, client: C) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn fetch(
        &self,
        databases: &[DatabaseEntry],
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, FetchError> {
        self.store.ensure_root()?;
        sink.event(ProgressEvent::Started {
            directory: self.store.root().to_owned(),
        });

        let mut items = Vec::with_capacity(databases.len());
        for entry in databases {
            let path = self.store.entry_path(entry);
            if self.store.exists(entry) {
                tracing::debug!(%path, "database present");
                sink.event(ProgressEvent::Skipped {
                    filename: entry.filename().to_string(),
                });
                items.push(FetchItemResult {
                    filename: entry.filename().to_string(),
                    action: FetchAction::Skipped,
                    path,
                });
                continue;
            }

            sink.event(ProgressEvent::Downloading {
                filename: entry.filename().to_string(),
            });
            match self.download_entry(entry) {
                Ok(bytes) => {
                    tracing::info!(url = %entry.url(), %path, bytes, "database downloaded");
                    sink.event(ProgressEvent::Downloaded {
                        filename: entry.filename().to_string(),
                        bytes,
                    });
                    items.push(FetchItemResult {
                        filename: entry.filename().to_string(),
                        action: FetchAction::Downloaded,
                        path,
                    });
                }
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(url = %entry.url(), error = %message, "database download failed");
                    if let Err(cleanup) = self.store.remove_partial(entry) {
                        tracing::warn!(%path, error = %cleanup, "could not remove partial download");
                    }
                    sink.event(ProgressEvent::Failed {
                        filename: entry.filename().to_string(),
                        message: message.clone(),
                    });
                    return Err(FetchError::Incomplete {
                        filename: entry.filename().to_string(),
                        reason: message,
                    });
                }
            }
        }

        sink.event(ProgressEvent::Ready {
            directory: self.store.root().to_owned(),
        });
        Ok(FetchResult {
            directory: self.store.root().to_owned(),
            items,
        })
    }

    pub fn write_manifest(
        &self,
        databases: &[DatabaseEntry],
        sink: &dyn ProgressSink,
    ) -> Result<Utf8PathBuf, FetchError> {
        let path = self.store.write_manifest(databases)?;
        tracing::debug!(%path, entries = databases.len(), "manifest written");
        sink.event(ProgressEvent::ManifestWritten { path: path.clone() });
        Ok(path)
    }

    fn download_entry(&self, entry: &DatabaseEntry) -> Result<u64, FetchError> {
        let mut partial = self.store.partial_file(entry)?;
        let bytes = self.client.download(entry.url(), partial.as_file_mut())?;
        let destination = self.store.entry_path(entry);
        partial
            .persist(destination.as_std_path())
            .map_err(|err| FetchError::Filesystem(format!("persist {destination}: {}", err.error)))?;
        Ok(bytes)
    }
}
