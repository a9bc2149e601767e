use std::io::Write;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use reqwest::Url;

use rrna_db_fetch::app::{App, FetchAction, ProgressEvent, ProgressSink};
use rrna_db_fetch::domain::DatabaseEntry;
use rrna_db_fetch::error::FetchError;
use rrna_db_fetch::remote::DatabaseClient;
use rrna_db_fetch::store::ReferenceStore;

#[derive(Default)]
struct MockClient {
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl DatabaseClient for MockClient {
    fn download(&self, url: &Url, sink: &mut dyn Write) -> Result<u64, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let name = url.path().trim_start_matches('/');
        sink.write_all(b">partial\nACGU")
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        if name.starts_with("broken") {
            return Err(FetchError::Http("connection reset".to_string()));
        }
        if name.starts_with("missing") {
            return Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        let body = format!("\n>{name}\n");
        sink.write_all(body.as_bytes())
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        Ok(13 + body.len() as u64)
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn entries(urls: &[&str]) -> Vec<DatabaseEntry> {
    urls.iter().map(|url| url.parse().unwrap()).collect()
}

fn reference_store(temp: &tempfile::TempDir) -> ReferenceStore {
    let root = Utf8PathBuf::from_path_buf(temp.path().join("project").join("reference")).unwrap();
    ReferenceStore::new(root)
}

fn dir_listing(store: &ReferenceStore) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(store.root().as_std_path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Same sequence the binary runs: fetch, then manifest only on success.
fn run(
    app: &App<MockClient>,
    databases: &[DatabaseEntry],
    sink: &dyn ProgressSink,
) -> Result<Utf8PathBuf, FetchError> {
    app.fetch(databases, sink)?;
    app.write_manifest(databases, sink)
}

#[test]
fn downloads_missing_and_skips_present() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    store.ensure_root().unwrap();
    std::fs::write(store.root().join("a.fasta").as_std_path(), b"kept").unwrap();

    let databases = entries(&["https://db.test/a.fasta", "https://db.test/b.fasta"]);
    let app = App::new(store, MockClient::default());
    let result = app.fetch(&databases, &RecordingSink::default()).unwrap();

    assert_eq!(result.items[0].action, FetchAction::Skipped);
    assert_eq!(result.items[1].action, FetchAction::Downloaded);
    assert_eq!(result.items[1].path, app.store().root().join("b.fasta"));
    assert_eq!(result.directory, app.store().root());
    assert_eq!(result.downloaded(), 1);
    assert_eq!(app.client().requests(), vec!["https://db.test/b.fasta".to_string()]);

    let kept = std::fs::read(app.store().root().join("a.fasta").as_std_path()).unwrap();
    assert_eq!(kept, b"kept");
    let fetched =
        std::fs::read_to_string(app.store().root().join("b.fasta").as_std_path()).unwrap();
    assert_eq!(fetched, ">partial\nACGU\n>b.fasta\n");
}

#[test]
fn second_run_downloads_nothing_and_rewrites_same_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    let databases = entries(&[
        "https://db.test/rfam-5s.fasta",
        "https://db.test/silva-arc-16s.fasta",
        "https://db.test/silva-euk-28s.fasta",
    ]);

    let first = App::new(store.clone(), MockClient::default());
    let manifest = run(&first, &databases, &RecordingSink::default()).unwrap();
    let first_manifest = std::fs::read_to_string(manifest.as_std_path()).unwrap();
    assert_eq!(first.client().requests().len(), 3);

    let second = App::new(store.clone(), MockClient::default());
    let manifest = run(&second, &databases, &RecordingSink::default()).unwrap();
    let second_manifest = std::fs::read_to_string(manifest.as_std_path()).unwrap();

    assert!(second.client().requests().is_empty());
    assert_eq!(first_manifest, second_manifest);

    let root = store.root();
    let expected = format!(
        "{root}/rfam-5s.fasta\n{root}/silva-arc-16s.fasta\n{root}/silva-euk-28s.fasta\n"
    );
    assert_eq!(second_manifest, expected);
}

#[test]
fn failure_stops_remaining_downloads() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    let databases = entries(&[
        "https://db.test/a.fasta",
        "https://db.test/broken.fasta",
        "https://db.test/c.fasta",
    ]);

    let app = App::new(store, MockClient::default());
    let sink = RecordingSink::default();
    let err = run(&app, &databases, &sink).unwrap_err();

    assert_matches!(err, FetchError::Incomplete { ref filename, .. } if filename == "broken.fasta");
    assert_eq!(
        app.client().requests(),
        vec![
            "https://db.test/a.fasta".to_string(),
            "https://db.test/broken.fasta".to_string(),
        ]
    );
    assert_eq!(dir_listing(app.store()), vec!["a.fasta".to_string()]);

    let events = sink.events.lock().unwrap();
    assert_matches!(events.last(), Some(ProgressEvent::Failed { filename, .. }) if filename == "broken.fasta");
}

#[test]
fn failure_leaves_previous_manifest_untouched() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    store.ensure_root().unwrap();
    std::fs::write(store.manifest_path().as_std_path(), "previous\n").unwrap();

    let databases = entries(&["https://db.test/missing.fasta"]);
    let app = App::new(store, MockClient::default());
    let err = run(&app, &databases, &RecordingSink::default()).unwrap_err();

    assert_matches!(err, FetchError::Incomplete { ref reason, .. } if reason.contains("404"));
    let manifest = std::fs::read_to_string(app.store().manifest_path().as_std_path()).unwrap();
    assert_eq!(manifest, "previous\n");
    assert!(!app.store().root().join("missing.fasta").as_std_path().exists());
}

#[test]
fn no_manifest_written_when_first_run_fails() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    let databases = entries(&["https://db.test/broken.fasta"]);

    let app = App::new(store, MockClient::default());
    assert!(run(&app, &databases, &RecordingSink::default()).is_err());
    assert!(!app.store().manifest_path().as_std_path().exists());
    assert!(dir_listing(app.store()).is_empty());
}

#[test]
fn existing_directory_keeps_unrelated_files() {
    let temp = tempfile::tempdir().unwrap();
    let store = reference_store(&temp);
    store.ensure_root().unwrap();
    std::fs::write(store.root().join("notes.txt").as_std_path(), b"keep me").unwrap();

    let databases = entries(&["https://db.test/a.fasta"]);
    let app = App::new(store, MockClient::default());
    run(&app, &databases, &RecordingSink::default()).unwrap();
    app.store().ensure_root().unwrap();

    let notes = std::fs::read(app.store().root().join("notes.txt").as_std_path()).unwrap();
    assert_eq!(notes, b"keep me");
    assert_eq!(
        dir_listing(app.store()),
        vec![
            "a.fasta".to_string(),
            "notes.txt".to_string(),
            "rrna-db-local.txt".to_string(),
        ]
    );
}
