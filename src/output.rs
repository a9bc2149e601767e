use std::io::{self, Write};

use camino::Utf8Path;

use crate::app::{ProgressEvent, ProgressSink};

const RULE_WIDTH: usize = 50;

pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn render(event: &ProgressEvent) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        match event {
            ProgressEvent::Started { directory } => {
                format!("{rule}\nDownloading rRNA databases to: {directory}\n{rule}\n")
            }
            ProgressEvent::Skipped { filename } => {
                format!("✓ {filename} already exists, skipping download\n")
            }
            ProgressEvent::Downloading { filename } => format!("⬇ Downloading {filename}... "),
            ProgressEvent::Downloaded { .. } => "✓\n".to_string(),
            ProgressEvent::Failed { message, .. } => format!("✗ Failed: {message}\n"),
            ProgressEvent::Ready { directory } => {
                format!("{rule}\n✓ All rRNA databases ready in {directory}\n{rule}\n")
            }
            ProgressEvent::ManifestWritten { path } => {
                format!("✓ Created manifest file: {path}\n")
            }
        }
    }

    pub fn print_manifest_start(path: &Utf8Path) -> io::Result<()> {
        Self::print_text(&format!("\nCreating local database manifest: {path}\n"))
    }

    pub fn print_usage_hint(path: &Utf8Path) -> io::Result<()> {
        Self::print_text(&format!(
            "\nTo use these local databases, add to your nextflow.config:\n\
             params.ribo_database_manifest = '{path}'\n\
             \nOr use the command line option:\n\
             --ribo_database_manifest {path}\n"
        ))
    }

    pub fn print_failure() -> io::Result<()> {
        Self::print_text("\n✗ Failed to download all databases\n")
    }

    fn print_text(text: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        if let Err(err) = Self::print_text(&Self::render(&event)) {
            tracing::debug!(error = %err, "could not write progress to stdout");
        }
    }
}
