use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use rrna_db_fetch::app::App;
use rrna_db_fetch::config::ConfigLoader;
use rrna_db_fetch::error::FetchError;
use rrna_db_fetch::output::ConsoleOutput;
use rrna_db_fetch::remote::HttpDatabaseClient;
use rrna_db_fetch::store::ReferenceStore;

#[derive(Parser)]
#[command(name = "rrna-db-fetch")]
#[command(
    about = "Download the SortMeRNA rRNA databases into ./reference and write rrna-db-local.txt"
)]
#[command(version)]
struct Cli {}

fn main() -> ExitCode {
    if let Err(report) = run() {
        match report.downcast_ref::<FetchError>() {
            Some(FetchError::Incomplete { .. }) => {
                if let Err(err) = ConsoleOutput::print_failure() {
                    tracing::debug!(error = %err, "could not write failure summary");
                }
            }
            _ => eprintln!("{report:?}"),
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Cli {} = Cli::parse();

    let resolved = ConfigLoader::resolve()?;
    tracing::debug!(reference_dir = %resolved.reference_dir, "resolved reference directory");

    let store = ReferenceStore::new(resolved.reference_dir.clone());
    let client = HttpDatabaseClient::new()?;
    let app = App::new(store, client);

    let result = app.fetch(&resolved.databases, &ConsoleOutput)?;
    tracing::info!(
        directory = %result.directory,
        downloaded = result.downloaded(),
        total = result.items.len(),
        "reference databases ready"
    );

    ConsoleOutput::print_manifest_start(&app.store().manifest_path()).into_diagnostic()?;
    let manifest = app.write_manifest(&resolved.databases, &ConsoleOutput)?;
    ConsoleOutput::print_usage_hint(&manifest).into_diagnostic()?;
    Ok(())
}
