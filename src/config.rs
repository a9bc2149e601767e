use std::path::Path;

use camino::Utf8PathBuf;

use crate::domain::DatabaseEntry;
use crate::error::FetchError;

pub const REFERENCE_DIR_NAME: &str = "reference";

pub const MANIFEST_FILE_NAME: &str = "rrna-db-local.txt";

pub const SORTMERNA_DATABASES: [&str; 8] = [
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/rfam-5.8s-database-id98.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/rfam-5s-database-id98.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-arc-16s-id95.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-arc-23s-id98.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-bac-16s-id90.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-bac-23s-id98.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-euk-18s-id95.fasta",
    "https://raw.githubusercontent.com/biocore/sortmerna/v4.3.4/data/rRNA_databases/silva-euk-28s-id98.fasta",
];

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub reference_dir: Utf8PathBuf,
    pub databases: Vec<DatabaseEntry>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve() -> Result<ResolvedConfig, FetchError> {
        let cwd = std::env::current_dir().map_err(|err| FetchError::Filesystem(err.to_string()))?;
        Self::resolve_in(&cwd)
    }

    pub fn resolve_in(project_root: &Path) -> Result<ResolvedConfig, FetchError> {
        let project_root = std::path::absolute(project_root)
            .map_err(|err| FetchError::Filesystem(err.to_string()))?;
        let project_root = Utf8PathBuf::from_path_buf(project_root)
            .map_err(|_| FetchError::Filesystem("invalid project path".to_string()))?;
        let reference_dir = project_root.join(REFERENCE_DIR_NAME);

        Ok(ResolvedConfig {
            reference_dir,
            databases: default_databases()?,
        })
    }
}

pub fn default_databases() -> Result<Vec<DatabaseEntry>, FetchError> {
    SORTMERNA_DATABASES
        .iter()
        .map(|url| url.parse())
        .collect::<Result<Vec<_>, FetchError>>()
}
