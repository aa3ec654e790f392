pub mod certificates;
pub mod contacts;

use std::io;
use std::path::PathBuf;

pub use certificates::CertificateIndex;
pub use contacts::{ContactRecord, FieldValue};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("contact file {0} does not exist")]
    MissingContactFile(PathBuf),
    #[error("failed to parse contact file {path}: {source}")]
    ContactParse { path: PathBuf, source: csv::Error },
    #[error("failed to read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        source: calamine::Error,
    },
    #[error("spreadsheet {0} has no worksheets")]
    EmptyWorkbook(PathBuf),
    #[error("certificate directory {0} does not exist or is not a directory")]
    MissingCertificateDir(PathBuf),
    #[error("failed to read certificate directory {path}: {source}")]
    CertificateScan { path: PathBuf, source: io::Error },
}
