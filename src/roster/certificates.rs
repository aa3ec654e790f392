use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::roster::RosterError;

/// Recipient display name to certificate file.
#[derive(Debug, Default, Clone)]
pub struct CertificateIndex {
    entries: HashMap<String, PathBuf>,
}

/// Returns the part of a file stem after its last `-`, trimmed.
///
/// `"Course-Alice"` yields `"Alice"`, a stem without hyphens is returned
/// whole, and a name that itself contains a hyphen (`"Course-Mary-Jane"`)
/// only keeps its last piece (`"Jane"`). `None` when nothing is left.
pub fn trailing_name(stem: &str) -> Option<&str> {
    let name = stem.rsplit('-').next().unwrap_or(stem).trim();
    (!name.is_empty()).then_some(name)
}

impl CertificateIndex {
    /// Scans `dir` (non-recursive) for `*.pdf` files.
    ///
    /// Files are visited in file-name order; when two files share a trailing
    /// name the later one wins.
    pub fn build(dir: &Path) -> Result<Self, RosterError> {
        if !dir.is_dir() {
            return Err(RosterError::MissingCertificateDir(dir.to_path_buf()));
        }
        let scan_err = |source: std::io::Error| RosterError::CertificateScan {
            path: dir.to_path_buf(),
            source,
        };

        let dir = fs::canonicalize(dir).map_err(scan_err)?;
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(scan_err)? {
            let path = entry.map_err(scan_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "pdf") {
                files.push(path);
            }
        }
        files.sort();

        let mut entries = HashMap::new();
        for path in files {
            let Some(name) = path
                .file_stem()
                .map(|stem| stem.to_string_lossy())
                .and_then(|stem| trailing_name(&stem).map(str::to_string))
            else {
                continue;
            };
            if let Some(previous) = entries.insert(name.clone(), path.clone()) {
                warn!(
                    "Certificates {} and {} both resolve to '{}'; using the latter",
                    previous.display(),
                    path.display(),
                    name
                );
            }
        }

        info!("Found {} certificates in {}", entries.len(), dir.display());
        if entries.is_empty() {
            warn!("No PDF certificates found in {}", dir.display());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for CertificateIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
