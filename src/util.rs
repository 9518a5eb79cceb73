//! File helpers shared by the loaders. Every read reports which kind of input
//! was being read so the operator knows which file to fix.

use std::fmt;
use std::path::{Path, PathBuf};

/// The role a file plays in a run. Only used to make error messages useful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Articles,
    Contributors,
    Standard,
    Template,
    Project,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            FileKind::Articles => "article",
            FileKind::Contributors => "contributors",
            FileKind::Standard => "standard content",
            FileKind::Template => "template",
            FileKind::Project => "project",
        })
    }
}

/// Returned when an input file is absent or unreadable.
#[derive(Debug)]
pub struct MissingFileError {
    pub kind: FileKind,
    pub path: PathBuf,
    pub err: std::io::Error,
}

impl fmt::Display for MissingFileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Opening {} file `{}`: {}",
            self.kind,
            self.path.display(),
            self.err
        )
    }
}

impl std::error::Error for MissingFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

/// Reads a whole file as UTF-8 text.
pub fn read_to_string(path: &Path, kind: FileKind) -> Result<String, MissingFileError> {
    std::fs::read_to_string(path).map_err(|err| MissingFileError {
        kind,
        path: path.to_owned(),
        err,
    })
}

/// Reads a whole file as raw bytes. Used for CSV sources whose encoding is
/// fixed up after reading.
pub fn read_bytes(path: &Path, kind: FileKind) -> Result<Vec<u8>, MissingFileError> {
    std::fs::read(path).map_err(|err| MissingFileError {
        kind,
        path: path.to_owned(),
        err,
    })
}
