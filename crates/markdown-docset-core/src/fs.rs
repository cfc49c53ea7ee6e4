//! Filesystem helpers that attach the offending path to every error.
//!
//! Writes go straight to the destination. A crash mid-write can leave a
//! truncated file behind.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{DocsetError, DocsetResult};

/// Read a text input, reporting a missing file as `NotFound`.
pub fn read_input(path: &Path) -> DocsetResult<String> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(DocsetError::NotFound(format!(
            "input file {} does not exist",
            path.display()
        ))),
        Err(err) => Err(DocsetError::io(path, err)),
    }
}

pub fn ensure_dir(path: &Path) -> DocsetResult<()> {
    fs::create_dir_all(path).map_err(|err| DocsetError::io(path, err))
}

/// Write `contents` to `path`, creating missing parent directories first.
pub fn write_file(path: &Path, contents: &str) -> DocsetResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|err| DocsetError::io(path, err))
}
