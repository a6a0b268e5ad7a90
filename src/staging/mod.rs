//! Scoped temporary files
//!
//! Key material, messages and signatures are handed to the signing tool as
//! files. Each one lives in a [`StagingArea`] only for the duration of one
//! gateway call and is removed before the call returns.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix of every staged file name.
pub const STAGED_FILE_PREFIX: &str = "gpg-gateway-";

/// Staging errors
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("failed to stage {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove staged file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("staged file path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },
}

/// A place where files can be created and removed.
///
/// Implementations must never overwrite an existing file; uniqueness of
/// names is the caller's job.
pub trait StagingArea: Send + Sync {
    /// Create `name` with the given contents and return its full path.
    fn write_file(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf>;

    /// Delete a file previously returned by `write_file`.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Staging area backed by a filesystem directory.
#[derive(Debug, Clone)]
pub struct DirStagingArea {
    dir: PathBuf,
}

impl DirStagingArea {
    /// Stage files inside `dir`. The directory must exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Stage files in the OS temporary directory.
    pub fn system_temp() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StagingArea for DirStagingArea {
    fn write_file(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(name);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        let written = file.write_all(contents).and_then(|()| file.sync_all());
        drop(file);
        if let Err(e) = written {
            remove_partial(&path);
            return Err(e);
        }
        Ok(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// Remove a file whose write failed. Errors are logged, the write error is
/// what the caller reports.
fn remove_partial(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to remove partially staged file");
            false
        }
    }
}

/// A file that exists only while this guard is alive.
///
/// Call [`StagedFile::discard`] to delete it and observe failures. If the
/// guard is dropped instead, deletion is still attempted and failures are
/// logged.
pub struct StagedFile<'a> {
    area: &'a dyn StagingArea,
    path: PathBuf,
    discarded: bool,
}

impl<'a> StagedFile<'a> {
    /// Write `contents` to a freshly named file in `area`.
    ///
    /// Names have the form `gpg-gateway-<uuid>.<label>`, unique per call
    /// even across threads and processes sharing the directory.
    pub fn create(
        area: &'a dyn StagingArea,
        label: &str,
        contents: &[u8],
    ) -> Result<Self, StagingError> {
        let name = format!("{}{}.{}", STAGED_FILE_PREFIX, Uuid::new_v4().simple(), label);
        let path = area
            .write_file(&name, contents)
            .map_err(|source| StagingError::Write { name, source })?;
        debug!(path = %path.display(), bytes = contents.len(), "staged file");
        Ok(Self {
            area,
            path,
            discarded: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The path as a command-line argument.
    pub fn arg(&self) -> Result<String, StagingError> {
        self.path
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| StagingError::NonUtf8Path {
                path: self.path.clone(),
            })
    }

    /// Delete the file now.
    pub fn discard(mut self) -> Result<(), StagingError> {
        self.discarded = true;
        self.area
            .remove_file(&self.path)
            .map_err(|source| StagingError::Remove {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), "removed staged file");
        Ok(())
    }
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        if let Err(e) = self.area.remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove staged file");
        }
    }
}
