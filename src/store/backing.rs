//! Backing storage for the persisted registry.
//!
//! # Write Strategies
//! - Open handles (`File`, in-memory buffer): truncate to zero, seek to the
//!   start, write. Not atomic: a crash mid-write leaves a partial file.
//! - [`AtomicFile`]: write a sibling temporary file, fsync, rename over the
//!   target, fsync the directory. An interruption leaves either the old or the
//!   new contents; a failed rewrite removes the temporary file.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Storage that holds the whole encoded registry.
pub trait Backing: Send + Sync {
    /// Read the full current contents.
    fn read_all(&mut self) -> io::Result<Vec<u8>>;

    /// Replace the full contents with `bytes`.
    fn rewrite(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable name for logs and errors.
    fn describe(&self) -> String;
}

impl Backing for File {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        self.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn rewrite(&mut self, bytes: &[u8]) -> io::Result<()> {
        // Truncate first so a shorter encoding leaves no stale tail.
        self.set_len(0)?;
        self.seek(SeekFrom::Start(0))?;
        self.write_all(bytes)?;
        self.flush()
    }

    fn describe(&self) -> String {
        "open file handle".to_string()
    }
}

impl Backing for Cursor<Vec<u8>> {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.get_ref().clone())
    }

    fn rewrite(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.get_mut().clear();
        self.set_position(0);
        self.write_all(bytes)
    }

    fn describe(&self) -> String {
        "in-memory buffer".to_string()
    }
}

/// File addressed by path, replaced atomically on every rewrite.
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
        Self { path, temp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn replace(&self, bytes: &[u8]) -> io::Result<()> {
        {
            let mut temp = File::create(&self.temp_path)?;
            temp.write_all(bytes)?;
            temp.sync_all()?;
        }
        fs::rename(&self.temp_path, &self.path)?;
        sync_parent_dir(&self.path)
    }
}

/// Persist the directory entry so the rename survives a crash.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl Backing for AtomicFile {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn rewrite(&mut self, bytes: &[u8]) -> io::Result<()> {
        let result = self.replace(bytes);
        if result.is_err() {
            let _ = fs::remove_file(&self.temp_path);
        }
        result
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
