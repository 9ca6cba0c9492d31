// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::io::{self, Read, Seek};

pub mod fs;
pub mod memory;

/// A sequential, seekable handle onto a single file of the volume.
pub trait ClipReader: Read + Seek + Send {}

impl<T: Read + Seek + Send> ClipReader for T {}

/// A top-level entry of the volume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

/// Errors raised by a storage volume.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage volume {0} is not available")]
    Unavailable(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid entry name '{0}'")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A flat, single-directory volume (the removable card).
pub trait Storage: fmt::Display + Send + Sync {
    /// Lists the top-level entries of the volume. Does not recurse.
    fn list(&self) -> Result<Vec<Entry>, StorageError>;

    /// Opens the named file for sequential reading.
    fn open(&self, name: &str) -> Result<Box<dyn ClipReader>, StorageError>;

    /// Returns true if a regular file with the given name exists.
    fn exists(&self, name: &str) -> bool;
}

/// Only bare names are addressable on a flat volume.
pub(crate) fn validate_name(name: &str) -> Result<&str, StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(name)
}
