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
use std::io::Cursor;
use std::sync::Arc;

use super::{validate_name, ClipReader, Entry, StorageError};

enum Node {
    File(Arc<[u8]>),
    Dir,
}

/// An in-memory volume. Entries are listed in insertion order, like an
/// unsorted directory on a card.
pub struct Storage {
    name: String,
    mounted: bool,
    nodes: Vec<(String, Node)>,
}

impl Storage {
    /// Creates an empty, mounted volume.
    pub fn new(name: &str) -> Storage {
        Storage {
            name: name.to_string(),
            mounted: true,
            nodes: Vec::new(),
        }
    }

    /// Adds a file with the given contents.
    pub fn with_file(mut self, name: &str, contents: Vec<u8>) -> Storage {
        self.nodes
            .push((name.to_string(), Node::File(Arc::from(contents))));
        self
    }

    /// Adds an empty directory.
    pub fn with_dir(mut self, name: &str) -> Storage {
        self.nodes.push((name.to_string(), Node::Dir));
        self
    }

    /// Marks the volume as not mounted. Listing it fails.
    pub fn unmounted(mut self) -> Storage {
        self.mounted = false;
        self
    }

    fn file(&self, name: &str) -> Option<&Arc<[u8]>> {
        self.nodes.iter().find_map(|(node_name, node)| match node {
            Node::File(contents) if node_name == name => Some(contents),
            _ => None,
        })
    }
}

impl super::Storage for Storage {
    fn list(&self) -> Result<Vec<Entry>, StorageError> {
        if !self.mounted {
            return Err(StorageError::Unavailable(self.name.clone()));
        }

        Ok(self
            .nodes
            .iter()
            .map(|(name, node)| match node {
                Node::File(contents) => Entry {
                    name: name.clone(),
                    size: contents.len() as u64,
                    is_dir: false,
                },
                Node::Dir => Entry {
                    name: name.clone(),
                    size: 0,
                    is_dir: true,
                },
            })
            .collect())
    }

    fn open(&self, name: &str) -> Result<Box<dyn ClipReader>, StorageError> {
        let name = validate_name(name)?;
        match self.file(name) {
            Some(contents) if self.mounted => Ok(Box::new(Cursor::new(Arc::clone(contents)))),
            _ => Err(StorageError::NotFound(name.to_string())),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.mounted && self.file(name).is_some()
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Memory)", self.name)
    }
}
