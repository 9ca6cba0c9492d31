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
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{validate_name, ClipReader, Entry, StorageError};

/// A directory on disk standing in for the mounted card.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a volume rooted at the given directory. The directory isn't
    /// checked until it is first listed.
    pub fn new<P: AsRef<Path>>(root: P) -> Storage {
        Storage {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_of(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_name(name)?))
    }
}

impl super::Storage for Storage {
    fn list(&self) -> Result<Vec<Entry>, StorageError> {
        if !self.root.is_dir() {
            return Err(StorageError::Unavailable(self.root.display().to_string()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    warn!(name = ?name, "Skipping entry with an unreadable name.");
                    continue;
                }
            };
            let metadata = entry.metadata()?;
            entries.push(Entry {
                name,
                size: metadata.len(),
                is_dir: metadata.is_dir(),
            });
        }

        Ok(entries)
    }

    fn open(&self, name: &str) -> Result<Box<dyn ClipReader>, StorageError> {
        let path = self.path_of(name)?;
        match File::open(&path) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_ok_and(|path| path.is_file())
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Directory)", self.root.display())
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;
    use std::io::Read;

    use crate::storage::{Storage as _, StorageError};

    use super::Storage;

    #[test]
    fn test_list_is_flat() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.wav"), [0u8; 10])?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("deep.wav"), [0u8; 4])?;

        let storage = Storage::new(dir.path());
        let mut entries = storage.list()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(2, entries.len());
        assert_eq!("a.wav", entries[0].name);
        assert_eq!(10, entries[0].size);
        assert!(!entries[0].is_dir);
        assert_eq!("nested", entries[1].name);
        assert!(entries[1].is_dir);
        Ok(())
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let storage = Storage::new("/definitely/not/a/mounted/card");
        assert!(matches!(storage.list(), Err(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_open_and_exists() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("clip.wav"), b"abcd")?;
        fs::create_dir(dir.path().join("folder.wav"))?;

        let storage = Storage::new(dir.path());
        assert!(storage.exists("clip.wav"));
        assert!(!storage.exists("folder.wav"));
        assert!(!storage.exists("missing.wav"));
        assert!(!storage.exists("../clip.wav"));

        let mut contents = String::new();
        storage.open("clip.wav")?.read_to_string(&mut contents)?;
        assert_eq!("abcd", contents);

        assert!(matches!(
            storage.open("missing.wav"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.open("nested/clip.wav"),
            Err(StorageError::InvalidName(_))
        ));
        Ok(())
    }
}
