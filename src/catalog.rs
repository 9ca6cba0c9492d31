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

use rand::Rng;
use tracing::{debug, info, warn};

use crate::buttons::Button;
use crate::storage::{Storage, StorageError};

/// The most clips a board will index.
pub const CAPACITY: usize = 30;

const AUDIO_SUFFIX: &str = ".wav";

/// Returns true if the name carries the clip extension (case-insensitive).
pub fn has_audio_extension(name: &str) -> bool {
    let name = name.as_bytes();
    name.len() > AUDIO_SUFFIX.len()
        && name[name.len() - AUDIO_SUFFIX.len()..].eq_ignore_ascii_case(AUDIO_SUFFIX.as_bytes())
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("at least 3 clips are required, found {found}")]
    TooFewClips { found: usize },

    #[error("the catalog is empty")]
    Empty,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A playable clip on the volume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clip {
    pub name: String,
    pub size: u64,
}

impl fmt::Display for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name, self.size)
    }
}

/// The clips statically bound to the three local buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings {
    pub green: Clip,
    pub blue: Clip,
    pub yellow: Clip,
}

impl Bindings {
    /// Gets the clip bound to the given button. The remote button has none.
    pub fn clip_for(&self, button: Button) -> Option<&Clip> {
        match button {
            Button::Green => Some(&self.green),
            Button::Blue => Some(&self.blue),
            Button::Yellow => Some(&self.yellow),
            Button::Red => None,
        }
    }
}

/// The ordered set of clips found on the volume.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    clips: Vec<Clip>,
}

impl Catalog {
    /// Scans the top level of the volume for clips, up to `CAPACITY`.
    pub fn discover(storage: &dyn Storage) -> Result<Catalog, CatalogError> {
        let mut clips = Vec::new();
        let mut ignored = 0;

        for entry in storage.list()? {
            if entry.is_dir {
                debug!(name = entry.name, "Ignoring directory.");
                continue;
            }
            if !has_audio_extension(&entry.name) {
                debug!(name = entry.name, "Ignoring non-clip file.");
                continue;
            }
            if clips.len() == CAPACITY {
                ignored += 1;
                continue;
            }

            clips.push(Clip {
                name: entry.name,
                size: entry.size,
            });
        }

        if ignored > 0 {
            warn!(capacity = CAPACITY, ignored, "Catalog full, ignoring clips.");
        }
        info!(storage = %storage, clips = clips.len(), "Catalog discovered.");

        Ok(Catalog { clips })
    }

    /// Sorts the clips by name. The sort is stable so the bindings are
    /// reproducible for an unchanged card.
    pub fn sort(&mut self) {
        self.clips.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Binds the first three clips to green, blue and yellow.
    pub fn assign_first_three(&self) -> Result<Bindings, CatalogError> {
        match self.clips.as_slice() {
            [green, blue, yellow, ..] => Ok(Bindings {
                green: green.clone(),
                blue: blue.clone(),
                yellow: yellow.clone(),
            }),
            _ => Err(CatalogError::TooFewClips {
                found: self.clips.len(),
            }),
        }
    }

    /// Picks a clip uniformly at random.
    pub fn random_pick<R: Rng>(&self, rng: &mut R) -> Result<&Clip, CatalogError> {
        if self.clips.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(&self.clips[rng.gen_range(0..self.clips.len())])
    }

    pub fn get(&self, name: &str) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.name == name)
    }

    pub fn list(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::buttons::Button;
    use crate::storage::memory::Storage;

    use super::*;

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog.list().iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_audio_extension() {
        assert!(has_audio_extension("a.wav"));
        assert!(has_audio_extension("LOUD.WAV"));
        assert!(has_audio_extension("mixed.WaV"));
        assert!(!has_audio_extension(".wav"));
        assert!(!has_audio_extension("a.wave"));
        assert!(!has_audio_extension("a.mp3"));
        assert!(!has_audio_extension("wav"));
    }

    #[test]
    fn test_sort_and_bind() -> Result<(), CatalogError> {
        let storage = Storage::new("card")
            .with_file("a.wav", vec![0; 4])
            .with_file("c.wav", vec![0; 4])
            .with_file("b.wav", vec![0; 4]);

        let mut catalog = Catalog::discover(&storage)?;
        assert_eq!(vec!["a.wav", "c.wav", "b.wav"], names(&catalog));

        catalog.sort();
        assert_eq!(vec!["a.wav", "b.wav", "c.wav"], names(&catalog));

        let bindings = catalog.assign_first_three()?;
        assert_eq!("a.wav", bindings.green.name);
        assert_eq!("b.wav", bindings.blue.name);
        assert_eq!("c.wav", bindings.yellow.name);
        assert_eq!(
            Some("b.wav"),
            bindings.clip_for(Button::Blue).map(|c| c.name.as_str())
        );
        assert_eq!(None, bindings.clip_for(Button::Red));
        Ok(())
    }

    #[test]
    fn test_discover_filters_entries() -> Result<(), CatalogError> {
        let storage = Storage::new("card")
            .with_file("notes.txt", vec![1])
            .with_dir("more.wav")
            .with_file("board_2.id", vec![])
            .with_file("Boom.WAV", vec![0; 100]);

        let catalog = Catalog::discover(&storage)?;
        assert_eq!(vec!["Boom.WAV"], names(&catalog));
        assert_eq!(100, catalog.list()[0].size);
        Ok(())
    }

    #[test]
    fn test_discover_respects_capacity() -> Result<(), CatalogError> {
        let storage = (0..CAPACITY + 5).fold(Storage::new("card"), |storage, i| {
            storage.with_file(&format!("{:02}.wav", i), vec![0; 2])
        });

        let catalog = Catalog::discover(&storage)?;
        assert_eq!(CAPACITY, catalog.len());
        assert!(catalog.get("29.wav").is_some());
        assert!(catalog.get("30.wav").is_none());
        Ok(())
    }

    #[test]
    fn test_too_few_clips() -> Result<(), CatalogError> {
        let storage = Storage::new("card")
            .with_file("a.wav", vec![])
            .with_file("b.wav", vec![]);

        let catalog = Catalog::discover(&storage)?;
        assert!(matches!(
            catalog.assign_first_three(),
            Err(CatalogError::TooFewClips { found: 2 })
        ));
        Ok(())
    }

    #[test]
    fn test_unmounted_storage() {
        let storage = Storage::new("card").unmounted();
        assert!(matches!(
            Catalog::discover(&storage),
            Err(CatalogError::Storage(_))
        ));
    }

    #[test]
    fn test_random_pick() -> Result<(), CatalogError> {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            Catalog::default().random_pick(&mut rng),
            Err(CatalogError::Empty)
        ));

        let storage = Storage::new("card")
            .with_file("a.wav", vec![])
            .with_file("b.wav", vec![])
            .with_file("c.wav", vec![])
            .with_file("d.wav", vec![]);
        let catalog = Catalog::discover(&storage)?;

        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(catalog.random_pick(&mut rng)?.name.clone());
        }
        assert_eq!(4, seen.len());
        Ok(())
    }
}
