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
use tracing::info;

use crate::storage::{Storage, StorageError};

pub const MIN_ID: u8 = 1;
pub const MAX_ID: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unit ID {0} is outside 1-5")]
    OutOfRange(u8),

    #[error("no identity marker found on the volume")]
    Missing,

    #[error("multiple identity markers found: {0:?}")]
    Ambiguous(Vec<u8>),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The ID of a unit in the radio cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u8);

impl UnitId {
    pub fn new(id: u8) -> Result<UnitId, IdentityError> {
        if (MIN_ID..=MAX_ID).contains(&id) {
            Ok(UnitId(id))
        } else {
            Err(IdentityError::OutOfRange(id))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid unit ID, in order.
    pub fn all() -> impl Iterator<Item = UnitId> {
        (MIN_ID..=MAX_ID).map(UnitId)
    }

    /// Picks a uniformly random ID other than this one. Draws over the whole
    /// ID space and retries until it lands on a different unit.
    pub fn random_peer<R: Rng>(self, rng: &mut R) -> UnitId {
        loop {
            let candidate = UnitId(rng.gen_range(MIN_ID..=MAX_ID));
            if candidate != self {
                return candidate;
            }
        }
    }
}

impl TryFrom<u8> for UnitId {
    type Error = IdentityError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        UnitId::new(id)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The marker file that selects the given unit.
pub fn marker_name(id: UnitId) -> String {
    format!("board_{}.id", id.0)
}

/// Finds the single identity marker on the volume.
pub fn load(storage: &dyn Storage) -> Result<UnitId, IdentityError> {
    // Listing first surfaces an unmounted volume as a storage error rather
    // than as a missing marker.
    storage.list()?;

    let found: Vec<UnitId> = UnitId::all()
        .filter(|id| storage.exists(&marker_name(*id)))
        .collect();

    match found.as_slice() {
        [] => Err(IdentityError::Missing),
        [id] => {
            info!(id = id.get(), "Loaded unit identity.");
            Ok(*id)
        }
        _ => Err(IdentityError::Ambiguous(
            found.iter().map(|id| id.get()).collect(),
        )),
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::storage::memory::Storage;

    use super::*;

    #[test]
    fn test_unit_id_range() {
        assert!(UnitId::new(0).is_err());
        assert!(UnitId::new(6).is_err());
        assert_eq!(3, UnitId::try_from(3).unwrap().get());
        assert_eq!(5, UnitId::all().count());
        assert_eq!("board_4.id", marker_name(UnitId::new(4).unwrap()));
    }

    #[test]
    fn test_random_peer_never_self() {
        let mut rng = StdRng::seed_from_u64(11);
        let me = UnitId::new(2).unwrap();
        let mut seen = [false; 6];
        for _ in 0..500 {
            let peer = me.random_peer(&mut rng);
            assert_ne!(me, peer);
            seen[peer.get() as usize] = true;
        }
        assert_eq!([false, true, false, true, true, true], seen);
    }

    #[test]
    fn test_load() {
        let storage = Storage::new("card")
            .with_file("a.wav", vec![])
            .with_file("board_3.id", vec![]);
        assert_eq!(3, load(&storage).unwrap().get());
    }

    #[test]
    fn test_load_failures() {
        let storage = Storage::new("card").with_file("a.wav", vec![]);
        assert!(matches!(load(&storage), Err(IdentityError::Missing)));

        let storage = Storage::new("card")
            .with_file("board_1.id", vec![])
            .with_file("board_5.id", vec![]);
        assert!(matches!(
            load(&storage),
            Err(IdentityError::Ambiguous(ids)) if ids == vec![1, 5]
        ));

        // A directory named like a marker doesn't count.
        let storage = Storage::new("card").with_dir("board_2.id");
        assert!(matches!(load(&storage), Err(IdentityError::Missing)));

        let storage = Storage::new("card").unmounted();
        assert!(matches!(load(&storage), Err(IdentityError::Storage(_))));
    }
}
