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
use std::{sync::Arc, time::Instant};

use parking_lot::Mutex;

use crate::buttons::{Button, RawLevels};

/// Buttons whose levels are set by hand.
#[derive(Clone, Default)]
pub struct Inputs {
    levels: Arc<Mutex<RawLevels>>,
}

impl Inputs {
    pub fn new() -> Inputs {
        Inputs::default()
    }

    pub fn set(&self, levels: RawLevels) {
        *self.levels.lock() = levels;
    }

    pub fn press(&self, button: Button) {
        self.levels.lock().set(button, true);
    }

    pub fn release(&self, button: Button) {
        self.levels.lock().set(button, false);
    }
}

impl super::Inputs for Inputs {
    fn sample(&self, _now: Instant) -> RawLevels {
        *self.levels.lock()
    }
}
