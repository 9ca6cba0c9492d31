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
use std::time::Instant;

use crate::buttons::RawLevels;

pub mod keyboard;
pub mod mock;

/// A source of raw, undebounced button levels.
pub trait Inputs: Send + Sync {
    /// Reads all four buttons at `now`.
    fn sample(&self, now: Instant) -> RawLevels;
}
