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
//! A sound board: clips on a card, four buttons, and a broadcast link to the
//! other boards in the room.
pub mod audio;
pub mod board;
pub mod buttons;
pub mod catalog;
pub mod config;
mod error;
pub mod gesture;
pub mod identity;
pub mod inputs;
pub mod messenger;
pub mod player;
pub mod storage;
#[cfg(test)]
mod testutil;
pub mod transport;

pub use error::{Error, ErrorKind, StartupError};
