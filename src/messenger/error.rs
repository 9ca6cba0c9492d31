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
use std::io;

/// Why an inbound payload was dropped.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("payload is {len} bytes, expected {expected}", expected = super::wire::WIRE_SIZE)]
    WrongSize { len: usize },

    #[error("sender ID {0} is out of range")]
    SenderOutOfRange(u8),

    #[error("clip name is not terminated")]
    UnterminatedName,

    #[error("clip name is not a valid clip name")]
    InvalidName,

    #[error("checksum mismatch: carried {carried:#04x}, computed {computed:#04x}")]
    ChecksumMismatch { carried: u8, computed: u8 },

    #[error("clip {0} does not exist on this unit")]
    UnknownClip(String),
}

/// Why a command couldn't be sent.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("a unit can't send a command to itself")]
    SelfTarget,

    #[error("clip name is {len} bytes, at most {max} fit", max = super::wire::MAX_NAME_BYTES)]
    NameTooLong { len: usize },

    #[error("'{0}' is not a valid clip name")]
    InvalidName(String),

    #[error("broadcast failed: {0}")]
    Transport(#[from] io::Error),
}
