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
use std::time::Duration;

use crate::storage::StorageError;

/// Errors reported by an audio output device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Nothing could be accepted within the bounded wait. Not fatal.
    #[error("device accepted nothing within {0:?}")]
    Timeout(Duration),

    /// The underlying transport failed. The session can't continue.
    #[error("audio transport failure: {0}")]
    Transport(String),
}

impl DeviceError {
    /// Returns true if playback must be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DeviceError::Transport(_))
    }
}

/// Reasons a playback session is refused or ends early.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("a clip is already playing")]
    Busy,

    #[error("unable to open clip {name}: {source}")]
    Open {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("error reading clip {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("audio device failed while playing {name}: {source}")]
    Device {
        name: String,
        #[source]
        source: DeviceError,
    },

    #[error("playback worker is not running")]
    WorkerGone,
}
