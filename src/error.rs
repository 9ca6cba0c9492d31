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

use crate::{
    audio::PlaybackError,
    catalog::CatalogError,
    config::ConfigError,
    identity::IdentityError,
    messenger::{DropReason, SendError},
    storage::StorageError,
};

/// Conditions that keep a board from ever becoming ready.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("no storage: {0}")]
    Storage(#[from] StorageError),

    #[error("no identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("bad catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("unable to start the playback worker: {0}")]
    Worker(#[source] io::Error),

    #[error("unable to register the receiver: {0}")]
    Receiver(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How a failure is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The unit halts and never becomes ready.
    FatalStartup,
    /// An inbound message is dropped. The unit carries on.
    TransportDrop,
    /// A playback session ends early or never starts. The unit stays ready.
    PlaybackAbort,
    /// A broadcast failed. It is logged and not retried.
    SendBestEffort,
}

/// Any failure a board can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("dropped message: {0}")]
    Drop(#[from] DropReason),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Startup(_) => ErrorKind::FatalStartup,
            Error::Drop(_) => ErrorKind::TransportDrop,
            Error::Playback(_) => ErrorKind::PlaybackAbort,
            Error::Send(_) => ErrorKind::SendBestEffort,
        }
    }
}
