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
use std::{collections::HashMap, sync::Arc, time::Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    catalog::has_audio_extension,
    identity::{UnitId, MAX_ID, MIN_ID},
    player::Player,
    storage::{validate_name, Storage},
    transport::{PeerAddress, Transport},
};

mod error;
pub mod wire;

pub use error::{DropReason, SendError};
pub use wire::PlayCommand;

/// What happened to an inbound payload that wasn't dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The command was for this unit and its clip was handed to the player.
    Played(String),
    /// The command was for another unit.
    NotAddressed,
}

/// Sends and receives addressed PlayCommands over the shared broadcast link.
pub struct Messenger {
    identity: UnitId,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn Storage>,
    player: Arc<Player>,
    /// Timestamps count milliseconds from here.
    epoch: Instant,
    /// The last timestamp seen from each sender.
    last_seen: Mutex<HashMap<u8, u32>>,
}

impl Messenger {
    pub fn new(
        identity: UnitId,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn Storage>,
        player: Arc<Player>,
    ) -> Messenger {
        Messenger {
            identity,
            transport,
            storage,
            player,
            epoch: Instant::now(),
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn identity(&self) -> UnitId {
        self.identity
    }

    /// Asks the target unit to play a clip. Delivery is best effort: the
    /// outcome is logged and never retried.
    pub fn send(&self, target: UnitId, clip: &str) -> Result<(), SendError> {
        let result = self.try_send(target, clip);
        match &result {
            Ok(timestamp) => info!(
                sender = self.identity.get(),
                target = target.get(),
                clip,
                timestamp,
                "Sent play command."
            ),
            Err(e) => warn!(
                sender = self.identity.get(),
                target = target.get(),
                clip,
                err = %e,
                "Unable to send play command."
            ),
        }
        result.map(|_| ())
    }

    fn try_send(&self, target: UnitId, clip: &str) -> Result<u32, SendError> {
        if target == self.identity {
            return Err(SendError::SelfTarget);
        }
        if clip.len() > wire::MAX_NAME_BYTES {
            return Err(SendError::NameTooLong { len: clip.len() });
        }
        if clip.is_empty() || clip.contains('\0') {
            return Err(SendError::InvalidName(clip.to_string()));
        }

        // Wraps like a free running millisecond counter.
        let timestamp = self.epoch.elapsed().as_millis() as u32;
        let command = PlayCommand::new(self.identity.get(), target.get(), clip, timestamp);
        self.transport.broadcast(&command.encode())?;
        Ok(timestamp)
    }

    /// Handles one inbound payload. Every payload is validated on its own;
    /// duplicates and reordering are tolerated.
    pub fn on_receive(&self, peer: &PeerAddress, payload: &[u8]) -> Result<Delivery, crate::Error> {
        let command = PlayCommand::decode(payload).inspect_err(|reason| {
            debug!(peer = %peer, err = %reason, "Dropping payload.");
        })?;

        if command.target != self.identity.get() {
            debug!(
                peer = %peer,
                target = command.target,
                "Dropping command for another unit."
            );
            return Ok(Delivery::NotAddressed);
        }

        let clip = self.validate(&command).inspect_err(|reason| {
            warn!(
                peer = %peer,
                sender = command.sender,
                err = %reason,
                "Rejected play command."
            );
        })?;

        self.note_timestamp(&command);
        info!(
            peer = %peer,
            sender = command.sender,
            clip,
            "Received play command."
        );

        self.player.request(&clip)?;
        Ok(Delivery::Played(clip))
    }

    /// Checks an addressed command, returning the clip to play.
    fn validate(&self, command: &PlayCommand) -> Result<String, DropReason> {
        if !(MIN_ID..=MAX_ID).contains(&command.sender) {
            return Err(DropReason::SenderOutOfRange(command.sender));
        }

        let computed = command.expected_checksum();
        if computed != command.checksum {
            return Err(DropReason::ChecksumMismatch {
                carried: command.checksum,
                computed,
            });
        }

        let clip = command.clip()?;
        if validate_name(clip).is_err() || !has_audio_extension(clip) {
            return Err(DropReason::InvalidName);
        }
        if !self.storage.exists(clip) {
            return Err(DropReason::UnknownClip(clip.to_string()));
        }

        Ok(clip.to_string())
    }

    fn note_timestamp(&self, command: &PlayCommand) {
        let previous = self
            .last_seen
            .lock()
            .insert(command.sender, command.timestamp);
        if previous == Some(command.timestamp) {
            debug!(
                sender = command.sender,
                timestamp = command.timestamp,
                "Duplicate play command."
            );
        }
    }
}
