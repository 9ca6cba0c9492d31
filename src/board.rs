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
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, SeedableRng};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, span, Level};

use crate::{
    audio::{pipeline, Device, Pipeline},
    buttons::{self, Button, RawLevels},
    catalog::{Bindings, Catalog},
    error::StartupError,
    gesture::{Gesture, Recognizer},
    identity::{self, UnitId},
    inputs::Inputs,
    messenger::Messenger,
    player::Player,
    storage::Storage,
    transport::{PeerAddress, Transport},
};

/// Runtime knobs of a board.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub gain: f32,
    pub chunk_size: usize,
    pub write_timeout: Duration,
    pub debounce: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gain: 1.0,
            chunk_size: pipeline::DEFAULT_CHUNK_SIZE,
            write_timeout: pipeline::DEFAULT_WRITE_TIMEOUT,
            debounce: buttons::DEFAULT_DEBOUNCE,
        }
    }
}

/// What a tick asked for. Play requests may still be refused by a busy player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Idle,
    PlayBound { button: Button, clip: String },
    PlayRandom { clip: String },
    SendRemote { target: UnitId, clip: String },
}

/// A ready board: everything a unit knows once startup succeeded.
pub struct Board {
    identity: UnitId,
    catalog: Catalog,
    bindings: Bindings,
    recognizer: Recognizer,
    player: Arc<Player>,
    messenger: Arc<Messenger>,
    rng: StdRng,
}

impl Board {
    /// Brings the board up: storage, identity, catalog, bindings, player and
    /// messenger, then starts listening for commands. Any failure here is fatal.
    pub fn start(
        settings: &Settings,
        storage: Arc<dyn Storage>,
        device: Arc<dyn Device>,
        transport: Arc<dyn Transport>,
    ) -> Result<Board, StartupError> {
        let span = span!(Level::INFO, "startup");
        let _enter = span.enter();

        let entries = storage.list()?;
        info!(storage = %storage, entries = entries.len(), "Storage mounted.");

        let identity = identity::load(&*storage)?;

        let mut catalog = Catalog::discover(&*storage)?;
        catalog.sort();
        let bindings = catalog.assign_first_three()?;
        info!(
            green = bindings.green.name,
            blue = bindings.blue.name,
            yellow = bindings.yellow.name,
            "Buttons bound."
        );

        let pipeline = Pipeline::new(
            device,
            settings.gain,
            settings.chunk_size,
            settings.write_timeout,
        );
        let player = Arc::new(Player::new(storage.clone(), pipeline).map_err(StartupError::Worker)?);
        let messenger = Arc::new(Messenger::new(
            identity,
            transport.clone(),
            storage,
            player.clone(),
        ));

        let receiver = Arc::downgrade(&messenger);
        transport
            .register_receiver(Arc::new(move |peer: &PeerAddress, payload: &[u8]| {
                if let Some(messenger) = receiver.upgrade() {
                    // Outcomes are logged by the messenger.
                    let _ = messenger.on_receive(peer, payload);
                }
            }))
            .map_err(StartupError::Receiver)?;

        info!(id = identity.get(), clips = catalog.len(), transport = %transport, "Board ready.");

        Ok(Board {
            identity,
            catalog,
            bindings,
            recognizer: Recognizer::new(settings.debounce),
            player,
            messenger,
            rng: StdRng::from_entropy(),
        })
    }

    /// Replaces the random source used for clip and target selection.
    pub fn with_rng(mut self, rng: StdRng) -> Board {
        self.rng = rng;
        self
    }

    /// Runs one control tick: sample, classify, act.
    pub fn tick(&mut self, raw: RawLevels, now: Instant) -> Action {
        let action = match self.recognizer.tick(raw, now) {
            Gesture::None => return Action::Idle,
            Gesture::Single(button) => {
                let Some(clip) = self.bindings.clip_for(button) else {
                    return Action::Idle;
                };
                let clip = clip.name.clone();
                let _ = self.player.request(&clip);
                Action::PlayBound { button, clip }
            }
            Gesture::Dual => {
                let Some(clip) = self.random_clip() else {
                    return Action::Idle;
                };
                let _ = self.player.request(&clip);
                Action::PlayRandom { clip }
            }
            Gesture::Remote => {
                let target = self.identity.random_peer(&mut self.rng);
                let Some(clip) = self.random_clip() else {
                    return Action::Idle;
                };
                let _ = self.messenger.send(target, &clip);
                Action::SendRemote { target, clip }
            }
        };

        debug!(action = ?action, "Tick.");
        action
    }

    fn random_clip(&mut self) -> Option<String> {
        match self.catalog.random_pick(&mut self.rng) {
            Ok(clip) => Some(clip.name.clone()),
            Err(e) => {
                error!(err = %e, "Unable to pick a clip.");
                None
            }
        }
    }

    /// Ticks forever at the given interval, reading buttons from `inputs`.
    pub async fn run(mut self, inputs: Arc<dyn Inputs>, tick_interval: Duration) {
        let span = span!(Level::INFO, "tick loop");
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let _enter = span.enter();
            let now = Instant::now();
            self.tick(inputs.sample(now), now);
        }
    }

    pub fn identity(&self) -> UnitId {
        self.identity
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    pub fn messenger(&self) -> &Arc<Messenger> {
        &self.messenger
    }
}
