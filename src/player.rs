// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, span, warn, Level};

use crate::{
    audio::{
        thread_priority::{
            configure_playback_thread_priority, playback_thread_priority, rt_audio_enabled,
        },
        Pipeline, PlaybackError, PlaybackReport,
    },
    storage::{ClipReader, Storage},
};

/// Holds the single playback slot. The slot is released when the guard drops.
struct ActiveGuard(Arc<AtomicBool>);

impl ActiveGuard {
    fn acquire(active: &Arc<AtomicBool>) -> Option<ActiveGuard> {
        active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ActiveGuard(active.clone()))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A clip that has been opened and is waiting for, or owned by, the worker.
/// The reader is closed before the slot is released.
struct Session {
    clip: String,
    reader: Box<dyn ClipReader>,
    _guard: ActiveGuard,
}

/// Plays clips one at a time. Requests made while a clip is playing are refused.
pub struct Player {
    /// The volume clips are read from.
    storage: Arc<dyn Storage>,
    /// The pipeline shared with the playback worker.
    pipeline: Arc<Pipeline>,
    /// Set while a session exists.
    active: Arc<AtomicBool>,
    /// Feeds the playback worker. Dropping it stops the worker.
    sessions: Option<Sender<Session>>,
}

impl Player {
    /// Creates a new player and starts its playback worker.
    pub fn new(storage: Arc<dyn Storage>, pipeline: Pipeline) -> io::Result<Player> {
        let pipeline = Arc::new(pipeline);
        let (sessions_tx, sessions_rx) = crossbeam_channel::bounded(1);

        let worker_pipeline = pipeline.clone();
        thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || Player::run_worker(worker_pipeline, sessions_rx))?;

        Ok(Player {
            storage,
            pipeline,
            active: Arc::new(AtomicBool::new(false)),
            sessions: Some(sessions_tx),
        })
    }

    fn run_worker(pipeline: Arc<Pipeline>, sessions: Receiver<Session>) {
        let span = span!(Level::INFO, "playback worker");
        let _enter = span.enter();

        configure_playback_thread_priority(playback_thread_priority(), rt_audio_enabled());
        info!(pipeline = %pipeline, "Playback worker started.");

        for mut session in sessions.iter() {
            info!(clip = session.clip, "Playing clip.");
            match pipeline.play(&session.clip, session.reader.as_mut()) {
                Ok(report) => info!(
                    clip = session.clip,
                    bytes = report.bytes_read,
                    writes = report.writes,
                    yields = report.yields,
                    "Finished clip."
                ),
                Err(e) => error!(clip = session.clip, err = %e, "Playback aborted."),
            }
        }

        info!("Playback worker stopped.");
    }

    /// Starts playing the clip in the background. Returns immediately.
    pub fn request(&self, clip: &str) -> Result<(), PlaybackError> {
        let session = self.open(clip)?;

        let sent = match self.sessions.as_ref() {
            Some(sessions) => sessions.try_send(session).is_ok(),
            None => false,
        };
        if !sent {
            error!(clip, "Playback worker is gone, dropping clip.");
            return Err(PlaybackError::WorkerGone);
        }
        Ok(())
    }

    /// Plays the clip on the calling thread and waits for it to finish.
    pub fn play_now(&self, clip: &str) -> Result<PlaybackReport, PlaybackError> {
        let mut session = self.open(clip)?;
        info!(clip, "Playing clip.");
        self.pipeline.play(&session.clip, session.reader.as_mut())
    }

    /// Returns true while a clip is playing.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Claims the playback slot and opens the clip. The slot is released
    /// again if the clip can't be opened.
    fn open(&self, clip: &str) -> Result<Session, PlaybackError> {
        let Some(guard) = ActiveGuard::acquire(&self.active) else {
            warn!(clip, "Already playing, refusing clip.");
            return Err(PlaybackError::Busy);
        };

        let reader = self.storage.open(clip).map_err(|source| {
            error!(clip, err = %source, "Unable to open clip.");
            PlaybackError::Open {
                name: clip.to_string(),
                source,
            }
        })?;

        Ok(Session {
            clip: clip.to_string(),
            reader,
            _guard: guard,
        })
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish its current clip and exit.
        self.sessions.take();
    }
}
