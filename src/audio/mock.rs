// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
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
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use tracing::debug;

use super::DeviceError;

/// How long a held mock device stalls a write before reporting nothing accepted.
const HELD_STALL: Duration = Duration::from_millis(1);

#[derive(Default)]
struct State {
    /// Bytes accepted by each write call, in order.
    writes: Vec<usize>,
    /// Everything accepted so far.
    data: Vec<u8>,
    /// Caps how many bytes a single write accepts.
    max_accept: Option<usize>,
    /// Number of leading writes that time out.
    stalls: usize,
    /// The write call (zero based) that fails fatally.
    fail_at: Option<usize>,
}

/// A mock device. Records everything written to it.
#[derive(Clone)]
pub struct Device {
    name: String,
    state: Arc<Mutex<State>>,
    held: Arc<AtomicBool>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            state: Arc::new(Mutex::new(State::default())),
            held: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Accept at most `max` bytes per write.
    pub fn with_max_accept(self, max: usize) -> Device {
        self.state.lock().max_accept = Some(max);
        self
    }

    /// Time out on the first `count` writes.
    pub fn with_stalls(self, count: usize) -> Device {
        self.state.lock().stalls = count;
        self
    }

    /// Fail fatally on the given write call (zero based).
    pub fn with_failure_at(self, write: usize) -> Device {
        self.state.lock().fail_at = Some(write);
        self
    }

    /// Stops draining. Writes accept nothing until released.
    pub fn hold(&self) {
        self.held.store(true, Ordering::Release);
    }

    /// Resumes draining.
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    /// The number of write calls made.
    pub fn writes(&self) -> usize {
        self.state.lock().writes.len()
    }

    /// Bytes accepted by each write call.
    pub fn write_sizes(&self) -> Vec<usize> {
        self.state.lock().writes.clone()
    }

    /// All accepted bytes.
    pub fn data(&self) -> Vec<u8> {
        self.state.lock().data.clone()
    }

    /// All accepted bytes, decoded as samples.
    pub fn samples(&self) -> Vec<i16> {
        self.state
            .lock()
            .data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }
}

impl super::Device for Device {
    fn write(&self, pcm: &[u8], timeout: Duration) -> Result<usize, DeviceError> {
        if self.held.load(Ordering::Acquire) {
            thread::sleep(HELD_STALL.min(timeout));
            self.state.lock().writes.push(0);
            return Ok(0);
        }

        let mut state = self.state.lock();
        let call = state.writes.len();

        if state.fail_at == Some(call) {
            state.writes.push(0);
            return Err(DeviceError::Transport(format!("{} failed", self.name)));
        }

        if state.stalls > 0 {
            state.stalls -= 1;
            state.writes.push(0);
            return Err(DeviceError::Timeout(timeout));
        }

        let accepted = state.max_accept.map_or(pcm.len(), |max| pcm.len().min(max));
        state.data.extend_from_slice(&pcm[..accepted]);
        state.writes.push(accepted);
        debug!(device = self.name, submitted = pcm.len(), accepted, "Mock write.");
        Ok(accepted)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name,)
    }
}
