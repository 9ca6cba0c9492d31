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

use serde::Deserialize;

use super::{parse_duration, ConfigError, Inputs, Transport};
use crate::{audio::pipeline, board::Settings, buttons};

const DEFAULT_GAIN: f32 = 1.0;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A YAML representation of a board.
#[derive(Deserialize, Clone, Debug)]
pub struct Board {
    /// The root of the mounted volume.
    storage: String,

    /// The audio output device.
    audio_device: String,

    /// Linear gain applied to every sample (default: 1.0).
    gain: Option<f32>,

    /// Bytes streamed per device write (default: 1024).
    chunk_size: Option<usize>,

    /// Longest wait for a single device write (default: 100ms).
    write_timeout: Option<String>,

    /// How long a button reading must hold (default: 50ms).
    debounce: Option<String>,

    /// Time between control ticks (default: 10ms).
    tick_interval: Option<String>,

    /// The broadcast link (default: UDP).
    transport: Option<Transport>,

    /// The button source (default: keyboard).
    inputs: Option<Inputs>,
}

impl Board {
    /// New will create a new board configuration with defaults.
    pub fn new(storage: &str, audio_device: &str) -> Board {
        Board {
            storage: storage.to_string(),
            audio_device: audio_device.to_string(),
            gain: None,
            chunk_size: None,
            write_timeout: None,
            debounce: None,
            tick_interval: None,
            transport: None,
            inputs: None,
        }
    }

    pub fn storage(&self) -> &str {
        &self.storage
    }

    pub fn audio_device(&self) -> &str {
        &self.audio_device
    }

    pub fn gain(&self) -> f32 {
        self.gain.unwrap_or(DEFAULT_GAIN)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(pipeline::DEFAULT_CHUNK_SIZE)
    }

    pub fn write_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(
            "write_timeout",
            self.write_timeout.as_deref(),
            pipeline::DEFAULT_WRITE_TIMEOUT,
        )
    }

    pub fn debounce(&self) -> Result<Duration, ConfigError> {
        parse_duration(
            "debounce",
            self.debounce.as_deref(),
            buttons::DEFAULT_DEBOUNCE,
        )
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(
            "tick_interval",
            self.tick_interval.as_deref(),
            DEFAULT_TICK_INTERVAL,
        )
    }

    pub fn transport(&self) -> Transport {
        self.transport.clone().unwrap_or_default()
    }

    pub fn inputs(&self) -> Inputs {
        self.inputs.clone().unwrap_or_default()
    }

    /// Checks every value, so a bad file is rejected before anything starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gain = self.gain();
        if !gain.is_finite() || gain < 0.0 {
            return Err(ConfigError::Invalid {
                field: "gain",
                reason: format!("{} is not a non-negative number", gain),
            });
        }

        let chunk_size = self.chunk_size();
        if chunk_size == 0 || chunk_size % 2 != 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: format!("{} is not a positive, even byte count", chunk_size),
            });
        }

        if self.tick_interval()?.is_zero() {
            return Err(ConfigError::Invalid {
                field: "tick_interval",
                reason: "must be longer than zero".to_string(),
            });
        }

        self.settings()?;
        match self.inputs() {
            Inputs::Keyboard(keyboard) => keyboard.hold()?,
        };
        Ok(())
    }

    /// The runtime settings of the board.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        Ok(Settings {
            gain: self.gain(),
            chunk_size: self.chunk_size(),
            write_timeout: self.write_timeout()?,
            debounce: self.debounce()?,
        })
    }
}
