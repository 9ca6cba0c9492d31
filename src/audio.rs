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
use std::{error::Error, fmt, sync::Arc, time::Duration};

mod error;
pub mod gain;
pub mod mock;
pub mod pipeline;
pub mod thread_priority;
pub mod wav;

pub use error::{DeviceError, PlaybackError};
pub use pipeline::{Pipeline, PlaybackReport};

/// An output sink for 16-bit little-endian mono PCM. Sinks are double
/// buffered and drain on their own, so a write may accept only part of
/// what it is given.
pub trait Device: fmt::Display + Send + Sync {
    /// Writes as much of `pcm` as the device can take, waiting at most
    /// `timeout` for room. Returns the number of bytes accepted.
    fn write(&self, pcm: &[u8], timeout: Duration) -> Result<usize, DeviceError>;
}

/// Gets a device with the given name.
///
/// Names starting with `mock` produce a mock device, and `wav:<path>`
/// records the output into a WAV file.
pub fn get_device(name: &str) -> Result<Arc<dyn Device>, Box<dyn Error>> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(name)));
    }

    if let Some(path) = name.strip_prefix("wav:") {
        return Ok(Arc::new(wav::Device::create(path, wav::DEFAULT_SAMPLE_RATE)?));
    }

    Err(format!("unsupported audio device '{}'", name).into())
}

#[cfg(test)]
mod test {
    use super::get_device;

    #[test]
    fn test_get_device() {
        let device = get_device("mock-i2s").expect("mock device should be created");
        assert_eq!("mock-i2s (Mock)", device.to_string());

        assert!(get_device("i2s0").is_err());
    }
}
