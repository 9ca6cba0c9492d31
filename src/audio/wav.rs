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
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;
use tracing::{error, info};

use super::DeviceError;

/// The rate clips are mastered at.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A device that records everything it is given into a 16-bit mono WAV file.
/// Useful for bench testing a board without an amplifier attached.
pub struct Device {
    path: PathBuf,
    writer: Mutex<Option<WavWriter<BufWriter<File>>>>,
}

impl Device {
    /// Creates (or truncates) the WAV file at the given path.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Device, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&path, spec)?;
        info!(path = ?path.as_ref(), sample_rate, "Recording output to WAV file.");

        Ok(Device {
            path: path.as_ref().to_path_buf(),
            writer: Mutex::new(Some(writer)),
        })
    }
}

impl super::Device for Device {
    fn write(&self, pcm: &[u8], _timeout: Duration) -> Result<usize, DeviceError> {
        let mut writer = self.writer.lock();
        let writer = writer
            .as_mut()
            .ok_or_else(|| DeviceError::Transport("WAV file already finalized".to_string()))?;

        // Only whole samples are taken; a trailing odd byte is resubmitted.
        let accepted = pcm.len() & !1;
        for pair in pcm[..accepted].chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                .map_err(|e| DeviceError::Transport(e.to_string()))?;
        }

        Ok(accepted)
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().take() {
            if let Err(e) = writer.finalize() {
                error!(path = ?self.path, err = %e, "Unable to finalize WAV file.");
            }
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (WAV)", self.path.display())
    }
}
