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
    fmt,
    io::{self, ErrorKind, Read, Seek, SeekFrom},
    sync::Arc,
    thread,
    time::Duration,
};

use tracing::debug;

use super::{gain, Device, PlaybackError};
use crate::catalog::has_audio_extension;
use crate::storage::ClipReader;

/// Bytes read from storage per write.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// The longest a single write may wait for the device.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Clips are canonical 16-bit PCM WAV files, so the data starts at a fixed offset.
pub const HEADER_SIZE: u64 = 44;

/// What a finished session did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Sample bytes read from the clip, excluding the header.
    pub bytes_read: u64,
    /// Bytes the device accepted.
    pub bytes_written: u64,
    /// Calls made to the device.
    pub writes: usize,
    /// Times the pipeline yielded because the device was full.
    pub yields: usize,
}

/// Streams clips from storage to an output device.
pub struct Pipeline {
    device: Arc<dyn Device>,
    gain: f32,
    chunk_size: usize,
    write_timeout: Duration,
}

impl Pipeline {
    /// Creates a new pipeline. The chunk size is rounded down to whole samples.
    pub fn new(
        device: Arc<dyn Device>,
        gain: f32,
        chunk_size: usize,
        write_timeout: Duration,
    ) -> Pipeline {
        Pipeline {
            device,
            gain: gain.max(0.0),
            chunk_size: (chunk_size & !1).max(2),
            write_timeout,
        }
    }

    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }

    /// Plays the clip to completion.
    pub fn play(
        &self,
        name: &str,
        reader: &mut dyn ClipReader,
    ) -> Result<PlaybackReport, PlaybackError> {
        let read_error = |source: io::Error| PlaybackError::Read {
            name: name.to_string(),
            source,
        };

        if has_audio_extension(name) {
            reader
                .seek(SeekFrom::Start(HEADER_SIZE))
                .map_err(read_error)?;
        }

        let mut report = PlaybackReport::default();
        let mut scratch = vec![0u8; self.chunk_size];

        loop {
            let filled = read_chunk(reader, &mut scratch).map_err(read_error)?;
            report.bytes_read += filled as u64;

            // Chunks are always even, so a dangling byte can only be the end of the clip.
            let whole = filled & !1;
            if whole < filled {
                debug!(clip = name, "Dropping trailing half sample.");
            }

            if whole > 0 {
                for sample in scratch[..whole].chunks_exact_mut(2) {
                    let shaped = gain::shape(i16::from_le_bytes([sample[0], sample[1]]), self.gain);
                    sample.copy_from_slice(&shaped.to_le_bytes());
                }
                self.write_all(name, &scratch[..whole], &mut report)?;
            }

            if filled < scratch.len() {
                break;
            }
        }

        debug!(
            clip = name,
            bytes_read = report.bytes_read,
            writes = report.writes,
            yields = report.yields,
            "Clip exhausted."
        );
        Ok(report)
    }

    /// Hands the whole buffer to the device. A partial accept or a timeout
    /// yields once and continues with the remainder.
    fn write_all(
        &self,
        name: &str,
        mut pcm: &[u8],
        report: &mut PlaybackReport,
    ) -> Result<(), PlaybackError> {
        while !pcm.is_empty() {
            report.writes += 1;
            let accepted = match self.device.write(pcm, self.write_timeout) {
                Ok(accepted) => accepted.min(pcm.len()),
                Err(e) if !e.is_fatal() => {
                    debug!(clip = name, err = %e, "Device write timed out.");
                    0
                }
                Err(source) => {
                    return Err(PlaybackError::Device {
                        name: name.to_string(),
                        source,
                    })
                }
            };

            report.bytes_written += accepted as u64;
            pcm = &pcm[accepted..];
            if !pcm.is_empty() {
                report.yields += 1;
                thread::yield_now();
            }
        }
        Ok(())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (gain {}, chunk {})", self.device, self.gain, self.chunk_size)
    }
}

/// Reads until the buffer is full or the clip ends.
fn read_chunk(reader: &mut dyn ClipReader, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
