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
//! The fixed-size PlayCommand record.
//!
//! ```text
//! offset  size  field
//!      0     1  sender ID
//!      1     1  target ID
//!      2    64  clip name, NUL terminated, tail unspecified
//!     66     4  timestamp, little endian
//!     70     1  checksum
//! ```
use super::DropReason;

/// Size of the clip name field.
pub const NAME_LEN: usize = 64;

/// Longest name that still leaves room for the terminator.
pub const MAX_NAME_BYTES: usize = NAME_LEN - 1;

/// Size of an encoded PlayCommand.
pub const WIRE_SIZE: usize = 2 + NAME_LEN + 4 + 1;

const NAME_OFFSET: usize = 2;
const TIMESTAMP_OFFSET: usize = NAME_OFFSET + NAME_LEN;
const CHECKSUM_OFFSET: usize = TIMESTAMP_OFFSET + 4;

/// Computes the one byte checksum: sender, target and every name byte summed mod 256.
pub fn checksum(sender: u8, target: u8, name: &[u8]) -> u8 {
    name.iter()
        .fold(sender.wrapping_add(target), |sum, b| sum.wrapping_add(*b))
}

/// A command asking the target unit to play a clip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayCommand {
    pub sender: u8,
    pub target: u8,
    /// The name bytes up to the terminator. A full 64 bytes means the
    /// terminator was missing.
    pub name: Vec<u8>,
    pub timestamp: u32,
    /// The checksum carried by the record.
    pub checksum: u8,
}

impl PlayCommand {
    /// Builds a command with a freshly computed checksum. The name must
    /// already be known to fit.
    pub fn new(sender: u8, target: u8, name: &str, timestamp: u32) -> PlayCommand {
        let name = name.as_bytes().to_vec();
        PlayCommand {
            sender,
            target,
            checksum: checksum(sender, target, &name),
            name,
            timestamp,
        }
    }

    pub fn encode(&self) -> [u8; WIRE_SIZE] {
        let mut buf = [0u8; WIRE_SIZE];
        buf[0] = self.sender;
        buf[1] = self.target;

        let len = self.name.len().min(MAX_NAME_BYTES);
        buf[NAME_OFFSET..NAME_OFFSET + len].copy_from_slice(&self.name[..len]);

        buf[TIMESTAMP_OFFSET..CHECKSUM_OFFSET].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[CHECKSUM_OFFSET] = self.checksum;
        buf
    }

    /// Parses a record. Only the size is checked here.
    pub fn decode(payload: &[u8]) -> Result<PlayCommand, DropReason> {
        let payload: &[u8; WIRE_SIZE] = payload
            .try_into()
            .map_err(|_| DropReason::WrongSize { len: payload.len() })?;

        let field = &payload[NAME_OFFSET..TIMESTAMP_OFFSET];
        let end = field.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);

        let mut timestamp = [0u8; 4];
        timestamp.copy_from_slice(&payload[TIMESTAMP_OFFSET..CHECKSUM_OFFSET]);

        Ok(PlayCommand {
            sender: payload[0],
            target: payload[1],
            name: field[..end].to_vec(),
            timestamp: u32::from_le_bytes(timestamp),
            checksum: payload[CHECKSUM_OFFSET],
        })
    }

    /// The checksum the record should carry.
    pub fn expected_checksum(&self) -> u8 {
        checksum(self.sender, self.target, &self.name)
    }

    /// The clip name as text.
    pub fn clip(&self) -> Result<&str, DropReason> {
        if self.name.len() >= NAME_LEN {
            return Err(DropReason::UnterminatedName);
        }
        std::str::from_utf8(&self.name).map_err(|_| DropReason::InvalidName)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(71, WIRE_SIZE);

        let command = PlayCommand::new(2, 4, "x.wav", 0x01020304);
        let buf = command.encode();
        assert_eq!(2, buf[0]);
        assert_eq!(4, buf[1]);
        assert_eq!(b"x.wav", &buf[2..7]);
        assert_eq!(0, buf[7]);
        assert_eq!([4, 3, 2, 1], buf[66..70]);
        assert_eq!(command.checksum, buf[70]);

        assert_eq!(command, PlayCommand::decode(&buf).unwrap());
    }

    #[test]
    fn test_checksum() {
        // 2 + 4 + 'x' '.' 'w' 'a' 'v' = 6 + 120 + 46 + 119 + 97 + 118 = 506 -> 250
        assert_eq!(250, checksum(2, 4, b"x.wav"));
        assert_eq!(250, PlayCommand::new(2, 4, "x.wav", 0).checksum);
        assert_eq!(0, checksum(128, 128, b""));
    }

    #[test]
    fn test_decode_rejects_wrong_size() {
        let buf = PlayCommand::new(1, 2, "a.wav", 0).encode();
        assert!(matches!(
            PlayCommand::decode(&buf[..70]),
            Err(DropReason::WrongSize { len: 70 })
        ));
        let mut long = buf.to_vec();
        long.push(0);
        assert!(matches!(
            PlayCommand::decode(&long),
            Err(DropReason::WrongSize { len: 72 })
        ));
    }

    #[test]
    fn test_name_tail_ignored() {
        let mut buf = PlayCommand::new(1, 2, "a.wav", 0).encode();
        buf[40] = b'z';
        let command = PlayCommand::decode(&buf).unwrap();
        assert_eq!("a.wav", command.clip().unwrap());
    }

    #[test]
    fn test_unterminated_name() {
        let mut buf = PlayCommand::new(1, 2, "", 0).encode();
        buf[NAME_OFFSET..TIMESTAMP_OFFSET].fill(b'a');
        let command = PlayCommand::decode(&buf).unwrap();
        assert_eq!(NAME_LEN, command.name.len());
        assert!(matches!(command.clip(), Err(DropReason::UnterminatedName)));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let mut buf = PlayCommand::new(1, 2, "", 0).encode();
        buf[NAME_OFFSET] = 0xff;
        let command = PlayCommand::decode(&buf).unwrap();
        assert!(matches!(command.clip(), Err(DropReason::InvalidName)));
    }
}
