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
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use duration_string::DurationString;

mod board;
mod error;
mod inputs;
mod transport;

pub use board::Board;
pub use error::ConfigError;
pub use inputs::{Inputs, Keyboard};
pub use transport::{Transport, Udp};

/// Prefix of environment variables that override the board file,
/// e.g. `SOUNDBOARD_GAIN=0.5` or `SOUNDBOARD_TRANSPORT__PORT=5000`.
const ENV_PREFIX: &str = "SOUNDBOARD";

/// Loads a board configuration from a YAML file, with environment overrides.
pub fn load(path: &Path) -> Result<Board, ConfigError> {
    let board: Board = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    board.validate()?;
    Ok(board)
}

/// Parses a board configuration from YAML text.
pub fn parse(yaml: &str) -> Result<Board, ConfigError> {
    let board: Board = Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize()?;

    board.validate()?;
    Ok(board)
}

/// Parses an optional duration string such as "50ms".
pub(crate) fn parse_duration(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => DurationString::from_string(value.to_string())
            .map(Duration::from)
            .map_err(|e| ConfigError::Invalid {
                field,
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use std::{fs, net::Ipv4Addr, time::Duration};

    use super::*;

    #[test]
    fn test_defaults() -> Result<(), ConfigError> {
        let board = parse(
            r#"
            storage: /media/card
            audio_device: mock-i2s
            "#,
        )?;

        assert_eq!("/media/card", board.storage());
        assert_eq!("mock-i2s", board.audio_device());

        let settings = board.settings()?;
        assert_eq!(1.0, settings.gain);
        assert_eq!(1024, settings.chunk_size);
        assert_eq!(Duration::from_millis(100), settings.write_timeout);
        assert_eq!(Duration::from_millis(50), settings.debounce);
        assert_eq!(Duration::from_millis(10), board.tick_interval()?);

        match board.transport() {
            Transport::Udp(udp) => {
                assert_eq!(41234, udp.port());
                assert_eq!(Ipv4Addr::BROADCAST, udp.broadcast_address());
            }
            Transport::Mock => panic!("expected the UDP transport"),
        }
        let Inputs::Keyboard(keyboard) = board.inputs();
        assert_eq!(Duration::from_millis(120), keyboard.hold()?);
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<(), ConfigError> {
        let board = parse(
            r#"
            storage: /media/card
            audio_device: wav:/tmp/out.wav
            gain: 0.5
            chunk_size: 512
            write_timeout: 20ms
            debounce: 30ms
            tick_interval: 5ms
            transport:
              kind: udp
              port: 5000
              broadcast_address: 10.0.0.255
            inputs:
              kind: keyboard
              hold: 1s
            "#,
        )?;

        let settings = board.settings()?;
        assert_eq!(0.5, settings.gain);
        assert_eq!(512, settings.chunk_size);
        assert_eq!(Duration::from_millis(20), settings.write_timeout);
        assert_eq!(Duration::from_millis(30), settings.debounce);
        assert_eq!(Duration::from_millis(5), board.tick_interval()?);

        let Transport::Udp(udp) = board.transport() else {
            panic!("expected the UDP transport");
        };
        assert_eq!(5000, udp.port());
        assert_eq!(Ipv4Addr::new(10, 0, 0, 255), udp.broadcast_address());

        let Inputs::Keyboard(keyboard) = board.inputs();
        assert_eq!(Duration::from_secs(1), keyboard.hold()?);
        Ok(())
    }

    #[test]
    fn test_mock_transport() -> Result<(), ConfigError> {
        let board = parse(
            r#"
            storage: card
            audio_device: mock
            transport:
              kind: mock
            "#,
        )?;
        assert_eq!(Transport::Mock, board.transport());
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        let odd_chunk = parse(
            r#"
            storage: card
            audio_device: mock
            chunk_size: 1023
            "#,
        );
        assert!(matches!(
            odd_chunk,
            Err(ConfigError::Invalid {
                field: "chunk_size",
                ..
            })
        ));

        let negative_gain = parse(
            r#"
            storage: card
            audio_device: mock
            gain: -1.0
            "#,
        );
        assert!(matches!(
            negative_gain,
            Err(ConfigError::Invalid { field: "gain", .. })
        ));

        let bad_duration = parse(
            r#"
            storage: card
            audio_device: mock
            debounce: soon
            "#,
        );
        assert!(matches!(
            bad_duration,
            Err(ConfigError::Invalid {
                field: "debounce",
                ..
            })
        ));

        let missing_storage = parse("audio_device: mock");
        assert!(matches!(missing_storage, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("board.yaml");
        fs::write(
            &path,
            "storage: card\naudio_device: mock\ntransport:\n  kind: mock\n",
        )?;

        let board = load(&path)?;
        assert_eq!("card", board.storage());
        assert_eq!(Transport::Mock, board.transport());
        Ok(())
    }
}
