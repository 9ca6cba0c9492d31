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
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use soundboard::audio::{self, Pipeline};
use soundboard::board::{Board, Settings};
use soundboard::catalog::Catalog;
use soundboard::config;
use soundboard::identity::{self, UnitId};
use soundboard::inputs::keyboard;
use soundboard::player::Player;
use soundboard::storage::{self, Storage};
use soundboard::transport;

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=sound board

[Service]
Type=simple
Restart=on-failure
EnvironmentFile=-/etc/default/soundboard
ExecStart=/usr/local/bin/soundboard start "$SOUNDBOARD_CONFIG"

[Install]
WantedBy=multi-user.target
Alias=soundboard.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A networked sound board."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the clips on a card and the buttons they are bound to.
    Clips {
        /// The path to the card on disk.
        path: String,
    },
    /// Prints the unit ID selected by a card.
    Identity {
        /// The path to the card on disk.
        path: String,
    },
    /// Plays a single clip through the audio pipeline.
    Play {
        /// The path to the card on disk.
        path: String,
        /// The name of the clip to play.
        clip: String,
        /// The device to play through (mock or wav:<path>).
        #[arg[short, long, default_value = "mock"]]
        device: String,
        /// Linear gain applied to every sample.
        #[arg[short, long, default_value_t = 1.0]]
        gain: f32,
    },
    /// Asks another unit to play a clip and exits.
    Send {
        /// The path to the board config.
        config_path: String,
        /// The unit to address (1-5).
        target: u8,
        /// The name of the clip to play.
        clip: String,
    },
    /// Start will start the sound board.
    Start {
        /// The path to the board config.
        config_path: String,
    },
    /// Prints a systemd service definition to stdout.
    Systemd {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clips { path } => {
            let storage = storage::fs::Storage::new(&path);
            let mut catalog = Catalog::discover(&storage)?;
            catalog.sort();

            if catalog.is_empty() {
                println!("No clips found in {}.", path);
                return Ok(());
            }

            println!("Clips (count: {}):", catalog.len());
            for clip in catalog.list() {
                println!("- {}", clip);
            }

            match catalog.assign_first_three() {
                Ok(bindings) => {
                    println!("Bindings:");
                    println!("  green:  {}", bindings.green.name);
                    println!("  blue:   {}", bindings.blue.name);
                    println!("  yellow: {}", bindings.yellow.name);
                }
                Err(e) => println!("Unable to bind buttons: {}", e),
            }
        }
        Commands::Identity { path } => {
            let storage = storage::fs::Storage::new(&path);
            let id = identity::load(&storage)?;
            println!("Unit {} ({})", id, identity::marker_name(id));
        }
        Commands::Play {
            path,
            clip,
            device,
            gain,
        } => {
            let storage: Arc<dyn Storage> = Arc::new(storage::fs::Storage::new(&path));
            let device = audio::get_device(&device)?;
            let settings = Settings {
                gain,
                ..Settings::default()
            };
            let pipeline = Pipeline::new(
                device,
                settings.gain,
                settings.chunk_size,
                settings.write_timeout,
            );
            let player = Player::new(storage, pipeline)?;
            let report = player.play_now(&clip)?;
            println!(
                "Played {} ({} bytes, {} writes, {} yields)",
                clip, report.bytes_read, report.writes, report.yields
            );
        }
        Commands::Send {
            config_path,
            target,
            clip,
        } => {
            let board = start_board(&config::load(&PathBuf::from(&config_path))?)?;
            board.messenger().send(UnitId::new(target)?, &clip)?;
        }
        Commands::Start { config_path } => {
            let board_config = config::load(&PathBuf::from(&config_path))?;
            let board = match start_board(&board_config) {
                Ok(board) => board,
                Err(e) => {
                    error!(err = e.as_ref(), "Unable to start, halting.");
                    halt().await;
                    return Err(e);
                }
            };

            let config::Inputs::Keyboard(keyboard_config) = board_config.inputs();
            let driver = keyboard::Driver::new(keyboard_config.hold()?);
            let _keyboard = driver.monitor();

            board
                .run(Arc::new(driver), board_config.tick_interval()?)
                .await;
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE)
        }
    }

    Ok(())
}

/// Builds a board from its configuration.
fn start_board(board_config: &config::Board) -> Result<Board, Box<dyn Error>> {
    let storage: Arc<dyn Storage> = Arc::new(storage::fs::Storage::new(board_config.storage()));
    let device = audio::get_device(board_config.audio_device())?;
    let transport = transport::get_transport(&board_config.transport())?;
    Ok(Board::start(
        &board_config.settings()?,
        storage,
        device,
        transport,
    )?)
}

/// Idles forever. A board that failed to start never becomes ready.
async fn halt() {
    loop {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}
