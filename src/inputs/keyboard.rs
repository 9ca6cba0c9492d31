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
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, span, warn, Level};

use crate::buttons::{Button, RawLevels};

/// Buttons driven from the console. Each line names the buttons to press
/// together, e.g. `green` or `g y`. A typed button is held for a fixed time
/// and then released.
#[derive(Clone)]
pub struct Driver {
    hold: Duration,
    release_at: Arc<Mutex<[Option<Instant>; 4]>>,
}

impl Driver {
    pub fn new(hold: Duration) -> Driver {
        Driver {
            hold,
            release_at: Arc::new(Mutex::new([None; 4])),
        }
    }

    /// Presses the given buttons as of `now`.
    pub fn press(&self, buttons: &[Button], now: Instant) {
        let mut release_at = self.release_at.lock();
        for button in buttons {
            release_at[button.index()] = Some(now + self.hold);
        }
    }

    fn monitor_io<R, W>(&self, mut reader: R, mut writer: W) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(writer, "Buttons (red, green, blue, yellow): ")?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        let buttons: Result<Vec<Button>, _> = input
            .split(|c: char| c.is_whitespace() || c == ',' || c == '+')
            .filter(|token| !token.is_empty())
            .map(str::parse::<Button>)
            .collect();

        match buttons {
            Ok(buttons) if !buttons.is_empty() => self.press(&buttons, Instant::now()),
            Ok(_) => {}
            Err(e) => warn!(input = input.trim(), err = %e, "Unrecognized input"),
        }
        Ok(true)
    }

    /// Reads lines from stdin until it closes.
    pub fn monitor(&self) -> JoinHandle<Result<(), io::Error>> {
        let driver = self.clone();
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while driver.monitor_io(io::stdin().lock(), io::stdout())? {}

            info!("Keyboard input closed.");
            Ok(())
        })
    }
}

impl super::Inputs for Driver {
    fn sample(&self, now: Instant) -> RawLevels {
        let release_at = self.release_at.lock();
        let mut levels = RawLevels::default();
        for button in Button::ALL {
            if release_at[button.index()].is_some_and(|at| now < at) {
                levels.set(button, true);
            }
        }
        levels
    }
}

#[cfg(test)]
mod test {
    use std::{
        io::{self, BufReader, BufWriter},
        time::{Duration, Instant},
    };

    use crate::buttons::{Button, RawLevels};
    use crate::inputs::Inputs as _;

    use super::Driver;

    const HOLD: Duration = Duration::from_millis(120);

    fn type_line(driver: &Driver, line: &str) -> Result<bool, io::Error> {
        let reader = BufReader::new(line.as_bytes());
        let writer = BufWriter::new(Vec::new());
        driver.monitor_io(reader, writer)
    }

    #[test]
    fn test_keyboard_buttons() -> Result<(), io::Error> {
        let driver = Driver::new(HOLD);
        assert!(type_line(&driver, "green yellow\n")?);

        let levels = driver.sample(Instant::now());
        assert!(levels.get(Button::Green));
        assert!(levels.get(Button::Yellow));
        assert!(!levels.get(Button::Red));
        assert!(!levels.get(Button::Blue));

        let later = driver.sample(Instant::now() + HOLD * 2);
        assert!(!later.get(Button::Green));
        Ok(())
    }

    #[test]
    fn test_keyboard_short_names() -> Result<(), io::Error> {
        let driver = Driver::new(HOLD);
        assert!(type_line(&driver, "r,b\n")?);
        let levels = driver.sample(Instant::now());
        assert!(levels.get(Button::Red));
        assert!(levels.get(Button::Blue));
        Ok(())
    }

    #[test]
    fn test_keyboard_unrecognized() -> Result<(), io::Error> {
        let driver = Driver::new(HOLD);
        assert!(type_line(&driver, "green purple\n")?);
        assert_eq!(RawLevels::default(), driver.sample(Instant::now()));
        assert!(!type_line(&driver, "")?);
        Ok(())
    }
}
