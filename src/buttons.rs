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
    str::FromStr,
    time::{Duration, Instant},
};

/// Default time a raw reading must hold before it is believed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// The four buttons on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// The remote trigger.
    Red,
    Green,
    Blue,
    Yellow,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Red, Button::Green, Button::Blue, Button::Yellow];

    /// The buttons with a static clip binding.
    pub const LOCAL: [Button; 3] = [Button::Green, Button::Blue, Button::Yellow];

    pub const REMOTE: Button = Button::Red;

    pub fn index(self) -> usize {
        match self {
            Button::Red => 0,
            Button::Green => 1,
            Button::Blue => 2,
            Button::Yellow => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Button::Red => "red",
            Button::Green => "green",
            Button::Blue => "blue",
            Button::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown button '{0}'")]
pub struct UnknownButton(String);

impl FromStr for Button {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" | "r" => Ok(Button::Red),
            "green" | "g" => Ok(Button::Green),
            "blue" | "b" => Ok(Button::Blue),
            "yellow" | "y" => Ok(Button::Yellow),
            _ => Err(UnknownButton(s.to_string())),
        }
    }
}

/// One raw reading of all four buttons. True means the button is pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawLevels([bool; 4]);

impl RawLevels {
    pub fn get(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    pub fn set(&mut self, button: Button, active: bool) {
        self.0[button.index()] = active;
    }

    /// Returns a copy with the given button forced active.
    pub fn with(mut self, button: Button) -> RawLevels {
        self.set(button, true);
        self
    }
}

/// Two-stage debouncer for a single button.
///
/// Every change of the raw reading restarts the timer. The stable level only
/// follows the raw level once it has held for the full interval, and a
/// confirmed inactive to active transition latches a single edge that stays
/// set until it is consumed.
#[derive(Clone, Debug)]
pub struct Debouncer {
    interval: Duration,
    stable: bool,
    last_raw: bool,
    last_change: Option<Instant>,
    pressed: bool,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Debouncer {
        Debouncer {
            interval,
            stable: false,
            last_raw: false,
            last_change: None,
            pressed: false,
        }
    }

    /// Feeds one raw reading taken at `now`.
    pub fn update(&mut self, raw: bool, now: Instant) {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change = Some(now);
            return;
        }

        let Some(changed_at) = self.last_change else {
            return;
        };
        if raw != self.stable && now.saturating_duration_since(changed_at) >= self.interval {
            self.stable = raw;
            if raw {
                self.pressed = true;
            }
        }
    }

    /// The debounced level.
    pub fn is_active(&self) -> bool {
        self.stable
    }

    /// Returns true if an edge is latched, without consuming it.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Consumes the latched edge.
    pub fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    pub fn clear_pressed(&mut self) {
        self.pressed = false;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEFAULT_DEBOUNCE)
    }
}
