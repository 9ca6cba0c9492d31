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

use super::{parse_duration, ConfigError};

const DEFAULT_HOLD: Duration = Duration::from_millis(120);

/// Where button readings come from.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Inputs {
    Keyboard(Keyboard),
}

impl Default for Inputs {
    fn default() -> Self {
        Inputs::Keyboard(Keyboard::default())
    }
}

/// Buttons typed on the console.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Keyboard {
    /// How long a typed button stays pressed.
    hold: Option<String>,
}

impl Keyboard {
    /// Returns the hold time (default: 120ms).
    pub fn hold(&self) -> Result<Duration, ConfigError> {
        parse_duration("inputs.hold", self.hold.as_deref(), DEFAULT_HOLD)
    }
}
