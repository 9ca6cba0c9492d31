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
use std::net::Ipv4Addr;

use serde::Deserialize;

const DEFAULT_PORT: u16 = 41234;

/// The broadcast link between units.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transport {
    Udp(Udp),
    Mock,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Udp(Udp::default())
    }
}

/// A UDP broadcast link.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Udp {
    /// The port every unit listens on.
    port: Option<u16>,

    /// Where broadcasts are sent.
    broadcast_address: Option<Ipv4Addr>,
}

impl Udp {
    /// Returns the shared port (default: 41234).
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns the broadcast address (default: 255.255.255.255).
    pub fn broadcast_address(&self) -> Ipv4Addr {
        self.broadcast_address.unwrap_or(Ipv4Addr::BROADCAST)
    }
}
