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
use std::{fmt, io, net::SocketAddr, sync::Arc};

use crate::config;

pub mod mock;
pub mod udp;

/// Where an inbound payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerAddress {
    /// A radio hardware address.
    Mac([u8; 6]),
    Socket(SocketAddr),
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerAddress::Mac(mac) => write!(
                f,
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
            ),
            PeerAddress::Socket(addr) => write!(f, "{}", addr),
        }
    }
}

/// Invoked once per inbound payload, off the tick loop.
pub type ReceiveCallback = Arc<dyn Fn(&PeerAddress, &[u8]) + Send + Sync>;

/// A link that delivers every payload to every unit in range. There is no
/// addressing, ordering or acknowledgement.
pub trait Transport: fmt::Display + Send + Sync {
    /// Broadcasts the payload. Success only means the link accepted it.
    fn broadcast(&self, payload: &[u8]) -> io::Result<()>;

    /// Registers the callback for inbound payloads, replacing any previous one.
    fn register_receiver(&self, callback: ReceiveCallback) -> io::Result<()>;
}

/// Creates the transport described by the configuration.
pub fn get_transport(config: &config::Transport) -> io::Result<Arc<dyn Transport>> {
    match config {
        config::Transport::Udp(udp) => Ok(Arc::new(udp::Transport::bind(
            udp.port(),
            udp.broadcast_address(),
        )?)),
        config::Transport::Mock => Ok(Arc::new(mock::Bus::new().endpoint([0x02, 0, 0, 0, 0, 1]))),
    }
}
