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
    fmt, io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::debug;

use super::{PeerAddress, ReceiveCallback};

#[derive(Default)]
struct Cell {
    /// Every registered endpoint and its callback.
    receivers: Vec<(PeerAddress, ReceiveCallback)>,
    /// Every payload broadcast on the cell, with its sender.
    sent: Vec<(PeerAddress, Vec<u8>)>,
}

/// An in-process radio cell. Every broadcast reaches every other endpoint.
#[derive(Clone, Default)]
pub struct Bus {
    cell: Arc<Mutex<Cell>>,
}

impl Bus {
    pub fn new() -> Bus {
        Bus::default()
    }

    /// Creates an endpoint on the cell with the given hardware address.
    pub fn endpoint(&self, mac: [u8; 6]) -> Endpoint {
        Endpoint {
            address: PeerAddress::Mac(mac),
            bus: self.clone(),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Every payload broadcast so far.
    pub fn sent(&self) -> Vec<(PeerAddress, Vec<u8>)> {
        self.cell.lock().sent.clone()
    }

    /// Delivers a payload to every endpoint except the sender, as if it had
    /// been heard over the air.
    pub fn inject(&self, from: PeerAddress, payload: &[u8]) {
        // Callbacks may broadcast in turn, so they're invoked without the lock.
        let receivers: Vec<ReceiveCallback> = self
            .cell
            .lock()
            .receivers
            .iter()
            .filter(|(address, _)| *address != from)
            .map(|(_, callback)| callback.clone())
            .collect();

        debug!(from = %from, receivers = receivers.len(), "Delivering payload.");
        for callback in receivers {
            callback(&from, payload);
        }
    }
}

/// One unit's view of the bus.
#[derive(Clone)]
pub struct Endpoint {
    address: PeerAddress,
    bus: Bus,
    failing: Arc<AtomicBool>,
}

impl Endpoint {
    pub fn address(&self) -> PeerAddress {
        self.address
    }

    /// Makes subsequent broadcasts fail.
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }
}

impl super::Transport for Endpoint {
    fn broadcast(&self, payload: &[u8]) -> io::Result<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(io::Error::new(io::ErrorKind::Other, "mock send failure"));
        }

        self.bus
            .cell
            .lock()
            .sent
            .push((self.address, payload.to_vec()));
        self.bus.inject(self.address, payload);
        Ok(())
    }

    fn register_receiver(&self, callback: ReceiveCallback) -> io::Result<()> {
        let mut cell = self.bus.cell.lock();
        cell.receivers.retain(|(address, _)| *address != self.address);
        cell.receivers.push((self.address, callback));
        Ok(())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.address)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::transport::{PeerAddress, Transport};

    use super::Bus;

    #[test]
    fn test_broadcast_reaches_others() {
        let bus = Bus::new();
        let a = bus.endpoint([0, 0, 0, 0, 0, 1]);
        let b = bus.endpoint([0, 0, 0, 0, 0, 2]);
        let c = bus.endpoint([0, 0, 0, 0, 0, 3]);

        let heard = Arc::new(Mutex::new(Vec::new()));
        for endpoint in [&a, &b, &c] {
            let heard = heard.clone();
            let me = endpoint.address();
            endpoint
                .register_receiver(Arc::new(move |from: &PeerAddress, payload: &[u8]| {
                    heard.lock().push((me, *from, payload.to_vec()));
                }))
                .unwrap();
        }

        a.broadcast(&[7, 7]).unwrap();

        let heard = heard.lock().clone();
        assert_eq!(2, heard.len());
        assert!(heard.iter().all(|(_, from, payload)| *from == a.address() && payload == &vec![7, 7]));
        assert!(heard.iter().all(|(me, _, _)| *me != a.address()));
        assert_eq!(1, bus.sent().len());
    }

    #[test]
    fn test_failing_sends() {
        let bus = Bus::new();
        let a = bus.endpoint([0, 0, 0, 0, 0, 1]);
        a.fail_sends(true);
        assert!(a.broadcast(&[1]).is_err());
        assert!(bus.sent().is_empty());
    }
}
