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
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{debug, info, span, warn, Level};

use super::{PeerAddress, ReceiveCallback};

/// Anything larger than this isn't a command and is truncated by the socket.
const MAX_DATAGRAM: usize = 512;

/// How often the receive thread checks whether it should stop.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A UDP broadcast link standing in for the radio.
pub struct Transport {
    socket: UdpSocket,
    destination: SocketAddr,
    callback: Arc<Mutex<Option<ReceiveCallback>>>,
    receiving: AtomicBool,
    stop: Arc<AtomicBool>,
}

impl Transport {
    /// Binds the shared port on all interfaces and broadcasts to the given address.
    pub fn bind(port: u16, broadcast_address: Ipv4Addr) -> io::Result<Transport> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        socket.set_broadcast(true)?;
        Transport::new(
            socket,
            SocketAddr::V4(SocketAddrV4::new(broadcast_address, port)),
        )
    }

    /// Wraps an already bound socket.
    pub fn new(socket: UdpSocket, destination: SocketAddr) -> io::Result<Transport> {
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        info!(
            local = ?socket.local_addr()?,
            destination = %destination,
            "UDP transport ready."
        );

        Ok(Transport {
            socket,
            destination,
            callback: Arc::new(Mutex::new(None)),
            receiving: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn receive_loop(
        socket: UdpSocket,
        callback: Arc<Mutex<Option<ReceiveCallback>>>,
        stop: Arc<AtomicBool>,
    ) {
        let span = span!(Level::INFO, "udp receiver");
        let _enter = span.enter();

        info!("UDP receiver started.");
        let mut buf = [0u8; MAX_DATAGRAM];
        while !stop.load(Ordering::Acquire) {
            let (len, from) = match socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::Interrupted =>
                {
                    continue
                }
                Err(e) => {
                    warn!(err = %e, "UDP receive failed.");
                    thread::sleep(POLL_INTERVAL);
                    continue;
                }
            };

            debug!(from = %from, len, "Datagram received.");
            let callback = callback.lock().clone();
            if let Some(callback) = callback {
                callback(&PeerAddress::Socket(from), &buf[..len]);
            }
        }
        info!("UDP receiver stopped.");
    }
}

impl super::Transport for Transport {
    fn broadcast(&self, payload: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(payload, self.destination)?;
        if sent != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, payload.len()),
            ));
        }
        Ok(())
    }

    fn register_receiver(&self, callback: ReceiveCallback) -> io::Result<()> {
        *self.callback.lock() = Some(callback);

        if !self.receiving.swap(true, Ordering::AcqRel) {
            let socket = self.socket.try_clone()?;
            let callback = self.callback.clone();
            let stop = self.stop.clone();
            thread::Builder::new()
                .name("udp-receiver".to_string())
                .spawn(move || Transport::receive_loop(socket, callback, stop))?;
        }
        Ok(())
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (UDP)", self.destination)
    }
}
