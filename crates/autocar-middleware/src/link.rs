//! Single-session joystick link over TCP.
//!
//! [`JoystickListener`] binds the endpoint with a backlog of one and hands
//! out exactly one [`JoystickLink`]: accepting consumes the listener, so no
//! second session can connect.
//!
//! The link is polled once per control tick.  Each poll waits at most the
//! configured read timeout and reports one of three outcomes as a
//! [`LinkEvent`]: nothing arrived, data arrived (and how many records were
//! applied or rejected), or the remote end closed the session.

use std::net::SocketAddr;
use std::time::Duration;

use autocar_types::{AutocarError, JoystickState, JoystickUpdate};
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, warn};

use crate::wire::{RecordFramer, parse_record};

/// Port the remote joystick relay connects to.
pub const DEFAULT_PORT: u16 = 5005;

/// Largest chunk read per poll.
const READ_CHUNK: usize = 1024;

/// Outcome of one [`JoystickLink::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The read timed out; nothing changed this tick.
    Idle,
    /// Bytes arrived.  `applied` records updated the state, `rejected`
    /// records were discarded.
    Data { applied: usize, rejected: usize },
    /// The remote end closed the session.  Every later poll returns this.
    Closed,
}

/// Record counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    pub applied: usize,
    pub rejected: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Listener
// ────────────────────────────────────────────────────────────────────────────

/// A bound, listening endpoint that will accept one joystick session.
pub struct JoystickListener {
    listener: TcpListener,
}

impl JoystickListener {
    /// Bind `addr` with a listen backlog of one.  Must be called from within
    /// a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::Link`] if the socket cannot be created or bound.
    pub fn bind(addr: SocketAddr) -> Result<Self, AutocarError> {
        let bind_err = |e: std::io::Error| AutocarError::Link(format!("cannot bind {addr}: {e}"));
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        let listener = socket.listen(1).map_err(bind_err)?;
        info!(%addr, "joystick listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AutocarError> {
        self.listener
            .local_addr()
            .map_err(|e| AutocarError::Link(format!("listener has no local address: {e}")))
    }

    /// Wait for the remote relay, then close the listener.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::Link`] if accepting fails.
    pub async fn accept(
        self,
        read_timeout: Duration,
    ) -> Result<JoystickLink<TcpStream>, AutocarError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(|e| AutocarError::Link(format!("accept failed: {e}")))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "could not disable Nagle on joystick session");
        }
        Ok(JoystickLink::new(stream, peer.to_string(), read_timeout))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Link
// ────────────────────────────────────────────────────────────────────────────

/// One joystick session and the [`JoystickState`] it maintains.
///
/// Generic over the byte stream so the same code runs over TCP in
/// production and over in-memory pipes in tests.
pub struct JoystickLink<S> {
    stream: S,
    peer: String,
    connected_at: DateTime<Utc>,
    read_timeout: Duration,
    framer: RecordFramer,
    state: JoystickState,
    stats: LinkStats,
    closed: bool,
}

impl<S: AsyncRead + Unpin> JoystickLink<S> {
    /// Start a session on `stream` with the joystick at rest.
    pub fn new(stream: S, peer: impl Into<String>, read_timeout: Duration) -> Self {
        let peer = peer.into();
        info!(%peer, "joystick session established");
        Self {
            stream,
            peer,
            connected_at: Utc::now(),
            read_timeout,
            framer: RecordFramer::new(),
            state: JoystickState::default(),
            stats: LinkStats::default(),
            closed: false,
        }
    }

    /// Latest joystick state.
    pub fn state(&self) -> JoystickState {
        self.state
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Wait up to the read timeout for bytes and apply every complete record.
    ///
    /// Malformed records are logged and dropped; they never change the state
    /// or end the session.
    ///
    /// # Errors
    ///
    /// Returns [`AutocarError::Link`] for I/O failures other than timeout,
    /// reset, or orderly close.
    pub async fn poll(&mut self) -> Result<LinkEvent, AutocarError> {
        if self.closed {
            return Ok(LinkEvent::Closed);
        }
        let mut chunk = [0u8; READ_CHUNK];
        let read = match tokio::time::timeout(self.read_timeout, self.stream.read(&mut chunk)).await
        {
            Err(_elapsed) => return Ok(LinkEvent::Idle),
            Ok(read) => read,
        };
        match read {
            Ok(0) => {
                self.mark_closed();
                Ok(LinkEvent::Closed)
            }
            Ok(n) => {
                let (applied, rejected) = self.ingest(&chunk[..n]);
                Ok(LinkEvent::Data { applied, rejected })
            }
            Err(e) => match e.kind() {
                std::io::ErrorKind::WouldBlock
                | std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::Interrupted => Ok(LinkEvent::Idle),
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => {
                    warn!(peer = %self.peer, error = %e, "joystick session dropped");
                    self.mark_closed();
                    Ok(LinkEvent::Closed)
                }
                _ => Err(AutocarError::Link(format!("read from {} failed: {e}", self.peer))),
            },
        }
    }

    fn ingest(&mut self, bytes: &[u8]) -> (usize, usize) {
        let mut applied = 0;
        let mut rejected = 0;
        for framed in self.framer.push(bytes) {
            match framed.and_then(|line| parse_record(&line)) {
                Ok(update) => {
                    self.state.apply(&update);
                    applied += 1;
                }
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "malformed joystick record dropped");
                    rejected += 1;
                }
            }
        }
        self.stats.applied += applied;
        self.stats.rejected += rejected;
        (applied, rejected)
    }

    fn mark_closed(&mut self) {
        self.closed = true;
        // The switch is momentary: nobody is pressing it once the relay is gone.
        self.state.apply(&JoystickUpdate {
            switch: Some(false),
            ..JoystickUpdate::default()
        });
        let duration_s = (Utc::now() - self.connected_at).num_milliseconds() as f64 / 1000.0;
        info!(
            peer = %self.peer,
            applied = self.stats.applied,
            rejected = self.stats.rejected,
            duration_s,
            "joystick session ended"
        );
    }
}
