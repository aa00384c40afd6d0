//! UDP input listener.
//!
//! A background thread receives input datagrams, drops anything that is
//! not a well-formed input message and queues the rest in a bounded FIFO.
//! When the queue is full the oldest message is dropped. The most recent
//! message is also kept aside so a consumer can keep stepping on it while
//! no new input arrives, for at most the cached message lifetime.

use crate::error::ServiceError;
use heapless::Deque;
use rtw_common::consts::{INPUT_QUEUE_DEPTH, MAX_DATAGRAM_SIZE};
use rtw_common::model::InputRecord;
use rtw_common::wire::{TransportHeader, TransportMessage, WireError};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Socket read timeout; bounds how long `shutdown()` waits for the thread.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// A received input message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputMessage {
    /// Transport header as sent.
    pub header: TransportHeader,
    /// Decoded input record.
    pub record: InputRecord,
    /// Local arrival time.
    pub received_at: Instant,
}

impl InputMessage {
    /// Decode an input datagram.
    ///
    /// # Errors
    /// Returns `WireError` for short datagrams and non-input message types.
    pub fn decode(data: &[u8]) -> Result<Self, WireError> {
        let tr = TransportMessage::parse(data)?;
        let record = tr.convert::<InputRecord>()?;
        Ok(Self {
            header: tr.header,
            record,
            received_at: Instant::now(),
        })
    }
}

struct ListenerState {
    queue: Deque<InputMessage, INPUT_QUEUE_DEPTH>,
    last: Option<InputMessage>,
    dropped: u64,
    rejected: u64,
}

struct Shared {
    state: Mutex<ListenerState>,
    ready: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(ListenerState {
                queue: Deque::new(),
                last: None,
                dropped: 0,
                rejected: 0,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListenerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ingest(&self, data: &[u8]) -> Result<(), WireError> {
        let message = match InputMessage::decode(data) {
            Ok(m) => m,
            Err(e) => {
                self.lock().rejected += 1;
                return Err(e);
            }
        };
        trace!("TR message: {}", message.header);

        let mut state = self.lock();
        if state.queue.is_full() {
            state.queue.pop_front();
            state.dropped += 1;
            debug!("Input queue full, dropped oldest message");
        }
        // Cannot fail: a slot was freed above.
        let _ = state.queue.push_back(message);
        state.last = Some(message);
        drop(state);

        self.ready.notify_one();
        Ok(())
    }

    /// Wait up to `timeout` for the queue to hold a message.
    fn wait_non_empty(&self, timeout: Duration) -> MutexGuard<'_, ListenerState> {
        let guard = self.lock();
        let (guard, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |s| s.queue.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        guard
    }
}

/// Background UDP receiver feeding a bounded input queue.
pub struct UdpListener {
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    local_addr: SocketAddr,
    lifetime: Duration,
    handle: Option<JoinHandle<()>>,
}

impl UdpListener {
    /// Bind `addr` and start the receive thread.
    ///
    /// `lifetime` bounds how long [`UdpListener::last`] may return the
    /// last message again once the queue is empty.
    ///
    /// # Errors
    /// Returns `ServiceError::Io` if the socket cannot be bound or the
    /// thread cannot be spawned.
    pub fn bind(addr: &str, lifetime: Duration) -> Result<Self, ServiceError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(RECV_TIMEOUT))?;
        let local_addr = socket.local_addr()?;
        info!("Listen on {}", local_addr);

        let shared = Arc::new(Shared::new());
        let running = Arc::new(AtomicBool::new(true));

        let handle = std::thread::Builder::new()
            .name("rtw-listener".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                let running = Arc::clone(&running);
                move || receive_loop(socket, shared, running)
            })?;

        Ok(Self {
            shared,
            running,
            local_addr,
            lifetime,
            handle: Some(handle),
        })
    }

    /// Feed one datagram as if it had been received.
    ///
    /// # Errors
    /// Returns `WireError` if the datagram is not a valid input message.
    pub fn ingest(&self, data: &[u8]) -> Result<(), WireError> {
        self.shared.ingest(data)
    }

    /// Pop the oldest queued message, waiting up to `timeout`.
    pub fn first(&self, timeout: Duration) -> Option<InputMessage> {
        self.shared.wait_non_empty(timeout).queue.pop_front()
    }

    /// Pop the newest queued message.
    ///
    /// With `cached` set and an empty queue, the last received message is
    /// returned again while it is younger than the cached message
    /// lifetime. Otherwise waits up to `timeout` for a new message.
    pub fn last(&self, cached: bool, timeout: Duration) -> Option<InputMessage> {
        if cached {
            let state = self.shared.lock();
            if state.queue.is_empty() {
                if let Some(last) = state.last.filter(|m| m.received_at.elapsed() <= self.lifetime) {
                    return Some(last);
                }
            }
        }
        self.shared.wait_non_empty(timeout).queue.pop_back()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Returns `true` if no message is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once any valid message has arrived.
    pub fn is_message_received(&self) -> bool {
        self.shared.lock().last.is_some()
    }

    /// Returns `true` if the last message is older than the cached message
    /// lifetime, or none has arrived.
    pub fn is_cached_message_out_of_date(&self) -> bool {
        self.shared
            .lock()
            .last
            .is_none_or(|m| m.received_at.elapsed() > self.lifetime)
    }

    /// Messages dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }

    /// Datagrams rejected as malformed or of the wrong type.
    pub fn rejected(&self) -> u64 {
        self.shared.lock().rejected
    }

    /// Bound socket address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the receive thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Listener thread panicked");
            }
            info!("Listener on {} stopped", self.local_addr);
        }
    }
}

impl Drop for UdpListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn receive_loop(socket: UdpSocket, shared: Arc<Shared>, running: Arc<AtomicBool>) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    while running.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buf) {
            Ok((len, peer)) => {
                trace!("Packet: {} Size: {}", peer, len);
                if let Err(e) = shared.ingest(&buf[..len]) {
                    warn!("Dropped datagram from {}: {}", peer, e);
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                error!("Listener receive failed: {}", e);
                break;
            }
        }
    }
}
