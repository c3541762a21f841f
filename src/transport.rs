//! Line-oriented channels to the control surfaces, plus the status sink
//! capability.
//!
//! Physical framing (USB serial reassembly, Bluetooth passthrough, display
//! terminator bytes) stays inside each implementation; the dispatcher only
//! ever sees complete text lines.

use log::{debug, info};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub trait Transport: Send {
    fn name(&self) -> &str;

    /// Next complete line, if one is waiting. Must not block.
    fn poll_line(&mut self) -> Option<String>;

    fn send_line(&mut self, line: &str);

    /// A closed transport is detached by the dispatcher.
    fn is_open(&self) -> bool {
        true
    }
}

/// Receives gate outputs whenever the pin levels change.
pub trait StatusSink: Send {
    fn publish(&mut self, ic: &str, gate_outputs: &[bool]);
}

#[derive(Debug, Default)]
struct MemoryInner {
    incoming: VecDeque<String>,
    sent: Vec<String>,
    open: bool,
}

/// Queue-backed transport. Clones share the same queues, so one clone can be
/// handed to the dispatcher while another injects lines and inspects output.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    name: String,
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryTransport {
    pub fn new(name: &str) -> Self {
        MemoryTransport {
            name: name.to_string(),
            inner: Arc::new(Mutex::new(MemoryInner {
                open: true,
                ..MemoryInner::default()
            })),
        }
    }

    pub fn push_line(&self, line: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.incoming.push_back(line.to_string());
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.sent.clone())
            .unwrap_or_default()
    }

    pub fn take_sent(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|mut inner| std::mem::take(&mut inner.sent))
            .unwrap_or_default()
    }

    pub fn close(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.open = false;
        }
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll_line(&mut self) -> Option<String> {
        self.inner.lock().ok()?.incoming.pop_front()
    }

    fn send_line(&mut self, line: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.sent.push(line.to_string());
        }
    }

    fn is_open(&self) -> bool {
        self.inner.lock().map(|inner| inner.open).unwrap_or(false)
    }
}

/// Transport backed by a pair of tokio channels, one per network client.
pub struct ChannelTransport {
    name: String,
    incoming: UnboundedReceiver<String>,
    outgoing: UnboundedSender<String>,
    open: bool,
}

impl ChannelTransport {
    pub fn new(
        name: String,
        incoming: UnboundedReceiver<String>,
        outgoing: UnboundedSender<String>,
    ) -> Self {
        ChannelTransport {
            name,
            incoming,
            outgoing,
            open: true,
        }
    }
}

impl Transport for ChannelTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll_line(&mut self) -> Option<String> {
        match self.incoming.try_recv() {
            Ok(line) => Some(line),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty) => None,
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected) => {
                self.open = false;
                None
            }
        }
    }

    fn send_line(&mut self, line: &str) {
        if self.outgoing.send(line.to_string()).is_err() {
            debug!("{}: client gone, dropping '{}'", self.name, line);
            self.open = false;
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Plain text console on stdin/stdout.
pub struct StdioTransport {
    lines: mpsc::Receiver<String>,
    open: bool,
}

impl StdioTransport {
    /// Starts a reader thread that forwards stdin lines.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        StdioTransport {
            lines: rx,
            open: true,
        }
    }
}

impl Transport for StdioTransport {
    fn name(&self) -> &str {
        "stdio"
    }

    fn poll_line(&mut self) -> Option<String> {
        match self.lines.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.open = false;
                None
            }
        }
    }

    fn send_line(&mut self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Status sink that reports gate outputs through the log.
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn publish(&mut self, ic: &str, gate_outputs: &[bool]) {
        let leds: String = gate_outputs
            .iter()
            .map(|on| if *on { '1' } else { '0' })
            .collect();
        info!("{} gate outputs: {}", ic, leds);
    }
}
