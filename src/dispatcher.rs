//! # Command Dispatcher
//!
//! Owns the [`Session`] and is the only place it is mutated. Every transport
//! feeds the same dispatcher, so a command behaves identically whichever
//! channel it arrived on, and every state change is pushed back out to all
//! of them.
//!
//! ```rust
//! use rusty_ic::catalog::IcRegistry;
//! use rusty_ic::config::EmulatorConfig;
//! use rusty_ic::dispatcher::Dispatcher;
//! use rusty_ic::pin::SimulatedPinBank;
//!
//! let registry = IcRegistry::builtin().expect("catalog");
//! let config = EmulatorConfig::default();
//! let mut dispatcher = Dispatcher::new(registry, SimulatedPinBank::new(), &config);
//! let replies = dispatcher.execute("IC:7400", None);
//! assert_eq!(replies[0], "OK:IC_SELECTED:7400,PINS=14,GATES=4,INPUTS=8");
//! assert_eq!(dispatcher.execute("PINS:11000000000000", None), vec!["OK:PINS_SET"]);
//! assert_eq!(dispatcher.session().active_bits(), "11000101001001");
//! ```

use crate::catalog::IcRegistry;
use crate::clock::PulseGenerator;
use crate::config::{BoardLayout, EmulatorConfig};
use crate::error::EngineError;
use crate::evaluator::{evaluate, gate_outputs};
use crate::input::{read_buttons, sample_buttons, write_bits, ButtonEvent};
use crate::mapper::{check_fits, configure_buttons, configure_pins, write_levels, PinMap};
use crate::pin::PinDriver;
use crate::protocol::{self, Command};
use crate::session::Session;
use crate::transport::{StatusSink, Transport};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

pub struct Dispatcher<D: PinDriver> {
    registry: IcRegistry,
    session: Session,
    driver: D,
    board: BoardLayout,
    pulser: PulseGenerator,
    debounce: Duration,
    status_interval: Duration,
    last_status: Option<Instant>,
    transports: Vec<Box<dyn Transport>>,
    sinks: Vec<Box<dyn StatusSink>>,
}

impl<D: PinDriver> Dispatcher<D> {
    pub fn new(registry: IcRegistry, mut driver: D, config: &EmulatorConfig) -> Self {
        configure_buttons(&config.board, &mut driver);
        Dispatcher {
            registry,
            session: Session::new(),
            driver,
            board: config.board.clone(),
            pulser: PulseGenerator::new(config.clock_settle()),
            debounce: config.debounce(),
            status_interval: config.status_interval(),
            last_status: None,
            transports: Vec::new(),
            sinks: Vec::new(),
        }
    }

    pub fn attach_transport(&mut self, transport: Box<dyn Transport>) {
        info!("Transport {} attached", transport.name());
        self.transports.push(transport);
    }

    pub fn attach_sink(&mut self, sink: Box<dyn StatusSink>) {
        self.sinks.push(sink);
    }

    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &IcRegistry {
        &self.registry
    }

    pub fn board(&self) -> &BoardLayout {
        &self.board
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Run one command line.
    ///
    /// Replies go to the transport at index `origin` (if any) and are also
    /// returned. A state change is then broadcast to every transport and
    /// sink.
    pub fn execute(&mut self, line: &str, origin: Option<usize>) -> Vec<String> {
        let (replies, changed) = self.handle(line);
        if let Some(transport) = origin.and_then(|i| self.transports.get_mut(i)) {
            for reply in &replies {
                transport.send_line(reply);
            }
        }
        if changed {
            self.broadcast_pins();
        }
        replies
    }

    /// One pass of the cooperative loop: drain every transport, sample the
    /// buttons and emit the periodic status line when due.
    pub fn tick(&mut self, now: Instant) {
        for index in 0..self.transports.len() {
            while let Some(line) = self.transports[index].poll_line() {
                debug!("{} <- {}", self.transports[index].name(), line.trim_end());
                self.execute(&line, Some(index));
            }
        }
        self.transports.retain(|t| {
            if !t.is_open() {
                info!("Transport {} detached", t.name());
            }
            t.is_open()
        });

        self.service_buttons(now);

        if self.session.profile().is_some() {
            match self.last_status {
                None => self.last_status = Some(now),
                Some(last) if now.saturating_duration_since(last) >= self.status_interval => {
                    self.last_status = Some(now);
                    self.broadcast_pins();
                }
                Some(_) => {}
            }
        }
    }

    fn handle(&mut self, line: &str) -> (Vec<String>, bool) {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected line: {}", e);
                return (vec![protocol::error_line(&e)], false);
            }
        };

        match command {
            Command::SelectIc(name) => match self.select_ic(&name) {
                Ok(reply) => (vec![reply], true),
                Err(e) => {
                    warn!("IC selection failed: {}", e);
                    (vec![protocol::error_line(&e)], false)
                }
            },
            Command::SetInputs(bits) => match write_bits(&mut self.session, &bits) {
                Ok(()) => {
                    self.push_levels();
                    (vec![protocol::PINS_SET.to_string()], true)
                }
                Err(e) => {
                    debug!("PINS rejected: {}", e);
                    (vec![protocol::error_line(&e)], false)
                }
            },
            Command::Status => (vec![protocol::status_line(&self.session)], false),
            Command::List => (protocol::list_lines(&self.registry), false),
            Command::ClockPulse => match self.pulse_clock() {
                Some(event) => (vec![event.to_string()], false),
                None => {
                    debug!("CLOCK:PULSE ignored, no clock pin bound");
                    (Vec::new(), false)
                }
            },
            Command::Sync => (vec![protocol::SYNC_OK.to_string()], false),
        }
    }

    fn select_ic(&mut self, name: &str) -> Result<String, EngineError> {
        let profile = self
            .registry
            .find(name)
            .ok_or_else(|| EngineError::IcNotFound(name.to_string()))?;
        check_fits(&profile, &self.board)?;

        configure_pins(&profile, &self.board, &mut self.driver);
        let map = PinMap::for_profile(&profile);
        self.session.reset(profile.clone(), map);
        self.last_status = None;
        evaluate(&profile, &mut self.session.pin_values);
        self.push_levels();

        info!(
            "Configured {} with {} gates, {} input pins mapped to buttons",
            profile.name,
            profile.gate_count(),
            self.session.pin_map().mapped_inputs()
        );
        Ok(protocol::selected_line(&profile, self.session.pin_map()))
    }

    fn pulse_clock(&mut self) -> Option<&'static str> {
        let position = self.session.clock_pin()?;
        let physical = self.board.physical(position)?;
        Some(self.pulser.pulse(&mut self.driver, physical))
    }

    fn service_buttons(&mut self, now: Instant) {
        let pressed = read_buttons(&self.board, &self.driver);
        let events = sample_buttons(&mut self.session, pressed, now, self.debounce);
        if events.is_empty() {
            return;
        }

        let mut toggled = false;
        for event in events {
            match event {
                ButtonEvent::Toggled { .. } => {
                    toggled = true;
                    if let Some(line) = event.describe() {
                        info!("{}", line);
                        self.send_all(&line);
                    }
                }
                ButtonEvent::ClockRequested { .. } => {
                    if let Some(line) = self.pulse_clock() {
                        self.send_all(line);
                    }
                }
            }
        }
        if toggled {
            self.push_levels();
            self.broadcast_pins();
        }
    }

    fn push_levels(&mut self) {
        if let Some(profile) = self.session.profile() {
            write_levels(profile, &self.board, self.session.pin_values(), &mut self.driver);
        }
    }

    fn send_all(&mut self, line: &str) {
        for transport in self.transports.iter_mut() {
            transport.send_line(line);
        }
    }

    /// Push the current pin levels to every transport and status sink.
    pub fn broadcast_pins(&mut self) {
        let Some(profile) = self.session.profile().cloned() else {
            return;
        };
        let line = protocol::pins_line(&self.session.active_bits());
        self.send_all(&line);

        let outputs = gate_outputs(&profile, self.session.pin_values());
        for sink in self.sinks.iter_mut() {
            sink.publish(&profile.name, &outputs);
        }
    }
}
