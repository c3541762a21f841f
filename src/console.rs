//! # Console Interface Module
//!
//! Interactive terminal front end for the IC emulator, running the engine on
//! a simulated pin bank.
//!
//! ## Features
//! - Live pin diagram of the selected package
//! - Gate output indicators
//! - Protocol command bar (`IC:7400`, `PINS:...`, `LIST`, ...)
//! - F1..F8 act as the eight physical push buttons, F9 pulses the clock

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{ConsoleConfig, BUTTON_COUNT};
use crate::dispatcher::Dispatcher;
use crate::evaluator::gate_outputs;
use crate::mapper::ButtonTarget;
use crate::pin::{PinRole, SimulatedPinBank};
use crate::session::Session;
use crate::transport::MemoryTransport;

/// Console UI application state
pub struct ConsoleApp {
    dispatcher: Dispatcher<SimulatedPinBank>,
    config: ConsoleConfig,
    link: MemoryTransport,
    running: bool,
    command_buffer: String,
    show_help: bool,
    log_lines: VecDeque<String>,
    release_at: [Option<Instant>; BUTTON_COUNT],
}

impl ConsoleApp {
    pub fn new(mut dispatcher: Dispatcher<SimulatedPinBank>, config: ConsoleConfig) -> Self {
        let link = MemoryTransport::new("console");
        dispatcher.attach_transport(Box::new(link.clone()));
        Self {
            dispatcher,
            config,
            link,
            running: false,
            command_buffer: String::new(),
            show_help: false,
            log_lines: VecDeque::new(),
            release_at: [None; BUTTON_COUNT],
        }
    }

    pub fn session(&self) -> &Session {
        self.dispatcher.session()
    }

    pub fn log_lines(&self) -> impl Iterator<Item = &String> {
        self.log_lines.iter()
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.running = true;
        let refresh = Duration::from_millis(self.config.refresh_rate_ms);
        let mut last_draw: Option<Instant> = None;

        while self.running {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        if key.code == KeyCode::Char('c')
                            && key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            self.running = false;
                        } else {
                            self.handle_key_event(key.code);
                        }
                    }
                }
            }

            self.step(Instant::now());

            let now = Instant::now();
            if last_draw.map_or(true, |t| now.duration_since(t) >= refresh) {
                terminal.draw(|f| self.draw_ui(f))?;
                last_draw = Some(now);
            }

            thread::sleep(Duration::from_millis(1));
        }

        disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;
        terminal
            .show_cursor()
            .map_err(|e| format!("Failed to show cursor: {}", e))?;

        Ok(())
    }

    /// Release expired button presses, run one engine pass and collect
    /// whatever it sent to the console.
    pub fn step(&mut self, now: Instant) {
        for button in 0..BUTTON_COUNT {
            if let Some(deadline) = self.release_at[button] {
                if now >= deadline {
                    let pin = self.dispatcher.board().button_pins[button];
                    self.dispatcher.driver_mut().release_external(pin);
                    self.release_at[button] = None;
                }
            }
        }

        self.dispatcher.tick(now);

        for line in self.link.take_sent() {
            self.push_log(line);
        }
    }

    /// Hold a simulated button down for the configured time.
    pub fn press_button(&mut self, button: usize, now: Instant) {
        if button >= BUTTON_COUNT {
            return;
        }
        let pin = self.dispatcher.board().button_pins[button];
        self.dispatcher.driver_mut().set_external(pin, false);
        self.release_at[button] = Some(now + Duration::from_millis(self.config.button_hold_ms));
        debug!("Button {} pressed (pin {})", button + 1, pin);
    }

    /// Queue a protocol line as if it arrived from a client.
    pub fn submit(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.push_log(format!("> {}", line));
        self.link.push_line(line);
    }

    fn push_log(&mut self, line: String) {
        self.log_lines.push_back(line);
        while self.log_lines.len() > self.config.max_log_lines {
            self.log_lines.pop_front();
        }
    }

    fn handle_key_event(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.running = false;
                }
            }
            KeyCode::Tab => self.show_help = !self.show_help,
            KeyCode::F(n) if (1..=BUTTON_COUNT as u8).contains(&n) => {
                self.press_button(n as usize - 1, Instant::now());
            }
            KeyCode::F(9) => self.submit("CLOCK:PULSE"),
            KeyCode::F(10) => self.submit("LIST"),
            KeyCode::Backspace => {
                self.command_buffer.pop();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.command_buffer);
                match line.trim() {
                    "quit" | "exit" => self.running = false,
                    _ => self.submit(&line),
                }
            }
            KeyCode::Char(c) => {
                if c.is_ascii_graphic() {
                    self.command_buffer.push(c);
                }
            }
            _ => debug!("Unhandled key pressed: {:?}", key),
        }
    }

    fn draw_ui(&self, f: &mut Frame) {
        let size = f.size();

        if self.show_help {
            self.draw_help_screen(f);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(8),
                Constraint::Length(3),
            ])
            .split(size);

        let selected = match self.session().profile() {
            Some(profile) => format!("Selected: {}  {}", profile.name, profile.description),
            None => "Selected: none (type IC:<name>, LIST for the catalog)".to_string(),
        };
        let title_text = vec![
            Line::from(vec![
                Span::styled(
                    "IC Emulator Console",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(selected),
            ]),
            Line::from(vec![
                Span::styled("F1-F8", Style::default().fg(Color::Yellow)),
                Span::raw("=buttons, "),
                Span::styled("F9", Style::default().fg(Color::Yellow)),
                Span::raw("=clock, "),
                Span::styled("Tab", Style::default().fg(Color::Yellow)),
                Span::raw("=help, "),
                Span::styled("Esc", Style::default().fg(Color::Yellow)),
                Span::raw("=quit"),
            ]),
        ];
        let title = Paragraph::new(title_text)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        f.render_widget(title, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        self.draw_package(f, content_chunks[0]);
        self.draw_gates(f, content_chunks[1]);

        self.draw_log(f, chunks[2]);

        let command_text = if self.command_buffer.is_empty() {
            "Enter command (IC:7400, PINS:..., STATUS, LIST, SYNC, CLOCK:PULSE)..."
        } else {
            &self.command_buffer
        };
        let command_bar = Paragraph::new(command_text)
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Command"));
        f.render_widget(command_bar, chunks[3]);
    }

    fn draw_help_screen(&self, f: &mut Frame) {
        let size = f.size();
        let entry = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(key, Style::default().fg(Color::Yellow)),
                Span::raw(text),
            ])
        };
        let help_text = vec![
            Line::from(vec![Span::styled(
                "IC Emulator Console Help",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Commands:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            entry("  IC:<name>", " - Select an IC from the catalog"),
            entry("  PINS:<bits>", " - Set input pins, one bit per connected pin"),
            entry("  STATUS", " - Show the selected IC"),
            entry("  LIST", " - List the catalog"),
            entry("  CLOCK:PULSE", " - Pulse the clock pin"),
            entry("  SYNC", " - Connection check"),
            entry("  quit", " - Exit"),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Keys:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            entry("  F1..F8", " - Press push button 1..8"),
            entry("  F9", " - Clock pulse"),
            entry("  F10", " - List the catalog"),
            entry("  Tab", " - Show/hide this help"),
            entry("  Esc, Ctrl+C", " - Exit"),
        ];

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, size);
    }

    fn draw_package(&self, f: &mut Frame, area: Rect) {
        let session = self.session();
        let lines = match session.profile() {
            Some(profile) => dip_rows(profile.pin_count())
                .into_iter()
                .map(|(left, right)| {
                    let (l_label, l_level) = pin_cell(session, left);
                    let (r_label, r_level) = right
                        .map(|pin| pin_cell(session, pin))
                        .unwrap_or((String::new(), ' '));
                    let r_number = right.map(|pin| pin.to_string()).unwrap_or_default();
                    Line::from(vec![
                        Span::raw(format!("{:>2} {:<5}", left, l_label)),
                        Span::styled(format!(" {} ", l_level), level_style(l_level)),
                        Span::raw("|      | "),
                        Span::styled(format!("{} ", r_level), level_style(r_level)),
                        Span::raw(format!("{:>5} {:<2}", r_label, r_number)),
                    ])
                })
                .collect(),
            None => vec![Line::from("No IC selected")],
        };

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Package"));
        f.render_widget(widget, area);
    }

    fn draw_gates(&self, f: &mut Frame, area: Rect) {
        let session = self.session();
        let mut lines = Vec::new();
        if let Some(profile) = session.profile() {
            let outputs = gate_outputs(profile, session.pin_values());
            if outputs.is_empty() {
                lines.push(Line::from("No gates modelled, raw pin I/O"));
            }
            for (gate, on) in profile.gates.iter().zip(outputs) {
                let led = if on { "●" } else { "○" };
                let style = if on {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", led), style),
                    Span::raw(gate.to_string()),
                ]));
            }
            lines.push(Line::from(""));
            for button in 0..BUTTON_COUNT {
                let target = match session.pin_map().button_target(button) {
                    ButtonTarget::Toggle(pin) => format!("toggles pin {}", pin),
                    ButtonTarget::Clock(pin) => format!("clocks pin {}", pin),
                    ButtonTarget::Unbound => "unused".to_string(),
                };
                lines.push(Line::from(format!("F{}  {}", button + 1, target)));
            }
        }

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Gates"))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }

    fn draw_log(&self, f: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.log_lines.len().saturating_sub(visible);
        let lines: Vec<Line> = self
            .log_lines
            .iter()
            .skip(skip)
            .map(|l| Line::from(l.as_str()))
            .collect();
        let widget =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(widget, area);
    }
}

/// Pin pairs per row of a DIP drawing: pin 1 top left, counting down the
/// left side and back up the right. An odd pin count leaves the last row
/// with a left pin only.
fn dip_rows(pin_count: usize) -> Vec<(u8, Option<u8>)> {
    let left = (pin_count + 1) / 2;
    (0..left)
        .map(|i| {
            let right = pin_count - i;
            let right = (right > left).then_some(right as u8);
            ((i + 1) as u8, right)
        })
        .collect()
}

fn pin_cell(session: &Session, position: u8) -> (String, char) {
    let Some(spec) = session.profile().and_then(|p| p.pin(position)) else {
        return (String::new(), ' ');
    };
    let label = if spec.label.is_empty() {
        spec.role.tag().to_string()
    } else {
        spec.label.clone()
    };
    let level = match spec.role {
        PinRole::NotConnected => '-',
        _ if session.pin_values().get(position) => '1',
        _ => '0',
    };
    (label, level)
}

fn level_style(level: char) -> Style {
    match level {
        '1' => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        '0' => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::DarkGray),
    }
}

/// Public interface for launching the console
pub fn run_console(
    dispatcher: Dispatcher<SimulatedPinBank>,
    config: ConsoleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ConsoleApp::new(dispatcher, config);
    app.run()
}
