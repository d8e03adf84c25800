use crate::grid::{GridCell, GridGeometry};
use crate::pattern::GestureSequence;
use crate::session::{Mode, ModeSelection, Outcome, PatternSession, WorkflowState};
use crate::store::CredentialStore;
use crate::trail::Trail;
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine},
        Block, Borders, Paragraph,
    },
    Frame, Terminal,
};
use std::io;
use tracing::{error, warn};

/// How the grid is tinted after a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Right,
    Wrong,
}

impl Tone {
    fn color(&self) -> Color {
        match self {
            Tone::Neutral => Color::Gray,
            Tone::Right => Color::Green,
            Tone::Wrong => Color::Red,
        }
    }
}

pub struct App<S> {
    pub session: PatternSession<S>,
    pub geometry: GridGeometry,
    /// Terminal cells the grid was last drawn into
    pub grid_area: Rect,
    /// Pointer position in surface coordinates while dragging
    pub pointer: Option<(f64, f64)>,
    /// Finished gesture kept on screen until the next one starts
    pub shown: GestureSequence,
    pub tone: Tone,
    pub message: String,
    pub last_outcome: Option<Outcome>,
    dragging: bool,
}

impl<S: CredentialStore> App<S> {
    pub fn new(session: PatternSession<S>, geometry: GridGeometry) -> Self {
        let message = prompt_for(session.state()).to_string();
        Self {
            session,
            geometry,
            grid_area: Rect::default(),
            pointer: None,
            shown: GestureSequence::new(),
            tone: Tone::Neutral,
            message,
            last_outcome: None,
            dragging: false,
        }
    }

    /// Map a terminal cell to surface coordinates, or `None` outside the grid
    pub fn to_surface(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.grid_area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }

        let extent = self.geometry.surface_extent();
        let x = (f64::from(column - area.x) + 0.5) / f64::from(area.width) * extent;
        let y = (f64::from(row - area.y) + 0.5) / f64::from(area.height) * extent;
        Some((x, y))
    }

    fn cell_at(&self, pointer: Option<(f64, f64)>) -> Option<GridCell> {
        pointer.and_then(|(x, y)| self.geometry.locate(x, y))
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        let pointer = self.to_surface(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // Gestures only begin on the grid itself
                if pointer.is_none() {
                    return Ok(());
                }
                self.dragging = true;
                self.pointer = pointer;
                self.shown.clear();
                self.tone = Tone::Neutral;
                self.session.on_gesture_start(self.cell_at(pointer));
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                self.pointer = pointer;
                self.session.on_gesture_move(self.cell_at(pointer));
            }
            MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                self.end_gesture()?;
            }
            _ => {}
        }

        Ok(())
    }

    fn end_gesture(&mut self) -> Result<()> {
        self.dragging = false;
        self.pointer = None;
        self.shown = self.session.sequence().clone();

        let outcome = self.session.on_gesture_end()?;
        self.tone = if outcome.is_success() { Tone::Right } else { Tone::Wrong };
        self.message = outcome_message(outcome).to_string();
        self.last_outcome = Some(outcome);
        Ok(())
    }

    pub fn select_mode(&mut self, mode: Mode) -> Result<()> {
        self.dragging = false;
        self.pointer = None;
        self.shown.clear();
        self.tone = Tone::Neutral;

        let selection = self.session.select_mode(mode)?;
        self.message = match selection {
            ModeSelection::CredentialRequired => {
                warn!("verify requested without a stored pattern");
                "Set a pattern first".to_string()
            }
            _ => prompt_for(self.session.state()).to_string(),
        };
        Ok(())
    }

    /// Returns `false` when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Char('s') => self.select_mode(Mode::Set)?,
            KeyCode::Char('v') => self.select_mode(Mode::Verify)?,
            KeyCode::Tab => {
                let next = match self.session.active_mode() {
                    Mode::Set => Mode::Verify,
                    Mode::Verify => Mode::Set,
                };
                self.select_mode(next)?;
            }
            _ => {}
        }
        Ok(true)
    }
}

fn prompt_for(state: &WorkflowState) -> &'static str {
    match state {
        WorkflowState::AwaitingFirstEntry => "Draw a new unlock pattern",
        WorkflowState::AwaitingConfirmation { .. } => "Draw the pattern again to confirm",
        WorkflowState::AwaitingVerification => "Draw your unlock pattern",
    }
}

pub fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::TooShort => "Pattern too short (at least 4 points), try again",
        Outcome::ConfirmationPending => "Draw the pattern again to confirm",
        Outcome::ConfirmationMismatch { credential_set: false } => {
            "Patterns did not match, start over"
        }
        Outcome::ConfirmationMismatch { credential_set: true } => {
            "Patterns did not match, start over (previous pattern still active)"
        }
        Outcome::CredentialSaved => "Pattern saved",
        Outcome::VerifyMatch => "Pattern correct",
        Outcome::VerifyMismatch => "Pattern incorrect",
    }
}

pub fn run_ui<S: CredentialStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "ui loop failed");
    }

    res
}

fn run_app<B: ratatui::backend::Backend, S: CredentialStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                if !app.handle_key(key)? {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse)?,
            _ => {}
        }
    }
}

fn ui<S: CredentialStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Mode header
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_grid(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header<S: CredentialStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let active = app.session.active_mode();

    let mut tab_spans = vec![];
    for (i, (mode, name)) in [(Mode::Set, "Set pattern"), (Mode::Verify, "Verify pattern")]
        .iter()
        .enumerate()
    {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *mode == active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(*name, style));
    }

    let header = Paragraph::new(Line::from(tab_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Gesture Lock "));
    f.render_widget(header, area);
}

/// Largest area that looks square, given terminal cells about twice as tall as wide
fn square_area(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_grid<S: CredentialStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let outer = square_area(area);
    let block = Block::default().borders(Borders::ALL);
    app.grid_area = block.inner(outer);

    let geometry = app.geometry;
    let extent = geometry.surface_extent();
    let radius = geometry.cell_diameter() / 2.0;

    // A live gesture is drawn neutral; a finished one keeps its verdict color
    let (visited, tone) = if app.dragging {
        (app.session.sequence(), Tone::Neutral)
    } else {
        (&app.shown, app.tone)
    };
    let trail = Trail::build(&geometry, visited, app.pointer);
    let color = tone.color();

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, extent])
        .y_bounds([0.0, extent])
        .paint(|ctx| {
            for cell in GridCell::all() {
                let (x, y) = geometry.center(cell);
                ctx.draw(&Circle {
                    x,
                    y: extent - y,
                    radius: radius * 0.9,
                    color,
                });
                if visited.contains(cell) {
                    for scale in [0.5, 0.35, 0.2] {
                        ctx.draw(&Circle {
                            x,
                            y: extent - y,
                            radius: radius * scale,
                            color,
                        });
                    }
                }
            }
            for segment in trail.segments() {
                ctx.draw(&CanvasLine {
                    x1: segment.from.0,
                    y1: extent - segment.from.1,
                    x2: segment.to.0,
                    y2: extent - segment.to.1,
                    color,
                });
            }
        });

    f.render_widget(canvas, outer);
}

fn render_status_bar<S: CredentialStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let message_style = match app.tone {
        Tone::Neutral => Style::default().fg(Color::White),
        tone => Style::default().fg(tone.color()).add_modifier(Modifier::BOLD),
    };

    let status = Line::from(vec![
        Span::styled(app.message.as_str(), message_style),
        Span::raw("  │  "),
        Span::styled(
            "s: set  v: verify  Tab: switch  q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let bar = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}
