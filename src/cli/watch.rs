//! Watch command implementation - Interactive TUI viewer.

// CLI watch uses intentional casts for display and timing
#![allow(
    clippy::similar_names,
    clippy::needless_pass_by_value,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use super::{CliError, load_config, seed_or_now};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::collections::VecDeque;
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};
use swarm::autoplay::play_turn;
use swarm::game::{BattleResult, Faction, GameEvent, Outcome, Point, Snapshot, format_clock};
use swarm::{EngineConfig, GameEngine, MapGenError};

/// Events kept in the log panel.
const LOG_LINES: usize = 12;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the map cannot be
/// built, or the terminal fails.
pub(crate) fn execute(
    config_path: Option<&Path>,
    seed: Option<u64>,
    level: Option<usize>,
    manual: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let seed = seed_or_now(seed);
    let app = App::new(config, seed, level, !manual)?;
    run_tui(app)
}

/// App state for the TUI.
struct App {
    engine: GameEngine,
    seed: u64,
    level: Option<usize>,
    autopilot: bool,
    played_turn: u32,
    log: VecDeque<String>,
    last_frame: Instant,
}

impl App {
    fn new(
        config: EngineConfig,
        seed: u64,
        level: Option<usize>,
        autopilot: bool,
    ) -> Result<Self, MapGenError> {
        let mut app = Self {
            engine: GameEngine::new(config, seed),
            seed,
            level,
            autopilot,
            played_turn: 0,
            log: VecDeque::with_capacity(LOG_LINES),
            last_frame: Instant::now(),
        };
        app.restart()?;
        Ok(app)
    }

    fn restart(&mut self) -> Result<(), MapGenError> {
        match self.level {
            Some(level) => self.engine.start_campaign(level)?,
            None => self.engine.start_skirmish()?,
        }
        self.played_turn = 0;
        self.log.clear();
        self.last_frame = Instant::now();
        Ok(())
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let frame_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.autopilot
            && !self.engine.is_paused()
            && self.engine.is_player_turn()
            && self.played_turn != self.engine.turn()
        {
            self.played_turn = self.engine.turn();
            play_turn(&mut self.engine);
        }

        self.engine.frame(frame_delta);

        for event in self.engine.drain_events() {
            if let Some(line) = describe(&event) {
                if self.log.len() == LOG_LINES {
                    self.log.pop_front();
                }
                self.log.push_back(line);
            }
        }
    }

    fn toggle_pause(&mut self) {
        if self.engine.is_paused() {
            self.engine.resume();
        } else {
            self.engine.pause();
        }
    }
}

fn describe(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::GameStarted { territories, .. } => {
            format!("New game on {territories} territories")
        }
        GameEvent::BattleStarted {
            territory,
            attacker,
            defender,
        } => format!("{attacker} attacks {defender} at #{territory}"),
        GameEvent::BattleResolved(report) => match report.result {
            BattleResult::AttackerWins => return None,
            BattleResult::DefenderHolds => {
                format!("{} holds #{}", report.defender, report.territory)
            }
        },
        GameEvent::TerritoryCaptured {
            territory,
            from,
            to,
        } => format!("{to} takes #{territory} from {from}"),
        GameEvent::ConvoyDropped {
            territory, units, ..
        } => format!("{units} units lost at contested #{territory}"),
        GameEvent::GrowthPulse(growth) => format!("Growth: +{} units", growth.units_added),
        GameEvent::TurnStarted { turn, bonus } => format!("Turn {turn} (+{bonus} gold)"),
        GameEvent::GameOver(Outcome::Win) => "Victory!".to_string(),
        GameEvent::GameOver(Outcome::Lose) => "Defeat.".to_string(),
        GameEvent::TransferIssued { .. } => return None,
    };
    Some(line)
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        app.tick();
        let snapshot = app.engine.snapshot();
        terminal
            .draw(|f| ui(f, app, &snapshot))
            .map_err(|e| CliError::new(e.to_string()))?;

        // Handle input with timeout
        if event::poll(Duration::from_millis(16)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Char('e') => {
                    app.engine.end_turn();
                }
                KeyCode::Char('s') => app.engine.toggle_speed(),
                KeyCode::Char('p') => app.engine.toggle_send_percent(),
                KeyCode::Char('f') => app.engine.toggle_formation(),
                KeyCode::Char('b') => {
                    let paused = app.engine.is_battle_paused();
                    app.engine.set_battle_paused(!paused);
                }
                KeyCode::Char('a') => app.autopilot = !app.autopilot,
                KeyCode::Char('r') => app.restart()?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app, snapshot);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_map(f, main_chunks[0], app, snapshot);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[1]);

    render_territories(f, side_chunks[0], snapshot);
    render_log(f, side_chunks[1], app, snapshot);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let status = match snapshot.result {
        Some(Outcome::Win) => "VICTORY",
        Some(Outcome::Lose) => "DEFEAT",
        None if snapshot.paused => "PAUSED",
        None if snapshot.battle_paused => "BATTLES FROZEN",
        None => "RUNNING",
    };

    let title = format!(
        " Swarm | Seed {} | Turn {} ({}) | {} | Gold {} | {}x | Send {}% | {:?} | {} ",
        app.seed,
        snapshot.turn,
        snapshot.phase,
        format_clock(snapshot.elapsed),
        snapshot.gold,
        snapshot.speed,
        snapshot.send_percent,
        snapshot.formation,
        status
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn faction_color(faction: Faction) -> Color {
    match faction {
        Faction::Neutral => Color::DarkGray,
        Faction::Player => Color::Green,
        Faction::Ai(2) => Color::Red,
        Faction::Ai(3) => Color::Blue,
        Faction::Ai(4) => Color::Yellow,
        Faction::Ai(5) => Color::Magenta,
        Faction::Ai(6) => Color::Cyan,
        Faction::Ai(_) => Color::LightRed,
    }
}

/// Character grid the map is drawn into.
struct Canvas {
    cols: usize,
    rows: usize,
    scale_x: f32,
    scale_y: f32,
    cells: Vec<Option<(char, Color)>>,
}

impl Canvas {
    fn new(area: Rect, width: f32, height: f32) -> Self {
        let cols = usize::from(area.width.saturating_sub(2)).max(1);
        let rows = usize::from(area.height.saturating_sub(2)).max(1);
        Self {
            cols,
            rows,
            scale_x: (cols - 1) as f32 / width.max(1.0),
            scale_y: (rows - 1) as f32 / height.max(1.0),
            cells: vec![None; cols * rows],
        }
    }

    fn cell(&self, p: Point) -> (usize, usize) {
        let col = (p.x * self.scale_x).round().clamp(0.0, (self.cols - 1) as f32) as usize;
        let row = (p.y * self.scale_y).round().clamp(0.0, (self.rows - 1) as f32) as usize;
        (col, row)
    }

    fn put(&mut self, col: usize, row: usize, ch: char, color: Color, overwrite: bool) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        let slot = &mut self.cells[row * self.cols + col];
        if overwrite || slot.is_none() {
            *slot = Some((ch, color));
        }
    }

    fn line(&mut self, a: Point, b: Point) {
        let (c0, r0) = self.cell(a);
        let (c1, r1) = self.cell(b);
        let steps = c0.abs_diff(c1).max(r0.abs_diff(r1)).max(1);
        for i in 1..steps {
            let t = i as f32 / steps as f32;
            let (col, row) = self.cell(a.lerp(b, t));
            self.put(col, row, '.', Color::DarkGray, false);
        }
    }

    fn label(&mut self, p: Point, text: &str, color: Color) {
        let (col, row) = self.cell(p);
        let start = col.saturating_sub(text.len() / 2);
        for (i, ch) in text.chars().enumerate() {
            self.put(start + i, row, ch, color, true);
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        self.cells
            .chunks(self.cols)
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|cell| match cell {
                            Some((ch, color)) => {
                                Span::styled(ch.to_string(), Style::default().fg(*color))
                            }
                            None => Span::raw(" "),
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }
}

fn render_map(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let map_config = &app.engine.config().map;
    let mut canvas = Canvas::new(area, map_config.width, map_config.height);

    for t in &snapshot.territories {
        for &n in t.neighbors.iter().filter(|&&n| n > t.id) {
            if let Some(other) = snapshot.territories.get(n) {
                canvas.line(t.position, other.position);
            }
        }
    }

    for c in &snapshot.convoys {
        let (col, row) = canvas.cell(c.position);
        canvas.put(col, row, '*', faction_color(c.owner), true);
    }

    for t in &snapshot.territories {
        let marker = if t.battle.is_some() { "!" } else { "" };
        let text = format!("{}{marker}", t.total);
        canvas.label(t.position, &text, faction_color(t.owner));
    }

    let map_widget = Paragraph::new(canvas.into_lines())
        .block(Block::default().borders(Borders::ALL).title(" Map "));

    f.render_widget(map_widget, area);
}

fn render_territories(f: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let lines: Vec<Line> = snapshot
        .territories
        .iter()
        .map(|t| {
            let units = t.garrison.units;
            let mut spans = vec![
                Span::styled(
                    format!("{:>2} {:<12}", t.id, t.name),
                    Style::default().fg(faction_color(t.owner)),
                ),
                Span::raw(format!(
                    " {:>4} ({}/{}/{})",
                    t.total, units.shield, units.sword, units.archer
                )),
            ];
            if let Some(battle) = t.battle {
                spans.push(Span::styled(
                    format!(" vs {} {}", battle.attacker, battle.attackers.total()),
                    Style::default()
                        .fg(faction_color(battle.attacker))
                        .add_modifier(Modifier::BOLD),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Territories "));

    f.render_widget(widget, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App, snapshot: &Snapshot) {
    let mut lines = vec![Line::from(format!(
        "Owned {}/{}  Convoys {}  Autopilot {}",
        snapshot.owned_by(Faction::Player),
        snapshot.territories.len(),
        snapshot.convoys.len(),
        if app.autopilot { "on" } else { "off" }
    ))];
    lines.extend(app.log.iter().rev().map(|l| Line::from(l.as_str())));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Events "))
        .wrap(Wrap { trim: false });

    f.render_widget(widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.engine.is_game_over() {
        " [q] Quit  [r] Restart "
    } else {
        " [q] Quit  [Space] Pause  [e] End turn  [s] Speed  [p] Send %  [f] Formation  [b] Freeze battles  [a] Autopilot  [r] Restart "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
