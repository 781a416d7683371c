//! Live terminal dashboard: panel menu, status cards and fleet summary.
//!
//! Re-reads the snapshot feed every refresh interval and re-classifies it.
//! Keyboard input drives the [`NavigationController`]; everything else is a
//! fixed layout redrawn with `crossterm`.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use crate::core::errors::DashError;
use crate::feed::loader::FeedSource;
use crate::logger::activity::{ActivityEvent, ActivityLog};
use crate::nav::controller::{NavAction, NavigationController};
use crate::nav::panel::{NAV_ITEMS, PanelId};
use crate::status::classifier::{Classification, StatusCategory, StatusClassifier};
use crate::status::summary::{EquipmentStatus, FleetSummary};

use super::render::gauge;

const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SIDEBAR_WIDTH: u16 = 24;

fn category_color(category: StatusCategory) -> Color {
    match category {
        StatusCategory::Optimal => Color::Green,
        StatusCategory::Warning => Color::Yellow,
        StatusCategory::Critical => Color::Red,
    }
}

// ──────────────────── input ────────────────────

/// What one key press asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    Refresh,
    Nav(NavAction),
}

/// Map a key press to a dashboard command. Unbound keys yield `None`.
#[must_use]
pub fn key_command(key: KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyCommand::Quit)
        }
        KeyCode::Char('q') => Some(KeyCommand::Quit),
        KeyCode::Char('r') => Some(KeyCommand::Refresh),
        KeyCode::Char('m') => Some(KeyCommand::Nav(NavAction::ToggleSidebar)),
        KeyCode::Esc => Some(KeyCommand::Nav(NavAction::CloseSidebar)),
        KeyCode::Char(']') | KeyCode::Tab | KeyCode::Right => Some(KeyCommand::Nav(NavAction::Next)),
        KeyCode::Char('[') | KeyCode::BackTab | KeyCode::Left => {
            Some(KeyCommand::Nav(NavAction::Prev))
        }
        KeyCode::Char(c @ '1'..='7') => {
            let n = c.to_digit(10).and_then(|d| u8::try_from(d).ok())?;
            PanelId::from_number(n)
                .map(|panel| KeyCommand::Nav(NavAction::Select(panel.as_str().to_string())))
        }
        _ => None,
    }
}

// ──────────────────── health trend ────────────────────

/// Mean fleet health over the most recent refreshes.
#[derive(Debug, Clone)]
struct HealthTrend {
    values: VecDeque<f64>,
    capacity: usize,
}

impl HealthTrend {
    fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, mean_health_pct: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(mean_health_pct);
    }

    fn sparkline(&self) -> String {
        self.values
            .iter()
            .map(|v| {
                let idx = ((v / 100.0).clamp(0.0, 1.0) * 7.0).round() as usize;
                SPARK_CHARS[idx.min(7)]
            })
            .collect()
    }
}

/// Entries whose classification outcome differs from the previous refresh.
fn changed_statuses<'a>(
    previous: &[(String, Option<Classification>)],
    current: &'a [EquipmentStatus],
) -> Vec<&'a EquipmentStatus> {
    current
        .iter()
        .filter(|status| {
            !previous
                .iter()
                .any(|(name, c)| *name == status.name && *c == status.classification())
        })
        .collect()
}

// ──────────────────── session ────────────────────

/// Settings for one dashboard session.
pub struct DashboardConfig {
    pub source: FeedSource,
    pub classifier: StatusClassifier,
    pub refresh: Duration,
}

/// Latest refresh result.
struct Frame {
    statuses: Vec<EquipmentStatus>,
    summary: FleetSummary,
    feed_error: Option<DashError>,
}

impl Frame {
    fn load(config: &DashboardConfig) -> Self {
        match config.source.classify(&config.classifier) {
            Ok(statuses) => Self {
                summary: FleetSummary::from_results(&statuses),
                statuses,
                feed_error: None,
            },
            Err(error) => Self {
                statuses: Vec::new(),
                summary: FleetSummary::default(),
                feed_error: Some(error),
            },
        }
    }
}

/// Run the dashboard until the user quits. Returns the number of refreshes.
pub fn run(config: &DashboardConfig, log: &mut ActivityLog) -> io::Result<u64> {
    let mut stdout = io::stdout();

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run_inner(&mut stdout, config, log);

    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run_inner(
    stdout: &mut io::Stdout,
    config: &DashboardConfig,
    log: &mut ActivityLog,
) -> io::Result<u64> {
    let mut nav = NavigationController::new();
    let mut trend = HealthTrend::new(30);
    let mut seen: Vec<(String, Option<Classification>)> = Vec::new();
    let mut frame = Frame::load(config);
    let mut refreshes = 0u64;
    let mut last_refresh: Option<Instant> = None;
    let mut dirty = true;

    loop {
        if last_refresh.is_none_or(|at| at.elapsed() >= config.refresh) {
            if refreshes > 0 {
                frame = Frame::load(config);
                log.try_recover();
            }
            last_refresh = Some(Instant::now());
            refreshes += 1;
            if let Some(mean) = frame.summary.mean_health_pct {
                trend.push(mean);
            }
            match &frame.feed_error {
                Some(error) => log.record(ActivityEvent::error(error)),
                None => {
                    for status in changed_statuses(&seen, &frame.statuses) {
                        log.record(ActivityEvent::from_status(status));
                    }
                    seen = frame
                        .statuses
                        .iter()
                        .map(|s| (s.name.clone(), s.classification()))
                        .collect();
                }
            }
            dirty = true;
        }

        if dirty {
            let (cols, rows) = terminal::size()?;
            render_frame(stdout, cols, rows, &nav, &frame, &trend, config)?;
            dirty = false;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            dirty = true;
            continue;
        };
        match key_command(key) {
            Some(KeyCommand::Quit) => return Ok(refreshes),
            Some(KeyCommand::Refresh) => last_refresh = None,
            Some(KeyCommand::Nav(action)) => {
                let before = nav.state();
                if let Ok(state) = nav.apply(&action)
                    && state != before
                {
                    let event = if action.selects_panel() {
                        ActivityEvent::PanelSelected { state }
                    } else {
                        ActivityEvent::SidebarToggled { state }
                    };
                    log.record(event);
                    dirty = true;
                }
            }
            None => {}
        }
    }
}

// ──────────────────── frame rendering ────────────────────

fn render_frame(
    stdout: &mut io::Stdout,
    cols: u16,
    rows: u16,
    nav: &NavigationController,
    frame: &Frame,
    trend: &HealthTrend,
    config: &DashboardConfig,
) -> io::Result<()> {
    let width = cols as usize;
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;

    // ── Header ──
    let label = nav.current_panel_label();
    let header = format!(" Dairy Plant Dashboard  [{}]", label.label);
    let right = format!("feed: {} ", config.source.describe());
    let pad = width.saturating_sub(header.chars().count() + right.chars().count() + 4);
    queue!(
        stdout,
        MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        SetAttribute(Attribute::Bold),
    )?;
    write!(stdout, "┌─{header}{:─<pad$}{right}─┐", "")?;
    queue!(stdout, SetAttribute(Attribute::Reset))?;

    let left = if nav.sidebar_open() {
        render_sidebar(stdout, nav.active_panel())?;
        SIDEBAR_WIDTH + 2
    } else {
        2
    };

    let mut row = 2u16;
    let heading = nav.active_panel().heading();
    queue!(
        stdout,
        MoveTo(left, row),
        SetForegroundColor(Color::White),
        SetAttribute(Attribute::Bold),
    )?;
    write!(stdout, "{}", heading.title)?;
    queue!(stdout, SetAttribute(Attribute::Reset))?;
    row += 1;
    queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::DarkGrey))?;
    write!(stdout, "{}", heading.description)?;
    queue!(stdout, SetAttribute(Attribute::Reset))?;
    row += 2;

    if let Some(error) = &frame.feed_error {
        queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::Red))?;
        write!(stdout, "{}", feed_error_line(error, config.refresh))?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;
        row += 2;
    }

    if matches!(nav.active_panel(), PanelId::Overview | PanelId::Equipment) {
        if nav.active_panel() == PanelId::Overview {
            row = render_summary(stdout, left, row, &frame.summary, trend)?;
            row += 1;
        }
        render_cards(stdout, left, row, rows.saturating_sub(1), &frame.statuses)?;
    }

    let footer = " q quit  m menu  Esc close  1-7/[ ] panels  r refresh ";
    let pad = width.saturating_sub(footer.chars().count() + 4);
    queue!(
        stdout,
        MoveTo(0, rows.saturating_sub(1)),
        SetForegroundColor(Color::Cyan)
    )?;
    write!(stdout, "└─{footer}{:─<pad$}─┘", "")?;
    queue!(stdout, SetAttribute(Attribute::Reset))?;

    stdout.flush()
}

fn render_sidebar(stdout: &mut io::Stdout, active: PanelId) -> io::Result<()> {
    for (i, item) in NAV_ITEMS.iter().enumerate() {
        let row = 2 + i as u16;
        queue!(stdout, MoveTo(1, row))?;
        if item.id == active {
            queue!(
                stdout,
                SetForegroundColor(Color::Cyan),
                SetAttribute(Attribute::Reverse)
            )?;
        } else {
            queue!(stdout, SetForegroundColor(Color::White))?;
        }
        let text = format!(" {} {}", item.id.number(), item.label);
        write!(stdout, "{text:<w$}", w = SIDEBAR_WIDTH as usize - 1)?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;
        queue!(stdout, MoveTo(SIDEBAR_WIDTH, row), SetForegroundColor(Color::DarkGrey))?;
        write!(stdout, "│")?;
    }
    queue!(stdout, SetAttribute(Attribute::Reset))
}

fn render_summary(
    stdout: &mut io::Stdout,
    left: u16,
    mut row: u16,
    summary: &FleetSummary,
    trend: &HealthTrend,
) -> io::Result<u16> {
    queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::White))?;
    write!(stdout, "Equipment: {}   ", summary.total)?;
    for category in StatusCategory::ALL {
        queue!(stdout, SetForegroundColor(category_color(category)))?;
        write!(
            stdout,
            "{}: {}   ",
            category.label(),
            summary.count(category)
        )?;
    }
    queue!(stdout, SetForegroundColor(Color::White))?;
    write!(stdout, "alerts: {}", summary.alerting)?;
    if summary.invalid > 0 {
        queue!(stdout, SetForegroundColor(Color::DarkGrey))?;
        write!(stdout, "   invalid: {}", summary.invalid)?;
    }
    row += 1;

    if let (Some(health), Some(efficiency)) = (summary.mean_health_pct, summary.mean_efficiency_pct)
    {
        queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::White))?;
        write!(
            stdout,
            "Mean health {health:.1}%   mean efficiency {efficiency:.1}%   trend {}",
            trend.sparkline()
        )?;
        row += 1;
    }
    queue!(stdout, SetAttribute(Attribute::Reset))?;
    Ok(row)
}

/// Feed failure banner. Retryable failures announce the next attempt.
fn feed_error_line(error: &DashError, refresh: Duration) -> String {
    if error.is_retryable() {
        format!("{error} (retrying every {}ms)", refresh.as_millis())
    } else {
        error.to_string()
    }
}

/// Split `count` cards into (drawn, hidden) for the rows between `first_row`
/// and `footer_row`. When not all fit, the last free row holds a `+N more` line.
fn card_fit(count: usize, first_row: u16, footer_row: u16) -> (usize, usize) {
    let available = usize::from(footer_row.saturating_sub(first_row));
    if count <= available {
        (count, 0)
    } else {
        let drawn = available.saturating_sub(1);
        (drawn, count - drawn)
    }
}

fn render_cards(
    stdout: &mut io::Stdout,
    left: u16,
    mut row: u16,
    footer_row: u16,
    statuses: &[EquipmentStatus],
) -> io::Result<()> {
    let (drawn, hidden) = card_fit(statuses.len(), row, footer_row);
    for status in &statuses[..drawn] {
        queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::White))?;
        write!(stdout, "{:<22}", status.name)?;
        match (status.classification(), status.snapshot.as_ref()) {
            (Some(c), Some(snap)) => {
                queue!(stdout, SetForegroundColor(category_color(c.category)))?;
                write!(
                    stdout,
                    "{:<9} {}  {:>6.1}°C  {:>5.1}% eff",
                    c.category.label().to_uppercase(),
                    gauge(snap.health_pct, 20),
                    snap.temperature_c,
                    snap.efficiency_pct
                )?;
                if c.alert {
                    queue!(
                        stdout,
                        SetForegroundColor(Color::Red),
                        SetAttribute(Attribute::Bold)
                    )?;
                    write!(stdout, "  ⚠ ALERT")?;
                }
            }
            _ => {
                queue!(stdout, SetForegroundColor(Color::DarkGrey))?;
                let reason = status
                    .error()
                    .map_or_else(|| "unclassified".to_string(), ToString::to_string);
                write!(stdout, "INVALID   {reason}")?;
            }
        }
        queue!(stdout, SetAttribute(Attribute::Reset))?;
        row += 1;
    }
    if hidden > 0 && row < footer_row {
        queue!(stdout, MoveTo(left, row), SetForegroundColor(Color::DarkGrey))?;
        write!(stdout, "+{hidden} more")?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

// ──────────────────── tests ────────────────────
