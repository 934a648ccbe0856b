// 🖥️ Terminal presenter - ranking table + add form (editor), merged table viewer (merger)

use crate::editor::{EditorSession, HeadOfStateRecord, RawHeadOfStateForm, COLUMNS};
use crate::merger::present::{merged_cells, MERGED_COLUMNS};
use crate::merger::{JoinReport, MergedRecord};
use crate::storage::ObjectStore;
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

pub const FIELD_LABELS: [&str; 5] = [
    "Name of Head of State",
    "Start Date",
    "End Date",
    "GDP at Start (in billions)",
    "GDP at End (in billions)",
];

/// Focus index of the Submit button
const SUBMIT: usize = FIELD_LABELS.len();

// ============================================================================
// FORM STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub fields: [String; 5],
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    /// Date pickers default to today, number inputs to 0.00
    pub fn new() -> Self {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        FormState {
            fields: [
                String::new(),
                today.clone(),
                today,
                "0.00".to_string(),
                "0.00".to_string(),
            ],
            focus: 0,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % (SUBMIT + 1);
    }

    pub fn previous_field(&mut self) {
        self.focus = if self.focus == 0 { SUBMIT } else { self.focus - 1 };
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.pop();
        }
    }

    pub fn to_raw(&self) -> RawHeadOfStateForm {
        RawHeadOfStateForm {
            name: self.fields[0].clone(),
            start_date: self.fields[1].clone(),
            end_date: self.fields[2].clone(),
            gdp_start: self.fields[3].clone(),
            gdp_end: self.fields[4].clone(),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Form(FormState),
    /// Just-added record shown back to the user
    Added(HeadOfStateRecord),
}

// ============================================================================
// EDITOR APP
// ============================================================================

pub struct EditorApp<S: ObjectStore> {
    pub session: EditorSession<S>,
    pub state: TableState,
    pub mode: Mode,
}

impl<S: ObjectStore> EditorApp<S> {
    pub fn new(session: EditorSession<S>) -> Self {
        let mut state = TableState::default();
        if !session.table().is_empty() {
            state.select(Some(0));
        }

        Self {
            session,
            state,
            mode: Mode::Browse,
        }
    }

    pub fn next(&mut self) {
        let len = self.session.table().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.table().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Parse the form and run the save cycle; errors stay on the form
    pub fn submit(&mut self) {
        let Mode::Form(form) = &mut self.mode else {
            return;
        };

        let parsed = match form.to_raw().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                form.error = Some(e.to_string());
                return;
            }
        };

        match self.session.submit(parsed) {
            Ok(record) => {
                self.state.select(Some(0));
                self.mode = Mode::Added(record);
            }
            Err(e) => form.error = Some(format!("Save failed: {}", e)),
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match &mut self.mode {
            Mode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Char('a') => self.mode = Mode::Form(FormState::new()),
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Home => {
                    if !self.session.table().is_empty() {
                        self.state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    let len = self.session.table().len();
                    if len > 0 {
                        self.state.select(Some(len - 1));
                    }
                }
                _ => {}
            },
            Mode::Form(form) => match key.code {
                KeyCode::Esc => self.mode = Mode::Browse,
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.previous_field(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Enter if form.focus == SUBMIT => self.submit(),
                KeyCode::Enter => form.next_field(),
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
                KeyCode::Char(c) => form.push_char(c),
                _ => {}
            },
            Mode::Added(_) => match key.code {
                KeyCode::Char('q') => return true,
                _ => self.mode = Mode::Browse,
            },
        }
        false
    }
}

pub fn run_editor<S: ObjectStore>(app: &mut EditorApp<S>) -> Result<()> {
    with_terminal(|terminal| loop {
        terminal.draw(|f| editor_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    })
}

fn editor_ui<S: ObjectStore>(f: &mut Frame, app: &mut EditorApp<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + record count
            Constraint::Min(0),    // Rankings
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "🏛️  Head of State Rankings",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Number of records: {}", app.session.table().len()),
            Style::default().fg(Color::White),
        ),
    ])])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, chunks[0]);

    let rows: Vec<Vec<String>> = app
        .session
        .ranked()
        .iter()
        .map(|r| r.cells().to_vec())
        .collect();
    render_string_table(
        f,
        chunks[1],
        " Rankings (GDP Growth ↓) ",
        &COLUMNS,
        rows,
        &[28, 12, 12, 12, 12, 12],
        &mut app.state,
    );

    render_key_hints(
        f,
        chunks[2],
        &[("a", "Add head of state"), ("↑/↓", "Nav"), ("q", "Quit")],
    );

    match &app.mode {
        Mode::Browse => {}
        Mode::Form(form) => render_form(f, form),
        Mode::Added(record) => render_added(f, record),
    }
}

fn render_form(f: &mut Frame, form: &FormState) {
    let area = centered_rect(60, 60, f.size());
    f.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, label) in FIELD_LABELS.iter().enumerate() {
        let focused = form.focus == i;
        let marker = if focused { "→ " } else { "  " };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<28}", label), Style::default().fg(Color::Cyan)),
            Span::styled(form.fields[i].clone(), value_style),
            Span::styled(if focused { "▏" } else { "" }, value_style),
        ]));
    }
    lines.push(Line::from(""));

    let submit_style = if form.focus == SUBMIT {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    lines.push(Line::from(vec![Span::raw("  "), Span::styled(" Submit ", submit_style)]));

    if let Some(error) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab/↑/↓ move · Enter next/submit · Ctrl+S submit · Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Add a New Head of State "),
    );
    f.render_widget(popup, area);
}

fn render_added(f: &mut Frame, record: &HeadOfStateRecord) {
    let area = centered_rect(70, 30, f.size());
    f.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Head of State added! Here are the details:",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (column, value) in COLUMNS.iter().zip(record.cells()) {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", column), Style::default().fg(Color::Cyan)),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  any key to continue",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    f.render_widget(popup, area);
}

// ============================================================================
// MERGED TABLE VIEWER
// ============================================================================

pub struct MergedViewer {
    pub rows: Vec<MergedRecord>,
    pub report: JoinReport,
    pub state: TableState,
}

impl MergedViewer {
    pub fn new(rows: Vec<MergedRecord>, report: JoinReport) -> Self {
        let mut state = TableState::default();
        if !rows.is_empty() {
            state.select(Some(0));
        }
        Self { rows, report, state }
    }

    fn move_by(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() as isize - 1;
        let current = self.state.selected().unwrap_or(0) as isize;
        self.state.select(Some((current + delta).clamp(0, last) as usize));
    }
}

pub fn run_merged_viewer(viewer: &mut MergedViewer) -> Result<()> {
    with_terminal(|terminal| loop {
        terminal.draw(|f| merged_ui(f, viewer))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => viewer.move_by(1),
                KeyCode::Up | KeyCode::Char('k') => viewer.move_by(-1),
                KeyCode::PageDown => viewer.move_by(20),
                KeyCode::PageUp => viewer.move_by(-20),
                KeyCode::Home => viewer.move_by(isize::MIN / 2),
                KeyCode::End => viewer.move_by(isize::MAX / 2),
                _ => {}
            }
        }
    })
}

fn merged_ui(f: &mut Frame, viewer: &mut MergedViewer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    let report = &viewer.report;
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Leaders & Economy",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(format!("Rows: {}", report.rows), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            format!("Tenures: {}", report.tenures),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Dropped: {}", report.dropped_tenures),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Unmatched countries: {}", report.unmatched_countries.len()),
            Style::default().fg(Color::Red),
        ),
    ])])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, chunks[0]);

    let rows: Vec<Vec<String>> = viewer.rows.iter().map(|r| merged_cells(r).to_vec()).collect();
    render_string_table(
        f,
        chunks[1],
        " Merged ",
        &MERGED_COLUMNS,
        rows,
        &[22, 26, 11, 11, 5, 10, 13, 11, 22],
        &mut viewer.state,
    );

    render_key_hints(
        f,
        chunks[2],
        &[("↑/↓", "Nav"), ("PgUp/PgDn", "Fast"), ("q", "Quit")],
    );
}

// ============================================================================
// SHARED WIDGETS
// ============================================================================

fn with_terminal<F>(run: F) -> Result<()>
where
    F: FnOnce(&mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()>,
{
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn render_string_table(
    f: &mut Frame,
    area: Rect,
    title: &str,
    headers: &[&str],
    rows: Vec<Vec<String>>,
    widths: &[u16],
    state: &mut TableState,
) {
    let header_cells = headers.iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = rows
        .into_iter()
        .map(|cells| Row::new(cells.into_iter().map(Cell::from)).height(1));

    let table = Table::new(rows, widths.iter().map(|w| Constraint::Length(*w)))
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title.to_string()),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, state);
}

fn render_key_hints(f: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(key.to_string(), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(bar, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
