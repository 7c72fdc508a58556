use std::{cmp, io, thread, time::Duration};

use anyhow::{Context, Result};
use banker_core::{AppConfig, Bank, Feedback, SessionStore};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    activity::ActivityFeed,
    form::{ActionForm, FieldValue, FormKind, FormOutcome},
    format::{clip, format_currency},
};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal front-end for the bank.
pub struct BankerApp<S> {
    bank: Bank<S>,
    config: AppConfig,
    activity: ActivityFeed,
    form: Option<ActionForm>,
    confirm_reset: bool,
    status: Feedback,
    transaction_offset: usize,
    should_quit: bool,
    theme: Theme,
}

impl<S: SessionStore> BankerApp<S> {
    /// Wrap `bank`; `opening` is the outcome of the startup load.
    pub fn new(bank: Bank<S>, config: AppConfig, opening: Feedback) -> Self {
        let mut activity = ActivityFeed::new(config.activity_capacity);
        activity.record(&opening);
        Self {
            bank,
            config,
            activity,
            form: None,
            confirm_reset: false,
            status: opening,
            transaction_offset: 0,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) || self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        info!("Banker closed");
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if self.form.is_some() {
            self.handle_form_key(key);
        } else if self.confirm_reset {
            self.handle_confirm_key(key);
        } else if !self.handle_global_shortcut(&key) {
            self.handle_key(key);
        }
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.is_empty() {
            if let KeyCode::Char('u') = key.code {
                let feedback = self.bank.undo();
                self.report(feedback);
                return true;
            }
        }
        if key.modifiers == KeyModifiers::CONTROL {
            if let KeyCode::Char('r') = key.code {
                let feedback = self.bank.redo();
                self.report(feedback);
                return true;
            }
        }
        false
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('s') => {
                let feedback = self.bank.save();
                self.report(feedback);
            }
            KeyCode::Char('l') => {
                let feedback = self.bank.load();
                self.report(feedback);
            }
            KeyCode::Char('R') => self.confirm_reset = true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_transactions(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_transactions(-1),
            KeyCode::Char(ch) if key.modifiers.is_empty() => {
                if let Some(kind) = FormKind::from_shortcut(ch) {
                    self.open_form(kind);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        self.confirm_reset = false;
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let feedback = self.bank.reset();
            self.report(feedback);
        } else {
            self.status = Feedback::ok("Reset cancelled.");
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.handle_key(key) {
            FormOutcome::Pending => {}
            FormOutcome::Cancel => {
                self.form = None;
                self.status = Feedback::ok("Cancelled.");
            }
            FormOutcome::Submit => self.submit_form(),
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        let players: Vec<String> = self
            .bank
            .session()
            .players
            .iter()
            .map(|player| player.name.clone())
            .collect();
        debug!(form = kind.title(), "Form opened");
        self.form = Some(ActionForm::new(kind, &players, &self.config.building_types));
    }

    /// Run the form's action. The form stays open when the input is rejected.
    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let feedback = match form.to_action() {
            Ok(action) => self.bank.execute(&action),
            Err(err) => Feedback::error(err.to_string()),
        };
        if feedback.success {
            self.form = None;
        }
        self.report(feedback);
    }

    fn report(&mut self, feedback: Feedback) {
        self.activity.record(&feedback);
        self.status = feedback;
        self.clamp_transaction_offset();
    }

    fn scroll_transactions(&mut self, delta: isize) {
        let next = self.transaction_offset as isize + delta;
        self.transaction_offset = next.max(0) as usize;
        self.clamp_transaction_offset();
    }

    fn clamp_transaction_offset(&mut self) {
        let total = self.bank.session().transactions.len();
        self.transaction_offset = cmp::min(self.transaction_offset, total.saturating_sub(1));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(28)])
            .split(rows[1]);

        self.render_balances(frame, top[0]);
        self.render_properties(frame, top[1]);
        self.render_activity(frame, top[2]);
        self.render_transactions(frame, bottom[0]);
        self.render_help(frame, bottom[1]);
        self.render_status(frame, rows[2]);

        if let Some(form) = &self.form {
            self.render_form(frame, form);
        } else if self.confirm_reset {
            self.render_reset_confirm(frame);
        }
    }

    fn header_style(&self) -> Style {
        Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD)
    }

    fn render_balances(&self, frame: &mut Frame, area: Rect) {
        let session = self.bank.session();
        let rows: Vec<Row> = session
            .players
            .iter()
            .map(|player| {
                let style = if player.balance.is_sign_negative() {
                    Style::default().fg(self.theme.danger)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    player.name.clone(),
                    format_currency(&self.config.currency, player.balance),
                    session.properties_of(&player.name).count().to_string(),
                ])
                .style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Min(8),
                Constraint::Length(16),
                Constraint::Length(5),
            ],
        )
        .header(Row::new(vec!["Player", "Balance", "Deeds"]).style(self.header_style()))
        .block(Block::default().borders(Borders::ALL).title("Balances"));
        frame.render_widget(table, area);
    }

    fn render_properties(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .bank
            .session()
            .properties
            .iter()
            .map(|property| {
                let owner = property.owner.as_deref().unwrap_or("Unowned");
                Row::new(vec![
                    property.name.clone(),
                    owner.to_string(),
                    property.building.clone(),
                    format_currency(&self.config.currency, property.build_price),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Min(10),
                Constraint::Min(8),
                Constraint::Length(9),
                Constraint::Length(14),
            ],
        )
        .header(
            Row::new(vec!["Property", "Owner", "Building", "Build Price"])
                .style(self.header_style()),
        )
        .block(Block::default().borders(Borders::ALL).title("Properties"));
        frame.render_widget(table, area);
    }

    fn render_activity(&self, frame: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(11) as usize;
        let items: Vec<ListItem> = self
            .activity
            .iter()
            .map(|entry| {
                let color = if entry.success {
                    self.theme.success
                } else {
                    self.theme.danger
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", entry.stamp),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::styled(clip(&entry.message, width), Style::default().fg(color)),
                ]))
            })
            .collect();
        let title = format!("Updates ({})", self.activity.len());
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, area);
    }

    fn render_transactions(&self, frame: &mut Frame, area: Rect) {
        let session = self.bank.session();
        let rows: Vec<Row> = session
            .recent_transactions()
            .skip(self.transaction_offset)
            .map(|tx| {
                Row::new(vec![
                    tx.timestamp
                        .with_timezone(&Local)
                        .format("%H:%M:%S")
                        .to_string(),
                    tx.kind.label().to_string(),
                    format_currency(&self.config.currency, tx.amount),
                    tx.from.clone().unwrap_or_else(|| "-".to_string()),
                    tx.to.clone().unwrap_or_else(|| "-".to_string()),
                    tx.property.clone().unwrap_or_else(|| "-".to_string()),
                    tx.desc.clone(),
                ])
            })
            .collect();
        let title = if self.transaction_offset > 0 {
            format!(
                "Transactions ({} of {})",
                session.transactions.len() - self.transaction_offset,
                session.transactions.len()
            )
        } else {
            format!("Transactions ({})", session.transactions.len())
        };
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(14),
                Constraint::Min(10),
            ],
        )
        .header(
            Row::new(vec![
                "Time",
                "Type",
                "Amount",
                "From",
                "To",
                "Property",
                "Description",
            ])
            .style(self.header_style()),
        )
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(table, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Commands");
        let mut lines: Vec<Line> = FormKind::ALL
            .iter()
            .map(|kind| Line::from(format!("{}     {}", kind.shortcut(), kind.title())))
            .collect();
        lines.extend([
            Line::from("u     undo"),
            Line::from("Ctrl+R redo"),
            Line::from("s/l   save / load"),
            Line::from("R     reset game"),
            Line::from("j/k   scroll transactions"),
            Line::from("q     quit"),
        ]);
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let color = if self.status.success {
            self.theme.selection_fg
        } else {
            self.theme.danger
        };
        let primary = Line::from(Span::styled(
            self.status.message.clone(),
            Style::default().fg(color),
        ));
        let secondary = Line::from(Span::styled(
            format!(
                "{}  (undo {}, redo {})  Save: {}  {}",
                self.history_label(),
                availability(self.bank.history().can_undo()),
                availability(self.bank.history().can_redo()),
                self.bank.store().describe(),
                if self.config.autosave {
                    "(auto-save enabled)"
                } else {
                    "(auto-save off)"
                },
            ),
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![primary, secondary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn history_label(&self) -> String {
        let history = self.bank.history();
        format!("History {}/{}", history.cursor() + 1, history.len())
    }

    fn render_form(&self, frame: &mut Frame, form: &ActionForm) {
        let height = form.fields().len() as u16 + 5;
        let area = centered_rect(60, height, frame.size());
        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = Vec::new();
        let mut cursor = None;
        for (idx, field) in form.fields().iter().enumerate() {
            let focused = idx == form.focus();
            let marker = if focused { "> " } else { "  " };
            let label = format!("{marker}{:<20}", format!("{}:", field.label));
            let value = field.display();
            if focused {
                if let FieldValue::Text(input) = &field.value {
                    let x = area.x + 1 + label.chars().count() as u16 + input.chars().count() as u16;
                    cursor = Some((x, area.y + 1 + idx as u16));
                }
            }
            let style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(label, style),
                Span::raw(value),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" submit  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next  "),
            Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" choose  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.kind().title()),
        );
        frame.render_widget(paragraph, area);

        if let Some((x, y)) = cursor {
            let max_x = area.x + area.width.saturating_sub(2);
            frame.set_cursor(x.min(max_x), y);
        }
    }

    fn render_reset_confirm(&self, frame: &mut Frame) {
        let area = centered_rect(48, 6, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from("Reset the game and delete the saved session?"),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" reset  "),
                Span::styled("any other key", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ]),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Reset")
                .border_style(Style::default().fg(self.theme.warning)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn availability(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_core::MemoryStore;
    use ratatui::backend::TestBackend;
    use rust_decimal_macros::dec;

    fn app() -> BankerApp<MemoryStore> {
        let config = AppConfig::default();
        BankerApp::new(
            Bank::new(MemoryStore::new()),
            config,
            Feedback::error("No saved data found."),
        )
    }

    fn press(app: &mut BankerApp<MemoryStore>, code: KeyCode) {
        app.handle_input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut BankerApp<MemoryStore>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn add_player(app: &mut BankerApp<MemoryStore>, name: &str) {
        press(app, KeyCode::Char('a'));
        type_text(app, name);
        press(app, KeyCode::Enter);
    }

    fn screen(app: &mut BankerApp<MemoryStore>) -> Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(140, 40))?;
        terminal.draw(|frame| app.draw(frame))?;
        Ok(terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect())
    }

    #[test]
    fn forms_drive_the_bank() {
        let mut app = app();
        add_player(&mut app, "Alice");
        add_player(&mut app, "Bob");
        assert!(app.form.is_none());
        assert_eq!(app.bank.session().players.len(), 2);

        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Park Lane");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1,500");
        press(&mut app, KeyCode::Enter);

        let alice = app.bank.session().find_player("Alice").expect("seated");
        assert_eq!(alice.balance, dec!(23500));
        assert_eq!(app.status, Feedback::ok("Alice bought Park Lane for 1500."));
        assert_eq!(
            app.activity.latest().map(|entry| entry.message.as_str()),
            Some("Alice bought Park Lane for 1500.")
        );
    }

    #[test]
    fn rejected_form_stays_open_and_reports() {
        let mut app = app();
        add_player(&mut app, "Alice");
        add_player(&mut app, "alice");
        assert!(app.form.is_some());
        assert_eq!(app.status, Feedback::error("Player Alice already exists."));
        press(&mut app, KeyCode::Esc);
        assert!(app.form.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn oversized_amount_is_reported_not_fatal() {
        let mut app = app();
        add_player(&mut app, "Alice");
        press(&mut app, KeyCode::Char('m'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "79228162514264337593543950335");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Jackpot");
        press(&mut app, KeyCode::Enter);

        assert!(app.form.is_some());
        assert!(!app.status.success);
        assert!(app.status.message.contains("out of range"));
        let alice = app.bank.session().find_player("Alice").expect("seated");
        assert_eq!(alice.balance, dec!(25000));
        assert!(app.bank.session().transactions.is_empty());
    }

    #[test]
    fn undo_redo_and_reset_keys() {
        let mut app = app();
        add_player(&mut app, "Alice");
        press(&mut app, KeyCode::Char('u'));
        assert!(app.bank.session().players.is_empty());
        assert_eq!(app.status, Feedback::ok("Undid last action."));

        app.handle_input(Event::Key(KeyEvent::new(
            KeyCode::Char('r'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(app.bank.session().players.len(), 1);

        press(&mut app, KeyCode::Char('u'));
        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.status, Feedback::error("Cannot undo further."));

        press(&mut app, KeyCode::Char('R'));
        assert!(app.confirm_reset);
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.confirm_reset);
        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.status, Feedback::ok("Game data has been reset."));
        assert_eq!(app.bank.history().len(), 1);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn renders_tables_and_history() -> Result<()> {
        let mut app = app();
        add_player(&mut app, "Alice");
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "100");
        press(&mut app, KeyCode::Enter);

        let text = screen(&mut app)?;
        assert!(text.contains("Rs. 24900.00"));
        assert!(text.contains("Fine paid to bank"));
        assert!(text.contains("History 3/3"));
        assert!(text.contains("No saved data found."));

        press(&mut app, KeyCode::Char('t'));
        let text = screen(&mut app)?;
        assert!(text.contains("Transfer Property"));
        assert!(text.contains("< Select Player >"));
        Ok(())
    }
}
