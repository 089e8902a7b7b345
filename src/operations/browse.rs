use crate::db::repository;
use crate::errors::Result;
use crate::models::transaction::{Transaction, TransactionKind};
use crate::operations::add::{self, TransactionInput};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cmp::{max, min};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    DateDesc,
    DateAsc,
}

impl SortOrder {
    fn toggle(self) -> Self {
        match self {
            SortOrder::DateDesc => SortOrder::DateAsc,
            SortOrder::DateAsc => SortOrder::DateDesc,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date ↓",
            SortOrder::DateAsc => "date ↑",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    List,
    Details,
    Input(InputKind),
    AddForm,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Category,
    DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FormField {
    #[default]
    Date,
    Category,
    Kind,
    Amount,
    Description,
}

impl FormField {
    const ALL: [FormField; 5] = [
        FormField::Date,
        FormField::Category,
        FormField::Kind,
        FormField::Amount,
        FormField::Description,
    ];

    fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let pos = Self::ALL.iter().position(|&f| f == self).unwrap_or(0);
        Self::ALL[(pos + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Date => "Date (YYYY-MM-DD, empty = today)",
            FormField::Category => "Category",
            FormField::Kind => "Type (income/expense)",
            FormField::Amount => "Amount",
            FormField::Description => "Description (optional)",
        }
    }
}

#[derive(Debug, Default)]
struct AddForm {
    input: TransactionInput,
    active: FormField,
    error: Option<String>,
}

impl AddForm {
    fn buffer_mut(&mut self) -> &mut String {
        match self.active {
            FormField::Date => &mut self.input.date,
            FormField::Category => &mut self.input.category,
            FormField::Kind => &mut self.input.kind,
            FormField::Amount => &mut self.input.amount,
            FormField::Description => &mut self.input.description,
        }
    }

    fn buffer(&self, field: FormField) -> &str {
        match field {
            FormField::Date => &self.input.date,
            FormField::Category => &self.input.category,
            FormField::Kind => &self.input.kind,
            FormField::Amount => &self.input.amount,
            FormField::Description => &self.input.description,
        }
    }
}

struct BrowseState {
    mode: Mode,

    transactions: Vec<Transaction>,
    filtered_indices: Vec<usize>,

    table_state: TableState,

    filter_category: Option<String>,
    filter_kind: Option<TransactionKind>,
    filter_from: Option<NaiveDate>,
    filter_to: Option<NaiveDate>,

    sort_order: SortOrder,

    // Totals over the filtered view, recomputed with the filters.
    income_total: Decimal,
    expense_total: Decimal,

    // Input modal
    input_buffer: String,
    input_error: Option<String>,

    // Details view
    details_tx: Option<Transaction>,

    // Add form modal
    form: AddForm,

    // Delete confirmation
    pending_delete: Option<Transaction>,

    // Cached per-draw
    last_page_size: usize,
}

impl BrowseState {
    fn new(transactions: Vec<Transaction>) -> Self {
        let mut state = Self {
            mode: Mode::List,
            transactions,
            filtered_indices: Vec::new(),
            table_state: TableState::default(),
            filter_category: None,
            filter_kind: None,
            filter_from: None,
            filter_to: None,
            sort_order: SortOrder::DateDesc,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            input_buffer: String::new(),
            input_error: None,
            details_tx: None,
            form: AddForm::default(),
            pending_delete: None,
            last_page_size: 10,
        };
        state.recompute();
        state
    }

    fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn selected_transaction(&self) -> Option<&Transaction> {
        let selected = self.selected_index()?;
        let idx = *self.filtered_indices.get(selected)?;
        self.transactions.get(idx)
    }

    fn balance(&self) -> Decimal {
        self.income_total - self.expense_total
    }

    fn recompute(&mut self) {
        self.filtered_indices = (0..self.transactions.len())
            .filter(|&i| self.matches_filters(&self.transactions[i]))
            .collect();

        self.sort_filtered();

        self.income_total = Decimal::ZERO;
        self.expense_total = Decimal::ZERO;
        for &idx in &self.filtered_indices {
            let tx = &self.transactions[idx];
            match tx.kind {
                TransactionKind::Income => self.income_total += tx.amount,
                TransactionKind::Expense => self.expense_total += tx.amount,
            }
        }

        if self.filtered_indices.is_empty() {
            self.table_state.select(None);
        } else {
            let new_selected = match self.table_state.selected() {
                Some(sel) => min(sel, self.filtered_indices.len().saturating_sub(1)),
                None => 0,
            };
            self.table_state.select(Some(new_selected));
        }
    }

    fn matches_filters(&self, tx: &Transaction) -> bool {
        if let Some(kind) = self.filter_kind {
            if tx.kind != kind {
                return false;
            }
        }

        if let Some(from) = self.filter_from {
            if tx.date < from {
                return false;
            }
        }
        if let Some(to) = self.filter_to {
            if tx.date > to {
                return false;
            }
        }

        if let Some(ref category) = self.filter_category {
            if !tx.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        true
    }

    fn sort_filtered(&mut self) {
        let txs = &self.transactions;
        match self.sort_order {
            SortOrder::DateDesc => {
                self.filtered_indices.sort_by(|&a, &b| {
                    let ta = &txs[a];
                    let tb = &txs[b];
                    tb.date.cmp(&ta.date).then_with(|| tb.id.cmp(&ta.id))
                });
            }
            SortOrder::DateAsc => {
                self.filtered_indices.sort_by(|&a, &b| {
                    let ta = &txs[a];
                    let tb = &txs[b];
                    ta.date.cmp(&tb.date).then_with(|| ta.id.cmp(&tb.id))
                });
            }
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.filtered_indices.is_empty() {
            self.table_state.select(None);
            return;
        }

        let current = self.table_state.selected().unwrap_or(0) as i32;
        let max_index = self.filtered_indices.len().saturating_sub(1) as i32;
        let next = (current + delta).clamp(0, max_index) as usize;
        self.table_state.select(Some(next));
    }

    fn page_up(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(-page);
    }

    fn page_down(&mut self) {
        let page = max(1, self.last_page_size) as i32;
        self.move_selection(page);
    }

    fn refresh_from_db(&mut self, conn: &Connection) -> Result<()> {
        self.transactions = repository::get_all_transactions(conn)?;
        self.recompute();
        Ok(())
    }

    fn cycle_kind_filter(&mut self) {
        self.filter_kind = match self.filter_kind {
            None => Some(TransactionKind::Expense),
            Some(TransactionKind::Expense) => Some(TransactionKind::Income),
            Some(TransactionKind::Income) => None,
        };
        self.recompute();
    }

    fn clear_filters(&mut self) {
        self.filter_category = None;
        self.filter_kind = None;
        self.filter_from = None;
        self.filter_to = None;
        self.recompute();
    }

    fn open_details(&mut self) {
        self.details_tx = self.selected_transaction().cloned();
        self.mode = Mode::Details;
    }

    fn close_details(&mut self) {
        self.details_tx = None;
        self.mode = Mode::List;
    }

    fn start_input(&mut self, kind: InputKind) {
        self.input_buffer.clear();
        self.input_error = None;

        match kind {
            InputKind::Category => {
                if let Some(ref c) = self.filter_category {
                    self.input_buffer = c.clone();
                }
            }
            InputKind::DateRange => {
                let from = self
                    .filter_from
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let to = self
                    .filter_to
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                if !from.is_empty() || !to.is_empty() {
                    self.input_buffer = format!("{}..{}", from, to);
                }
            }
        }

        self.mode = Mode::Input(kind);
    }

    fn cancel_input(&mut self) {
        self.input_error = None;
        self.mode = Mode::List;
    }

    fn commit_input(&mut self, kind: InputKind) {
        let raw = self.input_buffer.trim();
        match kind {
            InputKind::Category => {
                if raw.is_empty() {
                    self.filter_category = None;
                } else {
                    self.filter_category = Some(raw.to_string());
                }
                self.mode = Mode::List;
                self.recompute();
            }
            InputKind::DateRange => {
                if raw.is_empty() {
                    self.filter_from = None;
                    self.filter_to = None;
                    self.mode = Mode::List;
                    self.recompute();
                    return;
                }

                match parse_date_range(raw) {
                    Ok((from, to)) => {
                        self.filter_from = from;
                        self.filter_to = to;
                        self.input_error = None;
                        self.mode = Mode::List;
                        self.recompute();
                    }
                    Err(e) => {
                        self.input_error = Some(e);
                    }
                }
            }
        }
    }

    fn open_add_form(&mut self) {
        self.form = AddForm::default();
        self.mode = Mode::AddForm;
    }

    fn cancel_add_form(&mut self) {
        self.form = AddForm::default();
        self.mode = Mode::List;
    }

    fn submit_add_form(&mut self, conn: &Connection) -> Result<()> {
        match add::add_transaction(conn, &self.form.input) {
            Ok(_) => {
                self.form = AddForm::default();
                self.mode = Mode::List;
                self.refresh_from_db(conn)
            }
            // Validation problems stay inside the form; storage errors bubble up.
            Err(e @ crate::errors::AppError::Sql(_)) => Err(e),
            Err(e) => {
                self.form.error = Some(e.to_string());
                Ok(())
            }
        }
    }

    fn request_delete(&mut self) {
        self.pending_delete = self.selected_transaction().cloned();
        if self.pending_delete.is_some() {
            self.mode = Mode::ConfirmDelete;
        }
    }

    fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.mode = Mode::List;
    }

    fn confirm_delete(&mut self, conn: &Connection) -> Result<()> {
        if let Some(tx) = self.pending_delete.take() {
            repository::remove_transaction(conn, &tx.id)?;
        }
        self.mode = Mode::List;
        self.refresh_from_db(conn)
    }
}

pub fn run_browse(conn: &Connection) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = ratatui::Terminal::new(backend)?;

        let initial = repository::get_all_transactions(conn)?;
        let mut state = BrowseState::new(initial);

        loop {
            terminal.draw(|frame| {
                let size = frame.area();
                let layout = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(4),
                        Constraint::Min(5),
                        Constraint::Length(2),
                    ])
                    .split(size);

                render_header(frame, layout[0], &state);
                render_table(frame, layout[1], &mut state);
                render_footer(frame, layout[2], &state);

                if let Mode::Input(kind) = state.mode {
                    render_input_modal(frame, size, &state, kind);
                }

                if state.mode == Mode::Details {
                    render_details_modal(frame, size, &state);
                }

                if state.mode == Mode::AddForm {
                    render_add_form_modal(frame, size, &state);
                }

                if state.mode == Mode::ConfirmDelete {
                    render_confirm_delete_modal(frame, size, &state);
                }
            })?;

            if event::poll(std::time::Duration::from_millis(200))? {
                let event = event::read()?;
                match event {
                    Event::Key(key) => {
                        if handle_key(conn, &mut state, key)? {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn handle_key(conn: &Connection, state: &mut BrowseState, key: KeyEvent) -> Result<bool> {
    // Many terminals emit both a Press and a Release event. Only act on Press/Repeat.
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }

    // Global quit in list mode
    if state.mode == Mode::List && (key.code == KeyCode::Char('q') || key.code == KeyCode::Esc) {
        return Ok(true);
    }

    match state.mode {
        Mode::List => match key.code {
            KeyCode::Up => state.move_selection(-1),
            KeyCode::Down => state.move_selection(1),
            KeyCode::PageUp => state.page_up(),
            KeyCode::PageDown => state.page_down(),
            KeyCode::Home => state.table_state.select(Some(0)),
            KeyCode::End => {
                if !state.filtered_indices.is_empty() {
                    state
                        .table_state
                        .select(Some(state.filtered_indices.len().saturating_sub(1)));
                }
            }
            KeyCode::Enter => state.open_details(),
            KeyCode::Char('a') => state.open_add_form(),
            KeyCode::Char('D') | KeyCode::Delete => state.request_delete(),
            KeyCode::Char('r') => state.refresh_from_db(conn)?,
            KeyCode::Char('c') => state.start_input(InputKind::Category),
            KeyCode::Char('d') => state.start_input(InputKind::DateRange),
            KeyCode::Char('t') => state.cycle_kind_filter(),
            KeyCode::Char('s') => {
                state.sort_order = state.sort_order.toggle();
                state.recompute();
            }
            KeyCode::Char('x') => state.clear_filters(),
            _ => {}
        },
        Mode::Details => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => state.close_details(),
            _ => {}
        },
        Mode::Input(kind) => {
            // Allow Ctrl+C / Ctrl+Q to cancel
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            {
                state.cancel_input();
                return Ok(false);
            }

            match key.code {
                KeyCode::Esc => state.cancel_input(),
                KeyCode::Enter => state.commit_input(kind),
                KeyCode::Backspace => {
                    state.input_buffer.pop();
                }
                KeyCode::Char(ch) => {
                    state.input_buffer.push(ch);
                }
                _ => {}
            }
        }
        Mode::AddForm => {
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
            {
                state.cancel_add_form();
                return Ok(false);
            }

            match key.code {
                KeyCode::Esc => state.cancel_add_form(),
                KeyCode::Tab | KeyCode::Down => state.form.active = state.form.active.next(),
                KeyCode::BackTab | KeyCode::Up => state.form.active = state.form.active.prev(),
                KeyCode::Enter => {
                    if state.form.active == FormField::Description {
                        state.submit_add_form(conn)?;
                    } else {
                        state.form.active = state.form.active.next();
                    }
                }
                KeyCode::Backspace => {
                    state.form.buffer_mut().pop();
                }
                KeyCode::Char(ch) => {
                    state.form.buffer_mut().push(ch);
                }
                _ => {}
            }
        }
        Mode::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                state.confirm_delete(conn)?;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                state.cancel_delete();
            }
            _ => {}
        },
    }

    Ok(false)
}

fn render_header(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let category = state
        .filter_category
        .as_deref()
        .unwrap_or("(any)")
        .to_string();

    let kind = match state.filter_kind {
        None => "(any)",
        Some(TransactionKind::Income) => "income",
        Some(TransactionKind::Expense) => "expense",
    };

    let from = state
        .filter_from
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "(any)".to_string());
    let to = state
        .filter_to
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "(any)".to_string());

    let filters = Line::from(vec![
        Span::styled("MONI Browse", Style::default().fg(Color::Cyan).bold()),
        Span::raw("  "),
        Span::styled(
            format!("Sort: {}", state.sort_order.label()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Category: {}", category)),
        Span::raw("  |  "),
        Span::raw(format!("Type: {}", kind)),
        Span::raw("  |  "),
        Span::raw(format!("Date: {}..{}", from, to)),
        Span::raw("  |  "),
        Span::raw(format!("Rows: {}", state.filtered_indices.len())),
    ]);

    let totals = Line::from(vec![
        Span::styled("Income: ", Style::default().fg(Color::Green)),
        Span::raw(format!("{:.2}", state.income_total)),
        Span::raw("  |  "),
        Span::styled("Expenses: ", Style::default().fg(Color::Red)),
        Span::raw(format!("{:.2}", state.expense_total)),
        Span::raw("  |  "),
        Span::styled("Balance: ", Style::default().bold()),
        Span::raw(format!("{:.2}", state.balance())),
    ]);

    let block = Block::default().borders(Borders::ALL);
    let paragraph = Paragraph::new(vec![filters, totals])
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let hint = match state.mode {
        Mode::List => {
            "↑/↓ move  PgUp/PgDn page  Enter details  a add  D delete  c category  d dates  t type  s sort  r refresh  x clear  q/Esc exit"
        }
        Mode::Details => "Esc/q/b back",
        Mode::Input(_) => "Type, Enter apply, Esc cancel",
        Mode::AddForm => "Tab/↑/↓ field  Enter next (last field saves)  Esc cancel",
        Mode::ConfirmDelete => "y confirm  n/Esc cancel",
    };

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(hint)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_table(frame: &mut ratatui::Frame, area: Rect, state: &mut BrowseState) {
    let block = Block::default().title("Transactions").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header = Row::new([
        Cell::from("Date").style(Style::default().bold()),
        Cell::from("Category").style(Style::default().bold()),
        Cell::from("Type").style(Style::default().bold()),
        Cell::from("Amount").style(Style::default().bold()),
        Cell::from("Description").style(Style::default().bold()),
        Cell::from("Id").style(Style::default().bold()),
    ])
    .style(Style::default().fg(Color::White));

    let rows = state
        .filtered_indices
        .iter()
        .map(|&idx| &state.transactions[idx])
        .map(|tx| {
            let date = tx.date.format("%Y-%m-%d").to_string();
            let desc = clip_cell(&tx.description, 42);
            let amount = tx.amount.to_string();
            let kind = tx.kind.as_str();
            let mut id_short = tx.id.clone();
            if id_short.len() > 8 {
                id_short.truncate(8);
            }

            Row::new([
                Cell::from(date),
                Cell::from(tx.category.clone()),
                Cell::from(kind),
                Cell::from(amount),
                Cell::from(desc),
                Cell::from(id_short),
            ])
        });

    // Estimate a page size based on the table height.
    // Leave room for the header row.
    state.last_page_size = inner.height.saturating_sub(2) as usize;
    if state.last_page_size == 0 {
        state.last_page_size = 1;
    }

    let widths = [
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Percentage(40),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut state.table_state);

    if state.filtered_indices.is_empty() {
        let empty = Paragraph::new("No transactions match the current filters")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    }
}

fn render_input_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState, kind: InputKind) {
    let popup_area = centered_rect(80, 30, area);
    frame.render_widget(Clear, popup_area);

    let title = match kind {
        InputKind::Category => "Filter Category",
        InputKind::DateRange => "Filter Date Range",
    };

    let help = match kind {
        InputKind::Category => "Enter category name (empty clears)",
        InputKind::DateRange => "Enter range like 2025-01-01..2025-01-31 (empty clears)",
    };

    let mut lines = vec![
        Line::from(vec![Span::styled(title, Style::default().bold())]),
        Line::from(help),
        Line::from(""),
        Line::from(vec![Span::styled(
            format!("> {}", state.input_buffer),
            Style::default().fg(Color::Yellow),
        )]),
    ];

    if let Some(ref err) = state.input_error {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )]));
    }

    let block = Block::default().borders(Borders::ALL).title("Input");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

fn render_add_form_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(vec![Span::styled(
            "New Transaction",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from(""),
    ];

    for field in FormField::ALL {
        let marker = if field == state.form.active { "> " } else { "  " };
        let style = if field == state.form.active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![Span::styled(
            format!("{}{}: {}", marker, field.label(), state.form.buffer(field)),
            style,
        )]));
    }

    if let Some(ref err) = state.form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )]));
    }

    let block = Block::default().borders(Borders::ALL).title("Add");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn render_confirm_delete_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let summary = state
        .pending_delete
        .as_ref()
        .map(|tx| {
            format!(
                "{}  {}  {}  {}",
                tx.date.format("%Y-%m-%d"),
                tx.category,
                tx.kind.as_str(),
                tx.amount
            )
        })
        .unwrap_or_else(|| "No selection".to_string());

    let lines = vec![
        Line::from(vec![Span::styled(
            "Delete this transaction?",
            Style::default().fg(Color::Red).bold(),
        )]),
        Line::from(""),
        Line::from(summary),
        Line::from(""),
        Line::from(Span::styled(
            "y confirm  n/Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Confirm");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn render_details_modal(frame: &mut ratatui::Frame, area: Rect, state: &BrowseState) {
    let popup_area = centered_rect(90, 60, area);
    frame.render_widget(Clear, popup_area);

    let tx = match state.details_tx.as_ref() {
        Some(tx) => tx,
        None => {
            frame.render_widget(
                Paragraph::new("No selection")
                    .block(Block::default().borders(Borders::ALL).title("Details"))
                    .alignment(Alignment::Center),
                popup_area,
            );
            return;
        }
    };

    let lines = vec![
        Line::from(vec![Span::styled(
            "Transaction Details",
            Style::default().fg(Color::Cyan).bold(),
        )]),
        Line::from(""),
        Line::from(format!("Id: {}", tx.id)),
        Line::from(format!("Date: {}", tx.date.format("%Y-%m-%d"))),
        Line::from(format!("Type: {}", tx.kind.as_str())),
        Line::from(format!("Category: {}", tx.category)),
        Line::from(format!("Amount: {}", tx.amount)),
        Line::from(""),
        Line::from("Description:"),
        Line::from(tx.description.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "Esc/q/b to go back",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default().borders(Borders::ALL).title("Details");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

/// Shortens cell text to at most `max_len` bytes, cutting on a char
/// boundary so multi-byte text never splits mid-character.
fn clip_cell(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut cut = max_len.saturating_sub(3);
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}

fn parse_date_range(input: &str) -> std::result::Result<(Option<NaiveDate>, Option<NaiveDate>), String> {
    let s = input.trim();

    // Supported formats:
    //  - YYYY-MM-DD..YYYY-MM-DD
    //  - YYYY-MM-DD-YYYY-MM-DD
    //  - YYYY-MM-DD,YYYY-MM-DD
    let (left, right) = if let Some((a, b)) = s.split_once("..") {
        (a.trim(), b.trim())
    } else if let Some((a, b)) = s.split_once(',') {
        (a.trim(), b.trim())
    } else if let Some((a, b)) = split_once_dash_range(s) {
        (a.trim(), b.trim())
    } else {
        return Err("Invalid date range. Use YYYY-MM-DD..YYYY-MM-DD".to_string());
    };

    let from = if left.is_empty() {
        None
    } else {
        Some(parse_iso_date(left)?)
    };

    let to = if right.is_empty() {
        None
    } else {
        Some(parse_iso_date(right)?)
    };

    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err("Invalid range: start date must be <= end date".to_string());
        }
    }

    Ok((from, to))
}

fn parse_iso_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Please use YYYY-MM-DD.", s.trim()))
}

fn split_once_dash_range(s: &str) -> Option<(&str, &str)> {
    // Try to split on the last '-' that separates two ISO dates.
    // Example: 2025-01-01-2025-01-31
    let bytes = s.as_bytes();
    for i in (0..bytes.len()).rev() {
        if bytes[i] == b'-' {
            let (a, b) = s.split_at(i);
            let b = &b[1..];
            // Heuristic: both sides should look like ISO date lengths.
            if a.trim().len() >= 10 && b.trim().len() >= 10 {
                return Some((a, b));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn tx(date: &str, category: &str, kind: TransactionKind, amount: &str) -> Transaction {
        Transaction::new(
            Uuid::new_v4().to_string(),
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category.to_string(),
            kind,
            Decimal::from_str(amount).unwrap(),
            String::new(),
        )
    }

    #[test]
    fn test_totals_follow_filters() {
        let mut state = BrowseState::new(vec![
            tx("2025-11-01", "Salary", TransactionKind::Income, "1500.00"),
            tx("2025-11-02", "Groceries", TransactionKind::Expense, "42.75"),
            tx("2025-11-03", "Dining Out", TransactionKind::Expense, "18.25"),
        ]);

        assert_eq!(state.income_total, Decimal::from_str("1500.00").unwrap());
        assert_eq!(state.expense_total, Decimal::from_str("61.00").unwrap());
        assert_eq!(state.balance(), Decimal::from_str("1439.00").unwrap());

        state.filter_category = Some("groceries".to_string());
        state.recompute();
        assert_eq!(state.filtered_indices.len(), 1);
        assert_eq!(state.expense_total, Decimal::from_str("42.75").unwrap());
        assert_eq!(state.balance(), Decimal::from_str("-42.75").unwrap());
    }

    #[test]
    fn test_kind_filter_cycles_through_all_states() {
        let mut state = BrowseState::new(vec![
            tx("2025-11-01", "Salary", TransactionKind::Income, "1500.00"),
            tx("2025-11-02", "Groceries", TransactionKind::Expense, "42.75"),
        ]);

        state.cycle_kind_filter();
        assert_eq!(state.filter_kind, Some(TransactionKind::Expense));
        assert_eq!(state.filtered_indices.len(), 1);

        state.cycle_kind_filter();
        assert_eq!(state.filter_kind, Some(TransactionKind::Income));

        state.cycle_kind_filter();
        assert_eq!(state.filter_kind, None);
        assert_eq!(state.filtered_indices.len(), 2);
    }

    #[test]
    fn test_sort_toggle_reverses_dates() {
        let mut state = BrowseState::new(vec![
            tx("2025-11-01", "A", TransactionKind::Expense, "1.00"),
            tx("2025-11-03", "B", TransactionKind::Expense, "1.00"),
            tx("2025-11-02", "C", TransactionKind::Expense, "1.00"),
        ]);

        let dates: Vec<NaiveDate> = state
            .filtered_indices
            .iter()
            .map(|&i| state.transactions[i].date)
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));

        state.sort_order = state.sort_order.toggle();
        state.recompute();
        let dates: Vec<NaiveDate> = state
            .filtered_indices
            .iter()
            .map(|&i| state.transactions[i].date)
            .collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_form_field_cycle() {
        assert_eq!(FormField::Date.next(), FormField::Category);
        assert_eq!(FormField::Description.next(), FormField::Date);
        assert_eq!(FormField::Date.prev(), FormField::Description);
    }

    #[test]
    fn test_clip_cell_keeps_char_boundaries() {
        // 22 two-byte chars = 44 bytes, over the 42-byte cell budget
        let text = "é".repeat(22);
        let clipped = clip_cell(&text, 42);
        assert!(clipped.ends_with("..."));
        assert!(clipped.len() <= 42);

        assert_eq!(clip_cell("short", 42), "short");
        assert_eq!(clip_cell(&"x".repeat(50), 42), format!("{}...", "x".repeat(39)));
    }

    #[test]
    fn test_table_draws_multibyte_description() {
        let mut entry = tx("2025-11-01", "Groceries", TransactionKind::Expense, "9.99");
        entry.description = "é".repeat(22);
        let mut state = BrowseState::new(vec![entry]);

        let backend = ratatui::backend::TestBackend::new(100, 16);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_table(frame, frame.area(), &mut state))
            .unwrap();
    }

    #[test]
    fn test_parse_date_range_variants() {
        let (from, to) = parse_date_range("2025-01-01..2025-01-31").unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 1, 31));

        let (from, to) = parse_date_range("2025-01-01,2025-01-31").unwrap();
        assert!(from.is_some() && to.is_some());

        let (from, to) = parse_date_range("..2025-01-31").unwrap();
        assert!(from.is_none());
        assert!(to.is_some());

        assert!(parse_date_range("2025-02-01..2025-01-01").is_err());
        assert!(parse_date_range("nonsense").is_err());
    }
}
