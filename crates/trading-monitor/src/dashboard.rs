//! TUI Dashboard using ratatui.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use rust_decimal::Decimal;
use std::io;
use std::time::Duration;
use trading_automation::ControllerStatus;
use trading_core::types::{Order, Side};

/// Everything the dashboard draws in one frame.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub status: ControllerStatus,
    /// Most recent orders, oldest first
    pub recent_orders: Vec<Order>,
}

/// TUI Dashboard.
pub struct Dashboard {
    refresh_ms: u64,
}

fn pl_color(value: Decimal) -> Color {
    if value >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    }
}

impl Dashboard {
    /// Create a new dashboard.
    pub fn new(refresh_ms: u64) -> Self {
        Self { refresh_ms }
    }

    /// Run the dashboard until 'q' or Esc. Blocks the calling thread.
    pub fn run<F>(&self, mut get_state: F) -> io::Result<()>
    where
        F: FnMut() -> Option<DashboardState>,
    {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, &mut get_state);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop<B, F>(&self, terminal: &mut Terminal<B>, get_state: &mut F) -> io::Result<()>
    where
        B: Backend,
        F: FnMut() -> Option<DashboardState>,
    {
        let mut state = None;
        loop {
            if let Some(latest) = get_state() {
                state = Some(latest);
            }
            if let Some(state) = &state {
                terminal.draw(|f| self.ui(f, state))?;
            }

            if event::poll(Duration::from_millis(self.refresh_ms))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, state: &DashboardState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(4), // Account
                Constraint::Min(6),    // Positions + watchlist
                Constraint::Length(8), // Orders
            ])
            .split(frame.area());

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);

        self.render_header(frame, chunks[0], state);
        self.render_account(frame, chunks[1], state);
        self.render_positions(frame, middle[0], state);
        self.render_watchlist(frame, middle[1], state);
        self.render_orders(frame, chunks[3], state);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let status = &state.status;
        let (label, color) = if status.running {
            ("RUNNING", Color::Green)
        } else {
            ("STOPPED", Color::Red)
        };
        let regime = status
            .regime
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Paper Trader", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" | "),
            Span::styled(label, Style::default().fg(color)),
            Span::raw(" | Regime: "),
            Span::styled(regime, Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | Cycles: {}", status.cycles_completed)),
            Span::raw(" | Press 'q' to quit"),
        ]))
        .block(Block::default().borders(Borders::ALL).title("System"));
        frame.render_widget(header, area);
    }

    fn render_account(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let summary = &state.status.portfolio;
        let mut lines = vec![Line::from(vec![
            Span::raw("Value: "),
            Span::styled(
                format!("${:.2}", summary.total_value),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  |  Cash: ${:.2}", summary.cash_balance)),
            Span::raw(format!("  |  Invested: ${:.2}", summary.positions_value)),
            Span::raw("  |  Return: "),
            Span::styled(
                format!("{:.2}%", summary.total_return_percent),
                Style::default().fg(pl_color(summary.total_return_percent)),
            ),
        ])];
        if let Some(error) = &state.status.last_error {
            lines.push(Line::from(Span::styled(
                format!("Last error: {error}"),
                Style::default().fg(Color::Red),
            )));
        }

        let account =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Account"));
        frame.render_widget(account, area);
    }

    fn render_positions(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header_cells = ["Symbol", "Qty", "Avg", "Current", "P&L", "P&L %"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows = state.status.positions.values().map(|pos| {
            let color = pl_color(pos.unrealized_pl);
            Row::new(vec![
                Cell::from(pos.symbol.clone()),
                Cell::from(pos.quantity.to_string()),
                Cell::from(format!("${:.2}", pos.average_price)),
                Cell::from(format!("${:.2}", pos.current_price)),
                Cell::from(format!("${:.2}", pos.unrealized_pl)).style(Style::default().fg(color)),
                Cell::from(format!("{:.2}%", pos.unrealized_pl_percent))
                    .style(Style::default().fg(color)),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(20),
                Constraint::Percentage(12),
                Constraint::Percentage(17),
                Constraint::Percentage(17),
                Constraint::Percentage(17),
                Constraint::Percentage(17),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Positions"));

        frame.render_widget(table, area);
    }

    fn render_watchlist(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let header_cells = ["Symbol", "Conf", "Value", "Growth", "Quant"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let status = &state.status;
        let rows = status.watched_symbols.iter().map(|symbol| {
            let Some(analysis) = status.last_analysis.get(symbol) else {
                return Row::new(vec![Cell::from(symbol.clone()), Cell::from("-")]);
            };
            let strategy = |name: &str| {
                analysis
                    .strategies
                    .get(name)
                    .map(|result| format!("{:.2}", result.confidence))
                    .unwrap_or_else(|| "-".to_string())
            };
            Row::new(vec![
                Cell::from(symbol.clone()),
                Cell::from(format!("{:.2}", analysis.aggregate_confidence))
                    .style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(strategy("value_investing")),
                Cell::from(strategy("growth_hunting")),
                Cell::from(strategy("quantitative_edge")),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(24),
                Constraint::Percentage(19),
                Constraint::Percentage(19),
                Constraint::Percentage(19),
                Constraint::Percentage(19),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Watchlist"));

        frame.render_widget(table, area);
    }

    fn render_orders(&self, frame: &mut Frame, area: Rect, state: &DashboardState) {
        let orders: Vec<Line> = state
            .recent_orders
            .iter()
            .rev()
            .take(6)
            .map(|order| {
                let color = match order.side {
                    Side::Buy => Color::Green,
                    Side::Sell => Color::Red,
                };
                let time = order
                    .executed_at
                    .unwrap_or(order.created_at)
                    .format("%H:%M:%S");
                Line::from(vec![
                    Span::raw(format!("{time} ")),
                    Span::styled(format!("{:<4}", order.side), Style::default().fg(color)),
                    Span::raw(format!(
                        " {} x {} @ ${:.2}",
                        order.quantity, order.symbol, order.price
                    )),
                ])
            })
            .collect();

        let paragraph =
            Paragraph::new(orders).block(Block::default().borders(Borders::ALL).title("Orders"));
        frame.render_widget(paragraph, area);
    }
}
