use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::aggregate::ChartSlice;
use crate::fmt::{money, or_placeholder, pct};
use crate::models::Selection;
use crate::selection::SelectionView;
use crate::session::Session;
use crate::tui::{
    self, slice_color, Screen, ScreenAction, CATEGORY_STYLE, FOOTER_STYLE, HEADER_STYLE,
    HIDDEN_STYLE, SELECTED_STYLE,
};

const RESET_MESSAGE: &str = "Chart has been reset to its original state.";

/// Interactive spending screen: a category chart with legend on the left,
/// the selected category's transactions on the right.
pub struct CategoryBrowser<'a> {
    session: &'a mut Session,
    slices: Vec<ChartSlice>,
    /// Presentation-only: which slices are left out of the chart.
    hidden: Vec<bool>,
    view: SelectionView,
    cursor: usize,
    offset: usize,
    visible_count: usize,
    label_threshold_pct: f64,
    status_message: Option<String>,
}

impl<'a> CategoryBrowser<'a> {
    pub fn new(session: &'a mut Session, label_threshold_pct: f64) -> crate::error::Result<Self> {
        let view = session.view()?;
        let slices = session.result().chart();
        let hidden = vec![false; slices.len()];
        let cursor = match session.selection() {
            Selection::Category(name) => slices.iter().position(|s| &s.label == name).unwrap_or(0),
            Selection::All => 0,
        };
        Ok(Self {
            session,
            slices,
            hidden,
            view,
            cursor,
            offset: 0,
            visible_count: 20,
            label_threshold_pct,
            status_message: None,
        })
    }

    fn refresh_view(&mut self) {
        match self.session.view() {
            Ok(view) => {
                self.view = view;
                self.offset = 0;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn select(&mut self, selection: Selection) {
        match self.session.select(selection) {
            Ok(()) => {
                self.status_message = None;
                self.refresh_view();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn select_cursor(&mut self) {
        if let Some(slice) = self.slices.get(self.cursor) {
            let name = slice.label.clone();
            self.select(Selection::Category(name));
        }
    }

    fn toggle_hidden(&mut self) {
        if let Some(h) = self.hidden.get_mut(self.cursor) {
            *h = !*h;
        }
    }

    fn reset(&mut self) {
        match self.session.reset() {
            Ok(()) => {
                self.slices = self.session.result().chart();
                self.hidden = vec![false; self.slices.len()];
                self.cursor = 0;
                self.refresh_view();
                self.status_message = Some(RESET_MESSAGE.to_string());
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    fn max_offset(&self) -> usize {
        self.view.rows.len().saturating_sub(self.visible_count)
    }

    /// Color of the selected slice, used for the table header.
    fn header_color(&self) -> Style {
        match self.session.selection() {
            Selection::Category(name) => self
                .slices
                .iter()
                .position(|s| &s.label == name)
                .map(|i| Style::new().fg(slice_color(i)).add_modifier(Modifier::BOLD))
                .unwrap_or(HEADER_STYLE),
            Selection::All => HEADER_STYLE,
        }
    }

    fn legend_lines(&self) -> Vec<Line<'static>> {
        self.slices
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let marker = if i == self.cursor { "\u{25b6} " } else { "  " };
                let text = format!("{}: {}", s.label, pct(s.percentage));
                let style = if self.hidden[i] {
                    HIDDEN_STYLE
                } else {
                    Style::new().fg(slice_color(i))
                };
                let style = if i == self.cursor {
                    style.patch(SELECTED_STYLE)
                } else {
                    style
                };
                Line::from(vec![Span::raw(marker), Span::styled(text, style)])
            })
            .collect()
    }

    /// First legend entry to draw so the cursor stays on screen.
    fn legend_offset(&self, rows: usize) -> usize {
        (self.cursor + 1).saturating_sub(rows.max(1))
    }

    fn draw_chart(&self, frame: &mut Frame, area: Rect) {
        // Legend gets at most half the column; the rest is the bar chart.
        let rows = self.slices.len().min((area.height as usize / 2).max(3));
        let [legend_area, chart_area] = Layout::vertical([
            Constraint::Length(rows as u16 + 2),
            Constraint::Fill(1),
        ])
        .areas(area);

        let offset = self.legend_offset(rows);
        frame.render_widget(
            Paragraph::new(self.legend_lines())
                .scroll((offset as u16, 0))
                .block(
                    Block::default()
                        .title("Spending by Category")
                        .title_style(HEADER_STYLE)
                        .borders(Borders::BOTTOM),
                ),
            legend_area,
        );

        let bars: Vec<Bar> = self
            .slices
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.hidden[*i])
            .map(|(i, s)| {
                let text = if s.percentage < self.label_threshold_pct {
                    String::new()
                } else {
                    pct(s.percentage)
                };
                Bar::default()
                    .value((s.total * 100.0).round() as u64)
                    .label(Line::from(s.label.clone()))
                    .text_value(text)
                    .style(Style::new().fg(slice_color(i)))
            })
            .collect();

        let chart = BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, chart_area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let [title_area, table_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        frame.render_widget(
            Paragraph::new(self.view.header_label()).style(self.header_color()),
            title_area,
        );

        let fixed_cols: u16 = 12 + 12 + 20 + 3;
        let desc_width = (area.width.saturating_sub(fixed_cols) as usize).max(10);
        let available = table_area.height.saturating_sub(2) as usize;

        let mut rendered = Vec::new();
        let mut used = 0usize;
        for txn in self.view.rows.iter().skip(self.offset) {
            let (desc, lines) = tui::wrap_text(or_placeholder(txn.description.as_deref()), desc_width);
            if used + lines as usize > available && !rendered.is_empty() {
                break;
            }
            used += lines as usize;
            rendered.push(
                Row::new(vec![
                    Cell::from(or_placeholder(Some(txn.date.as_str())).to_string()),
                    Cell::from(desc),
                    Cell::from(tui::money_span(txn.amount)),
                    Cell::from(Span::styled(
                        or_placeholder(Some(txn.category.as_str())).to_string(),
                        CATEGORY_STYLE,
                    )),
                ])
                .height(lines),
            );
        }
        self.visible_count = rendered.len().max(1);

        let table = Table::new(
            rendered,
            [
                Constraint::Length(12),
                Constraint::Fill(1),
                Constraint::Length(12),
                Constraint::Length(20),
            ],
        )
        .header(
            Row::new(vec!["DATE", "DESCRIPTION", "AMOUNT", "CATEGORY"])
                .style(FOOTER_STYLE.add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .column_spacing(1);
        frame.render_widget(table, table_area);
    }
}

impl Screen for CategoryBrowser<'_> {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [title_area, sep_area, body_area, status_area, keys_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let source = self
            .session
            .source()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(format!(
                " {source} \u{2014} {} total",
                money(self.session.result().grand_total())
            ))
            .style(HEADER_STYLE),
            title_area,
        );
        frame.render_widget(
            Paragraph::new("\u{2501}".repeat(area.width as usize)).style(FOOTER_STYLE),
            sep_area,
        );

        let [chart_area, table_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(body_area);
        self.draw_chart(frame, chart_area);
        self.draw_table(frame, table_area);

        let status = match &self.status_message {
            Some(msg) => msg.clone(),
            None => {
                let skipped = self.session.skipped();
                format!(
                    " {} transactions, {} rows skipped, {} excluded",
                    self.session.result().transaction_count(),
                    skipped.total(),
                    self.session.result().excluded
                )
            }
        };
        frame.render_widget(Paragraph::new(status), status_area);
        frame.render_widget(
            Paragraph::new(
                " \u{2191}/\u{2193}=category  Enter=select  a=all  space=hide  r=reset  PgUp/PgDn=scroll  q/Esc=quit",
            )
            .style(FOOTER_STYLE),
            keys_area,
        );
    }

    fn handle_key(&mut self, code: KeyCode) -> ScreenAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ScreenAction::Close,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.slices.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter => self.select_cursor(),
            KeyCode::Char('a') => self.select(Selection::All),
            KeyCode::Char(' ') => self.toggle_hidden(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::PageUp => {
                self.offset = self.offset.saturating_sub(self.visible_count);
            }
            KeyCode::PageDown => {
                self.offset = (self.offset + self.visible_count).min(self.max_offset());
            }
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = self.max_offset(),
            _ => {}
        }
        ScreenAction::Continue
    }
}
