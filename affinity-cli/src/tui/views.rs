//! Rendering for the queue and summary screens

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
};

use super::app::App;
use crate::api::CrmGateway;
use crate::services::format::{EMPTY, display_field};
use crate::services::summary::TOTAL;
use crate::services::{ReviewCounts, StatusSummary, summarize};
use crate::session::{BannerKind, View};

const QUEUE_HELP: &str =
    "←/→ browse  t track  x pass  p/c/r/d filters  Tab summary  R refresh  q quit";
const SUMMARY_HELP: &str = "Tab queue  R refresh  q quit";

pub fn draw<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tabs(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
    match app.session.view {
        View::Queue => draw_queue(frame, app, chunks[2]),
        View::Summary => draw_summary(frame, app, chunks[2]),
    }

    let help = match app.session.view {
        View::Queue => QUEUE_HELP,
        View::Summary => SUMMARY_HELP,
    };
    let muted = Style::default().fg(Color::DarkGray);
    frame.render_widget(Paragraph::new(help).style(muted), chunks[3]);

    if app.session.picker.visible {
        draw_picker(frame, app);
    }
}

fn draw_tabs<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>, area: Rect) {
    let selected = View::ALL
        .iter()
        .position(|v| *v == app.session.view)
        .unwrap_or(0);
    let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()))
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(" Affinity "))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

/// One line: the banner if any, otherwise loading progress
fn draw_status<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>, area: Rect) {
    let muted = Style::default().fg(Color::DarkGray);
    let line = if let Some(banner) = &app.session.banner {
        let color = match banner.kind {
            BannerKind::Info => Color::Blue,
            BannerKind::Success => Color::Green,
            BannerKind::Warning => Color::Yellow,
            BannerKind::Error => Color::Red,
        };
        Line::from(Span::styled(banner.message.clone(), Style::default().fg(color)))
    } else if app.is_loading() {
        let (loaded, total) = app.loading_progress();
        Line::styled(format!("Loading {}/{}", loaded, total), muted)
    } else {
        Line::styled(format!("{} deals loaded", app.session.deals.len()), muted)
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_queue<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>, area: Rect) {
    let ctx = app.ctx;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let filter_style = if app.session.filter.is_unfiltered() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let filter = Paragraph::new(app.session.filter.describe())
        .style(filter_style)
        .block(Block::default().borders(Borders::ALL).title(" Filters "));
    frame.render_widget(filter, chunks[0]);

    let filtered = app.session.filtered(&ctx.roles, app.today);
    let Some(idx) = app.session.current(&ctx.roles, app.today) else {
        let message = if app.is_loading() {
            "Loading deals..."
        } else {
            "No deals match the current filters"
        };
        let empty = Paragraph::new(message)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, chunks[1]);
        return;
    };

    let deal = &app.session.deals[idx];
    let position = filtered.iter().position(|&i| i == idx).unwrap_or(0) + 1;

    let mut rows = vec![
        Row::new(vec![
            Cell::from("Domain"),
            Cell::from(deal.domain().unwrap_or(EMPTY).to_string()),
        ]),
        Row::new(vec![
            Cell::from("Tracking"),
            Cell::from(deal.tracking_status.to_string()),
        ]),
    ];
    for mapping in &ctx.config.fields.map {
        let text = deal
            .value(&mapping.name)
            .map(|v| display_field(&mapping.name, v, &ctx.roles, &ctx.people))
            .unwrap_or_else(|| EMPTY.to_string());
        rows.push(Row::new(vec![Cell::from(mapping.name.clone()), Cell::from(text)]));
    }

    let title = format!(" {} ({}/{}) ", deal.name(), position, filtered.len());
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))))
        .column_spacing(2);
    frame.render_widget(table, chunks[1]);
}

fn counts_cell(counts: ReviewCounts) -> Cell<'static> {
    Cell::from(format!("{} / {}", counts.reviewed, counts.unreviewed))
}

fn draw_summary<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>, area: Rect) {
    let ctx = app.ctx;
    let summary = summarize(
        &app.session.deals,
        &ctx.roles,
        &ctx.config.profiles,
        &ctx.config.categories,
    );

    let mut header = vec![Cell::from("Profile")];
    header.extend(summary.categories().iter().map(|c| Cell::from(c.clone())));
    header.push(Cell::from(TOTAL));

    let rows: Vec<Row> = summary
        .rows()
        .into_iter()
        .map(|row| {
            let mut cells = vec![Cell::from(row.profile.clone())];
            cells.extend(row.cells.iter().map(|(_, counts)| counts_cell(*counts)));
            cells.push(counts_cell(row.total));
            let row_widget = Row::new(cells);
            if row.profile == TOTAL {
                row_widget.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                row_widget
            }
        })
        .collect();

    let mut widths = vec![Constraint::Length(profile_column_width(&summary))];
    widths.extend(std::iter::repeat_n(
        Constraint::Min(10),
        summary.categories().len() + 1,
    ));

    let suffix = if app.is_loading() { ", loading" } else { "" };
    let title = format!(
        " Reviewed / not reviewed ({} deals{}) ",
        summary.grand_total().total(),
        suffix
    );
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// Wide enough for the longest profile name, the header and `TOTAL`
fn profile_column_width(summary: &StatusSummary) -> u16 {
    let longest = summary
        .profiles()
        .iter()
        .map(|p| p.chars().count())
        .chain(["Profile".len(), TOTAL.len()])
        .max()
        .unwrap_or_default();
    u16::try_from(longest + 2).unwrap_or(u16::MAX)
}

fn draw_picker<G: CrmGateway>(frame: &mut Frame, app: &App<'_, G>) {
    let people = app.ctx.people.assignable();
    let height = people.len() as u16 + 2;
    let area = centered_rect(40, height, frame.area());

    let items: Vec<ListItem> = people.iter().map(|p| ListItem::new(p.as_str())).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Track for "))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.session.picker.selected));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
