//! Rendering functions for the board.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::layout::{BoardLayout, ColumnArea, CARD_HEIGHT, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use super::theme::Theme;
use crate::format::{card_value, format_eur, probability};
use crate::models::Deal;
use crate::pipeline::drag::ActiveDrag;
use crate::pipeline::{Board, Filter, PipelineState, StageColumn, Toast};
use crate::utils::truncate;

const OVERLAY_MAX_WIDTH: u16 = 32;
const TOAST_WIDTH: u16 = 46;
const TOAST_HEIGHT: u16 = 3;
const DETAIL_WIDTH: u16 = 64;
const DETAIL_HEIGHT: u16 = 14;

/// Draw one frame and return the geometry used for hit-testing.
pub fn render_board(frame: &mut Frame, board: &Board, detail: Option<&str>) -> BoardLayout {
    let state = board.state();
    let grouping = state.group_by_stage();
    let layout = BoardLayout::compute(frame.area(), &grouping);
    let drag = board.drag().active();

    render_filter_bar(frame, layout.filter_bar, state);
    for (area, column) in layout.columns.iter().zip(grouping.columns.iter()) {
        render_column(frame, area, column, drag);
    }
    render_footer(
        frame,
        layout.footer,
        board.in_flight(),
        board.last_refresh_error(),
    );
    if let Some(drag) = drag {
        render_drag_overlay(frame, layout.body, drag);
    }
    let toasts: Vec<&Toast> = board.toasts().visible().collect();
    render_toasts(frame, frame.area(), &toasts);
    if let Some(deal) = detail.and_then(|id| state.find_deal(id)) {
        render_detail(frame, frame.area(), deal, state);
    }

    layout
}

fn filter_label(filter: &Filter, name: impl Fn(&str) -> Option<String>) -> String {
    match filter.selected() {
        Some(id) => name(id).unwrap_or_else(|| id.to_string()),
        None => "All".to_string(),
    }
}

pub fn render_filter_bar(frame: &mut Frame, area: Rect, state: &PipelineState) {
    let filters = state.filters();
    let owner = filter_label(&filters.owner, |id| state.owner_name(id));
    let account = filter_label(&filters.account, |id| state.account_name(id).map(str::to_string));

    let mut spans = vec![
        Span::styled(" dealboard ", Theme::header()),
        Span::raw("\u{2502} Owner: "),
        Span::styled(owner, Theme::filter(!filters.owner.is_all())),
        Span::raw("  Account: "),
        Span::styled(account, Theme::filter(!filters.account.is_all())),
    ];
    if filters.is_active() {
        spans.push(Span::styled("  [c] clear filters", Theme::dimmed()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_column(
    frame: &mut Frame,
    area: &ColumnArea,
    column: &StageColumn,
    drag: Option<&ActiveDrag>,
) {
    let key = column.stage.key.as_str();
    let hovered = drag.and_then(|d| d.hover.as_deref()) == Some(column.stage.id.as_str());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::column_border(key, hovered));
    frame.render_widget(block, area.area);

    let label_width = usize::from(area.header.width).saturating_sub(6);
    let header = vec![
        Line::from(vec![
            Span::styled(truncate(&column.stage.label, label_width), Theme::stage_title(key)),
            Span::raw(" "),
            Span::styled(format!("[{}]", column.count()), Theme::dimmed()),
        ]),
        Line::from(Span::styled(format_eur(column.total), Theme::money())),
    ];
    frame.render_widget(Paragraph::new(header), area.header);

    let dragged = drag.map(|d| d.deal.id.as_str());
    for card in &area.cards {
        if let Some(deal) = column.deals.iter().find(|d| d.id == card.deal_id) {
            render_card(frame, card.area, deal, dragged == Some(deal.id.as_str()));
        }
    }

    if let Some(overflow) = area.overflow {
        let more = Paragraph::new(Span::styled(
            format!("+{} more", area.hidden),
            Theme::dimmed(),
        ));
        frame.render_widget(more, overflow);
    }
}

fn card_lines(deal: &Deal, width: usize) -> Vec<Line<'static>> {
    let account = deal.account.as_ref().map(|a| a.name.clone()).unwrap_or_default();
    let contact = deal
        .contact
        .as_ref()
        .map(|c| c.display_name())
        .unwrap_or_default();
    let owner = deal
        .owner
        .as_ref()
        .map(|o| format!("Owner: {}", o.display_name()))
        .unwrap_or_default();

    vec![
        Line::from(Span::styled(truncate(&deal.title, width), Theme::card_title())),
        Line::from(vec![
            Span::styled(card_value(deal.value), Theme::money()),
            Span::raw("  "),
            Span::styled(probability(deal.probability), Theme::dimmed()),
        ]),
        Line::from(truncate(&account, width)),
        Line::from(Span::styled(truncate(&contact, width), Theme::dimmed())),
        Line::from(Span::styled(truncate(&owner, width), Theme::dimmed())),
    ]
}

pub fn render_card(frame: &mut Frame, area: Rect, deal: &Deal, placeholder: bool) {
    let width = usize::from(area.width.saturating_sub(2));
    let (border, body) = if placeholder {
        (Theme::card_placeholder(), Theme::card_placeholder())
    } else {
        (Theme::border(), Style::default())
    };
    let card = Paragraph::new(card_lines(deal, width))
        .style(body)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(card, area);
}

/// Floating copy of the dragged card, anchored at the pointer.
pub fn render_drag_overlay(frame: &mut Frame, bounds: Rect, drag: &ActiveDrag) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let col = (drag.pointer.x / CELL_WIDTH_PX).max(0.0) as u16;
    let row = (drag.pointer.y / CELL_HEIGHT_PX).max(0.0) as u16;
    let width = OVERLAY_MAX_WIDTH.min(bounds.width);
    let height = CARD_HEIGHT.min(bounds.height);
    let max_x = bounds.x + bounds.width - width;
    let max_y = bounds.y + bounds.height - height;
    let area = Rect {
        x: col.clamp(bounds.x, max_x),
        y: row.clamp(bounds.y, max_y),
        width,
        height,
    };

    frame.render_widget(Clear, area);
    let card = Paragraph::new(card_lines(&drag.deal, usize::from(width.saturating_sub(2))))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::drag_overlay()),
        );
    frame.render_widget(card, area);
}

pub fn render_footer(
    frame: &mut Frame,
    area: Rect,
    in_flight: usize,
    last_refresh_error: Option<&str>,
) {
    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::BOLD));
    let mut spans = vec![
        key("o/O"),
        Span::raw(" owner \u{2502} "),
        key("a/A"),
        Span::raw(" account \u{2502} "),
        key("c"),
        Span::raw(" clear \u{2502} "),
        key("r"),
        Span::raw(" reload \u{2502} "),
        key("Esc"),
        Span::raw(" cancel \u{2502} "),
        key("q"),
        Span::raw(" quit"),
    ];
    if in_flight > 0 {
        spans.push(Span::styled(
            format!("   saving ({in_flight})\u{2026}"),
            Theme::filter(true),
        ));
    }
    if let Some(err) = last_refresh_error {
        spans.push(Span::styled("   Reload failed: ", Theme::error()));
        spans.push(Span::styled(err.to_string(), Theme::error()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Stack toasts in the top-right corner, newest at the bottom.
pub fn render_toasts(frame: &mut Frame, screen: Rect, toasts: &[&Toast]) {
    let width = TOAST_WIDTH.min(screen.width);
    let x = screen.x + screen.width - width;
    let mut y = screen.y + 1;

    for toast in toasts {
        if y + TOAST_HEIGHT > screen.y + screen.height {
            break;
        }
        let area = Rect {
            x,
            y,
            width,
            height: TOAST_HEIGHT,
        };
        let text = if toast.description.is_empty() {
            toast.title.clone()
        } else {
            format!("{}: {}", toast.title, toast.description)
        };
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(truncate(&text, usize::from(width.saturating_sub(2))))
                .style(Theme::toast(toast.kind))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Theme::toast(toast.kind)),
                ),
            area,
        );
        y += TOAST_HEIGHT;
    }
}

fn centered(screen: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect {
        x: screen.x + (screen.width - width) / 2,
        y: screen.y + (screen.height - height) / 2,
        width,
        height,
    }
}

pub fn render_detail(frame: &mut Frame, screen: Rect, deal: &Deal, state: &PipelineState) {
    let area = centered(screen, DETAIL_WIDTH, DETAIL_HEIGHT);
    let stage = state
        .stages()
        .get(deal.stage_id())
        .map_or(deal.stage.label.clone(), |s| s.label.clone());
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<16}"), Theme::dimmed()), Span::raw(value)])
    };
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(Span::styled(deal.title.clone(), Theme::header())),
        Line::default(),
        field("Stage", stage),
        field("Value", card_value(deal.value)),
        field("Probability", probability(deal.probability)),
        field("Account", or_dash(deal.account.as_ref().map(|a| a.name.clone()))),
        field("Contact", or_dash(deal.contact.as_ref().map(|c| c.display_name()))),
        field("Owner", or_dash(deal.owner.as_ref().map(|o| o.display_name()))),
        field(
            "Expected close",
            or_dash(deal.expected_close_date.map(|d| d.format("%d/%m/%Y").to_string())),
        ),
        field(
            "Created",
            or_dash(deal.date_created.map(|d| d.format("%d/%m/%Y %H:%M").to_string())),
        ),
        Line::default(),
        Line::from(Span::styled("Enter/Esc to close", Theme::dimmed())),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", deal.id))
                .border_style(Theme::header()),
        ),
        area,
    );
}
