//! Screen geometry and hit-testing.
//!
//! The drag controller works in logical pixels; terminal cells are mapped
//! to a fixed 8x16 grid so the activation distance keeps its meaning.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::pipeline::{Grouping, Point};

pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub const FILTER_BAR_HEIGHT: u16 = 1;
pub const FOOTER_HEIGHT: u16 = 1;

/// Label/count line plus total line.
pub const COLUMN_HEADER_HEIGHT: u16 = 2;

/// Border plus title, value/probability, account, contact and owner lines.
pub const CARD_HEIGHT: u16 = 7;

pub fn cell_to_point(column: u16, row: u16) -> Point {
    Point::new(
        f64::from(column) * CELL_WIDTH_PX,
        f64::from(row) * CELL_HEIGHT_PX,
    )
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardArea {
    pub deal_id: String,
    pub area: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnArea {
    pub stage_id: String,
    /// Whole column including its border.
    pub area: Rect,
    pub header: Rect,
    pub cards: Vec<CardArea>,
    /// Cards that did not fit.
    pub hidden: usize,
    /// Where the "+N more" line goes when `hidden > 0`.
    pub overflow: Option<Rect>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardLayout {
    pub filter_bar: Rect,
    pub body: Rect,
    pub footer: Rect,
    pub columns: Vec<ColumnArea>,
}

impl BoardLayout {
    pub fn compute(area: Rect, grouping: &Grouping) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FILTER_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);
        let (filter_bar, body, footer) = (chunks[0], chunks[1], chunks[2]);

        let count = grouping.columns.len();
        let columns = if count == 0 {
            Vec::new()
        } else {
            let constraints = vec![Constraint::Ratio(1, count as u32); count];
            let areas = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(constraints)
                .split(body);
            grouping
                .columns
                .iter()
                .zip(areas.iter())
                .map(|(column, area)| {
                    let ids: Vec<&str> = column.deals.iter().map(|d| d.id.as_str()).collect();
                    layout_column(&column.stage.id, *area, &ids)
                })
                .collect()
        };

        Self {
            filter_bar,
            body,
            footer,
            columns,
        }
    }

    /// Stage whose column contains the cell.
    pub fn column_at(&self, column: u16, row: u16) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| contains(c.area, column, row))
            .map(|c| c.stage_id.as_str())
    }

    /// Deal whose card contains the cell.
    pub fn card_at(&self, column: u16, row: u16) -> Option<&str> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| contains(card.area, column, row))
            .map(|card| card.deal_id.as_str())
    }

    pub fn card(&self, deal_id: &str) -> Option<&CardArea> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.deal_id == deal_id)
    }
}

fn layout_column(stage_id: &str, area: Rect, deal_ids: &[&str]) -> ColumnArea {
    let inner = Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    let header = Rect {
        height: inner.height.min(COLUMN_HEADER_HEIGHT),
        ..inner
    };
    let avail = inner.height.saturating_sub(header.height);
    let top = header.y.saturating_add(header.height);

    let fits_all = usize::from(avail / CARD_HEIGHT);
    let (shown, overflow) = if deal_ids.len() <= fits_all {
        (deal_ids.len(), None)
    } else {
        let shown = usize::from(avail.saturating_sub(1) / CARD_HEIGHT);
        let y = top.saturating_add(shown as u16 * CARD_HEIGHT);
        (
            shown,
            Some(Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1.min(avail),
            }),
        )
    };

    let cards = deal_ids
        .iter()
        .take(shown)
        .enumerate()
        .map(|(i, id)| CardArea {
            deal_id: (*id).to_string(),
            area: Rect {
                x: inner.x,
                y: top.saturating_add(i as u16 * CARD_HEIGHT),
                width: inner.width,
                height: CARD_HEIGHT,
            },
        })
        .collect();

    ColumnArea {
        stage_id: stage_id.to_string(),
        area,
        header,
        cards,
        hidden: deal_ids.len() - shown,
        overflow,
    }
}
