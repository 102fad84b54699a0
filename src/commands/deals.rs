//! `dealboard deals list|move`.

use std::cell::RefCell;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::error::BoardError;
use crate::format::{card_value, format_eur, probability};
use crate::models::{BoardSnapshot, Deal, StageCatalog};
use crate::pipeline::persist::persist_move;
use crate::pipeline::state::group_by_stage;
use crate::pipeline::{BoardEvent, DragController, DropOutcome, MoveRequest, PipelineState, StageMover};
use crate::store::{fetch_board_data, DealQuery, DealStore};
use crate::utils::truncate;

use super::common::{open_store, outcome_marker};

const TITLE_WIDTH: usize = 36;

/// Print the grouped pipeline.
pub fn list(
    config: &Config,
    demo: bool,
    owner: Option<String>,
    account: Option<String>,
    stage: Option<String>,
) -> Result<()> {
    let store = open_store(config, demo)?;
    let catalog = StageCatalog::new(store.fetch_stages().context("Failed to fetch stages")?);

    let stage_id = match stage {
        Some(wanted) => Some(
            catalog
                .resolve(&wanted)
                .map(|s| s.id.clone())
                .ok_or_else(|| anyhow!("Unknown stage '{wanted}'"))?,
        ),
        None => None,
    };

    let query = DealQuery {
        owner,
        account,
        stage: stage_id.clone(),
        ..DealQuery::default()
    };
    let deals = store.fetch_deals(&query).context("Failed to fetch deals")?;
    let snapshot = BoardSnapshot::new(catalog, deals);
    let visible: Vec<&Deal> = snapshot.deals.iter().collect();
    let grouping = group_by_stage(&visible, &snapshot.stages);

    for column in &grouping.columns {
        if stage_id.as_deref().is_some_and(|id| id != column.stage.id) {
            continue;
        }
        let header = format!(
            "{} ({})  {}",
            column.stage.label,
            column.count(),
            format_eur(column.total)
        );
        let header = match outcome_marker(&column.stage) {
            "won" => header.green().bold(),
            "lost" => header.red().bold(),
            _ => header.bold(),
        };
        println!("\n{header}");

        if column.deals.is_empty() {
            println!("  {}", "(no deals)".dimmed());
        }
        for deal in &column.deals {
            print_deal(deal);
        }
    }

    println!(
        "\n{} {} deals, {}",
        "Total:".bold(),
        grouping.deal_count(),
        format_eur(grouping.grand_total())
    );
    Ok(())
}

fn print_deal(deal: &Deal) {
    let title = format!("{:width$}", truncate(&deal.title, TITLE_WIDTH), width = TITLE_WIDTH);
    let account = deal
        .account
        .as_ref()
        .map(|a| a.name.clone())
        .unwrap_or_default();
    let owner = deal
        .owner
        .as_ref()
        .map(|o| format!("Owner: {}", o.display_name()))
        .unwrap_or_default();
    println!(
        "  {}  {:>12}  {:>4}  {}  {}  {}",
        title,
        card_value(deal.value),
        probability(deal.probability),
        account,
        owner.dimmed(),
        deal.id.dimmed()
    );
}

/// Runs the write on the calling thread and keeps what it reported.
struct InlineMover<'a> {
    store: &'a dyn DealStore,
    query: &'a DealQuery,
    events: RefCell<Vec<BoardEvent>>,
    failure: RefCell<Option<BoardError>>,
}

impl StageMover for InlineMover<'_> {
    fn move_deal(&self, request: MoveRequest) {
        let mut events = self.events.borrow_mut();
        if let Err(err) = persist_move(self.store, self.query, &request, |e| events.push(e)) {
            *self.failure.borrow_mut() = Some(err);
        }
    }
}

/// Move one deal, exactly as a drop on the board would.
pub fn move_deal(config: &Config, demo: bool, deal_id: &str, stage: &str) -> Result<()> {
    let store = open_store(config, demo)?;
    let query = DealQuery::default();
    let data = fetch_board_data(store.as_ref(), &query).context("Failed to load pipeline")?;
    let state = PipelineState::new(data);

    let target = state
        .stages()
        .resolve(stage)
        .ok_or_else(|| anyhow!("Unknown stage '{stage}'"))?
        .clone();
    if state.find_deal(deal_id).is_none() {
        bail!("Deal '{deal_id}' not found");
    }

    let mover = InlineMover {
        store: store.as_ref(),
        query: &query,
        events: RefCell::new(Vec::new()),
        failure: RefCell::new(None),
    };
    let mut controller = DragController::default();
    controller.on_drag_start(deal_id, &state);
    let outcome = controller.on_drag_end(deal_id, Some(&target.id), &state, &mover);

    match outcome {
        DropOutcome::SameStage => {
            println!(
                "{} Deal '{deal_id}' is already in {}",
                "=".dimmed(),
                target.label.bold()
            );
            Ok(())
        }
        DropOutcome::NoTarget | DropOutcome::Stale => {
            bail!("Deal '{deal_id}' could not be moved")
        }
        DropOutcome::Dispatched(request) => {
            if let Some(err) = mover.failure.into_inner() {
                println!("{} {}", "✗".red(), err);
                return Err(err).context("Stage update failed");
            }
            let from = state
                .stages()
                .get(&request.from_stage)
                .map_or(request.from_stage.as_str(), |s| s.label.as_str());
            println!(
                "{} Moved '{deal_id}': {} → {}",
                "✓".green(),
                from,
                target.label.bold()
            );
            report_reconcile(&mover.events.into_inner(), deal_id);
            Ok(())
        }
    }
}

fn report_reconcile(events: &[BoardEvent], deal_id: &str) {
    for event in events {
        match event {
            BoardEvent::Refreshed { snapshot, .. } => {
                if let Some(deal) = snapshot.deal(deal_id) {
                    let label = snapshot
                        .stages
                        .get(deal.stage_id())
                        .map_or(deal.stage_id(), |s| s.label.as_str());
                    println!("  {} {}", "Backend now reports:".dimmed(), label);
                }
            }
            BoardEvent::RefreshFailed { reason, .. } => {
                println!("  {} {}", "Could not reload pipeline:".yellow(), reason);
            }
            _ => {}
        }
    }
}
