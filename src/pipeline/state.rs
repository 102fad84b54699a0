//! Pipeline view state: filters, per-stage grouping and totals.
//!
//! Everything here is a pure function of (snapshot, filters). Nothing is
//! cached, so a new snapshot or filter value is reflected on the next call.

use crate::models::{AccountRef, BoardData, BoardSnapshot, Deal, PersonRef, Stage, StageCatalog};

use super::filter::Filter;

/// Owner and account filters, applied by intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub owner: Filter,
    pub account: Filter,
}

impl Filters {
    pub fn matches(&self, deal: &Deal) -> bool {
        self.owner.matches(deal.owner_id()) && self.account.matches(deal.account_id())
    }

    pub fn is_active(&self) -> bool {
        !self.owner.is_all() || !self.account.is_all()
    }
}

/// Deals passing the filters, in source order.
pub fn filter_deals<'a>(deals: &'a [Deal], filters: &Filters) -> Vec<&'a Deal> {
    deals.iter().filter(|d| filters.matches(d)).collect()
}

/// One board column.
#[derive(Debug, Clone, PartialEq)]
pub struct StageColumn {
    pub stage: Stage,
    pub deals: Vec<Deal>,
    pub total: f64,
}

impl StageColumn {
    pub fn count(&self) -> usize {
        self.deals.len()
    }

    pub fn deal_ids(&self) -> Vec<&str> {
        self.deals.iter().map(|d| d.id.as_str()).collect()
    }
}

/// Columns in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub columns: Vec<StageColumn>,
}

impl Grouping {
    pub fn column(&self, stage_id: &str) -> Option<&StageColumn> {
        self.columns.iter().find(|c| c.stage.id == stage_id)
    }

    /// Sum of values in a column; unknown stages total zero.
    pub fn total(&self, stage_id: &str) -> f64 {
        self.column(stage_id).map_or(0.0, |c| c.total)
    }

    pub fn deal_ids(&self, stage_id: &str) -> Vec<&str> {
        self.column(stage_id).map(StageColumn::deal_ids).unwrap_or_default()
    }

    /// Column currently holding a deal.
    pub fn locate(&self, deal_id: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.deals.iter().any(|d| d.id == deal_id))
            .map(|c| c.stage.id.as_str())
    }

    /// Deals shown across all columns.
    pub fn deal_count(&self) -> usize {
        self.columns.iter().map(StageColumn::count).sum()
    }

    pub fn grand_total(&self) -> f64 {
        self.columns.iter().map(|c| c.total).sum()
    }
}

/// Group deals into catalog columns.
///
/// Deals whose stage is not in the catalog land in no column, so they are
/// excluded from both listings and totals.
pub fn group_by_stage(deals: &[&Deal], stages: &StageCatalog) -> Grouping {
    let columns = stages
        .iter()
        .map(|stage| {
            let deals: Vec<Deal> = deals
                .iter()
                .filter(|d| d.stage_id() == stage.id)
                .map(|d| (*d).clone())
                .collect();
            let total = deals.iter().map(Deal::value_or_zero).sum();
            StageColumn {
                stage: stage.clone(),
                deals,
                total,
            }
        })
        .collect();
    Grouping { columns }
}

/// Client-side board state derived from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    snapshot: BoardSnapshot,
    owners: Vec<PersonRef>,
    accounts: Vec<AccountRef>,
    filters: Filters,
}

impl PipelineState {
    pub fn new(data: BoardData) -> Self {
        Self {
            snapshot: data.snapshot,
            owners: data.owners,
            accounts: data.accounts,
            filters: Filters::default(),
        }
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn stages(&self) -> &StageCatalog {
        &self.snapshot.stages
    }

    pub fn owners(&self) -> &[PersonRef] {
        &self.owners
    }

    pub fn accounts(&self) -> &[AccountRef] {
        &self.accounts
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Swap in a freshly fetched snapshot. Filters are kept.
    pub fn replace_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.snapshot = snapshot;
    }

    pub fn set_owner_filter(&mut self, filter: Filter) {
        self.filters.owner = filter;
    }

    pub fn set_account_filter(&mut self, filter: Filter) {
        self.filters.account = filter;
    }

    pub fn clear_filters(&mut self) {
        self.filters = Filters::default();
    }

    pub fn cycle_owner_filter(&mut self, forward: bool) {
        let next = self
            .filters
            .owner
            .cycle(self.owners.iter().map(|o| o.id.as_str()), forward);
        self.filters.owner = next;
    }

    pub fn cycle_account_filter(&mut self, forward: bool) {
        let next = self
            .filters
            .account
            .cycle(self.accounts.iter().map(|a| a.id.as_str()), forward);
        self.filters.account = next;
    }

    pub fn filtered_deals(&self) -> Vec<&Deal> {
        filter_deals(&self.snapshot.deals, &self.filters)
    }

    pub fn group_by_stage(&self) -> Grouping {
        group_by_stage(&self.filtered_deals(), &self.snapshot.stages)
    }

    pub fn stage_total(&self, stage_id: &str) -> f64 {
        self.group_by_stage().total(stage_id)
    }

    /// Look a deal up among the currently visible (filtered) deals.
    pub fn find_filtered(&self, deal_id: &str) -> Option<&Deal> {
        self.snapshot
            .deals
            .iter()
            .find(|d| d.id == deal_id && self.filters.matches(d))
    }

    /// Look a deal up in the full snapshot, ignoring filters.
    pub fn find_deal(&self, deal_id: &str) -> Option<&Deal> {
        self.snapshot.deal(deal_id)
    }

    pub fn owner_name(&self, owner_id: &str) -> Option<String> {
        self.owners
            .iter()
            .find(|o| o.id == owner_id)
            .map(PersonRef::display_name)
    }

    pub fn account_name(&self, account_id: &str) -> Option<&str> {
        self.accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageRef;

    fn stages() -> StageCatalog {
        StageCatalog::new(vec![
            Stage::new("s2", "won", "Won").with_sort(2),
            Stage::new("s1", "lead", "Lead").with_sort(1),
        ])
    }

    fn deal(id: &str, stage: &str, value: Option<f64>) -> Deal {
        let mut deal = Deal::new(id, id.to_uppercase(), StageRef::new(stage, "", ""));
        deal.value = value;
        deal
    }

    fn state(deals: Vec<Deal>) -> PipelineState {
        PipelineState::new(BoardData {
            snapshot: BoardSnapshot::new(stages(), deals),
            owners: vec![
                PersonRef::new("u1", "Ana", "García"),
                PersonRef::new("u2", "Marc", "Puig"),
            ],
            accounts: vec![AccountRef::new("a1", "Acme")],
        })
    }

    #[test]
    fn test_grouping_basic_scenario() {
        let state = state(vec![
            deal("d1", "s1", Some(1000.0)),
            deal("d2", "s1", None),
        ]);

        let grouping = state.group_by_stage();
        assert_eq!(grouping.columns.len(), 2);
        assert_eq!(grouping.columns[0].stage.id, "s1");
        assert_eq!(grouping.deal_ids("s1"), vec!["d1", "d2"]);
        assert!(grouping.deal_ids("s2").is_empty());
        assert_eq!(state.stage_total("s1"), 1000.0);
        assert_eq!(state.stage_total("s2"), 0.0);
    }

    #[test]
    fn test_unknown_stage_is_dropped_everywhere() {
        let state = state(vec![
            deal("d1", "s1", Some(10.0)),
            deal("ghost", "s404", Some(99.0)),
            deal("blank", "", Some(5.0)),
        ]);

        let grouping = state.group_by_stage();
        assert_eq!(grouping.deal_count(), 1);
        assert_eq!(grouping.locate("ghost"), None);
        assert_eq!(grouping.grand_total(), 10.0);
        assert_eq!(state.stage_total("s404"), 0.0);
    }

    #[test]
    fn test_grouping_keeps_source_order() {
        let state = state(vec![
            deal("d3", "s2", None),
            deal("d1", "s2", None),
            deal("d2", "s2", None),
        ]);
        assert_eq!(state.group_by_stage().deal_ids("s2"), vec!["d3", "d1", "d2"]);
    }

    #[test]
    fn test_owner_and_account_filters_intersect() {
        let mut a = deal("d1", "s1", Some(1.0));
        a.owner = Some(PersonRef::new("u1", "Ana", "García"));
        a.account = Some(AccountRef::new("a1", "Acme"));
        let mut b = deal("d2", "s1", Some(2.0));
        b.owner = Some(PersonRef::new("u1", "Ana", "García"));
        let c = deal("d3", "s1", Some(4.0));

        let mut state = state(vec![a, b, c]);
        state.set_owner_filter(Filter::only("u1"));
        let ids: Vec<&str> = state.filtered_deals().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2"]);

        state.set_account_filter(Filter::only("a1"));
        let ids: Vec<&str> = state.filtered_deals().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1"]);
        assert_eq!(state.stage_total("s1"), 1.0);
        assert!(state.filters().is_active());

        state.clear_filters();
        assert_eq!(state.filtered_deals().len(), 3);
        assert!(!state.filters().is_active());
    }

    #[test]
    fn test_find_filtered_respects_filters() {
        let mut owned = deal("d1", "s1", None);
        owned.owner = Some(PersonRef::new("u1", "Ana", "García"));
        let mut state = state(vec![owned, deal("d2", "s1", None)]);

        state.set_owner_filter(Filter::only("u1"));
        assert!(state.find_filtered("d1").is_some());
        assert!(state.find_filtered("d2").is_none());
        assert!(state.find_deal("d2").is_some());
    }

    #[test]
    fn test_replace_snapshot_keeps_filters() {
        let mut state = state(vec![deal("d1", "s1", None)]);
        state.set_owner_filter(Filter::only("u2"));
        state.replace_snapshot(BoardSnapshot::new(stages(), vec![deal("d1", "s2", None)]));
        assert_eq!(state.filters().owner, Filter::only("u2"));
        assert_eq!(state.find_deal("d1").map(Deal::stage_id), Some("s2"));
    }

    #[test]
    fn test_cycle_filters_through_reference_lists() {
        let mut state = state(vec![]);
        state.cycle_owner_filter(true);
        assert_eq!(state.filters().owner, Filter::only("u1"));
        state.cycle_owner_filter(false);
        assert_eq!(state.filters().owner, Filter::All);
        state.cycle_account_filter(false);
        assert_eq!(state.filters().account, Filter::only("a1"));
        assert_eq!(state.owner_name("u2").as_deref(), Some("Marc Puig"));
        assert_eq!(state.account_name("a1"), Some("Acme"));
    }
}
