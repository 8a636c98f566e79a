//! Selector state and its transition function.
//!
//! The state is a plain value and [`reduce`] is a pure function from
//! `(state, event)` to the next state plus the fetch to start, if any.
//! Every level carries a request token; a fetch result is applied only
//! when its ticket's token is still the level's current token, so results
//! land in selection order rather than completion order.

use crate::error::{FetchError, SelectorError};
use crate::ids::OptionId;
use crate::vehicle::{Level, VehicleOption, VehicleSelection};
use serde::Serialize;

/// Loading status of one level's option list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum LevelStatus {
    /// Nothing requested.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Options are available.
    Loaded(Vec<VehicleOption>),
    /// The last fetch failed; retry with a reload.
    Error(String),
}

impl LevelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelStatus::Idle => "idle",
            LevelStatus::Loading => "loading",
            LevelStatus::Loaded(_) => "loaded",
            LevelStatus::Error(_) => "error",
        }
    }
}

/// What a caller sees at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelView<'a> {
    Unselected,
    Loading,
    Loaded(&'a [VehicleOption]),
    Error(&'a str),
    Selected(&'a VehicleOption),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LevelSlot {
    status: LevelStatus,
    token: u64,
}

impl LevelSlot {
    /// Drop the options and invalidate any fetch in flight.
    fn reset(&mut self) {
        self.status = LevelStatus::Idle;
        self.token += 1;
    }

    fn begin_load(&mut self) -> u64 {
        self.status = LevelStatus::Loading;
        self.token += 1;
        self.token
    }
}

/// A fetch the caller must run against the options provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FetchTicket {
    /// Level whose options are requested.
    pub level: Level,
    /// Parent option id (`None` for brands).
    pub parent_id: Option<OptionId>,
    /// Token captured at issue time.
    pub token: u64,
}

/// Input to [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent {
    /// Choose an option from the level's loaded list.
    Select { level: Level, option_id: OptionId },
    /// Re-issue the fetch for a level (initial brand load, or retry after an error).
    Reload(Level),
    /// Reset everything to the initial empty state.
    Clear,
    /// A fetch finished.
    Resolved {
        ticket: FetchTicket,
        outcome: Result<Vec<VehicleOption>, FetchError>,
    },
}

/// How a resolved fetch was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    Applied { level: Level, options: usize },
    Failed { level: Level, reason: String },
    Stale { level: Level, token: u64 },
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The next state.
    pub state: SelectorState,
    /// Fetch to start, if the transition requested one.
    pub fetch: Option<FetchTicket>,
    /// Outcome of a `Resolved` event.
    pub resolution: Option<Resolution>,
}

/// The whole cascade: selection plus per-level option status and tokens.
///
/// A level below the deepest chosen level's child is always `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorState {
    selection: VehicleSelection,
    slots: [LevelSlot; Level::COUNT],
}

impl SelectorState {
    /// The initial state: nothing chosen, nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current selection.
    pub fn selection(&self) -> &VehicleSelection {
        &self.selection
    }

    pub fn status_for(&self, level: Level) -> &LevelStatus {
        &self.slots[level.index()].status
    }

    /// Loaded options for a level; empty unless the level is loaded.
    pub fn options_for(&self, level: Level) -> &[VehicleOption] {
        match self.status_for(level) {
            LevelStatus::Loaded(options) => options,
            _ => &[],
        }
    }

    /// Current request token of a level.
    pub fn token_for(&self, level: Level) -> u64 {
        self.slots[level.index()].token
    }

    pub fn is_complete(&self) -> bool {
        self.selection.is_complete()
    }

    pub fn view(&self, level: Level) -> LevelView<'_> {
        if let Some(option) = self.selection.get(level) {
            return LevelView::Selected(option);
        }
        match self.status_for(level) {
            LevelStatus::Idle => LevelView::Unselected,
            LevelStatus::Loading => LevelView::Loading,
            LevelStatus::Loaded(options) => LevelView::Loaded(options),
            LevelStatus::Error(reason) => LevelView::Error(reason),
        }
    }

    /// Find a loaded option by id.
    pub fn find_option(&self, level: Level, option_id: &OptionId) -> Option<&VehicleOption> {
        self.options_for(level).iter().find(|o| &o.id == option_id)
    }

    pub(crate) fn select(
        &mut self,
        level: Level,
        option_id: OptionId,
    ) -> Result<Option<FetchTicket>, SelectorError> {
        let option = self
            .find_option(level, &option_id)
            .cloned()
            .ok_or(SelectorError::InvalidOption { level, option_id })?;
        let parent_id = option.id.clone();

        self.selection = self.selection.truncated(level).extended(option)?;

        let next = level.next();
        let mut ticket = None;
        for deeper in level.deeper() {
            let slot = &mut self.slots[deeper.index()];
            if Some(deeper) == next {
                let token = slot.begin_load();
                ticket = Some(FetchTicket {
                    level: deeper,
                    parent_id: Some(parent_id.clone()),
                    token,
                });
            } else {
                slot.reset();
            }
        }
        Ok(ticket)
    }

    pub(crate) fn reload(&mut self, level: Level) -> Result<FetchTicket, SelectorError> {
        let parent_id = self.selection.parent_for(level)?;
        self.selection = self.selection.truncated(level);
        for deeper in level.deeper() {
            self.slots[deeper.index()].reset();
        }
        let token = self.slots[level.index()].begin_load();
        Ok(FetchTicket {
            level,
            parent_id,
            token,
        })
    }

    pub(crate) fn clear(&mut self) {
        self.selection = VehicleSelection::empty();
        for slot in &mut self.slots {
            slot.reset();
        }
    }

    pub(crate) fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<VehicleOption>, FetchError>,
    ) -> Resolution {
        let slot = &mut self.slots[ticket.level.index()];
        if slot.token != ticket.token || slot.status != LevelStatus::Loading {
            return Resolution::Stale {
                level: ticket.level,
                token: ticket.token,
            };
        }

        match outcome {
            Ok(options) => {
                let count = options.len();
                slot.status = LevelStatus::Loaded(options);
                Resolution::Applied {
                    level: ticket.level,
                    options: count,
                }
            }
            Err(e) => {
                let reason = e.to_string();
                slot.status = LevelStatus::Error(reason.clone());
                Resolution::Failed {
                    level: ticket.level,
                    reason,
                }
            }
        }
    }
}

/// Compute the next state for an event.
///
/// Only `Select` on an option that is not loaded, and `Reload` of a level
/// whose parent is unchosen, are rejected; the input state is never modified.
pub fn reduce(state: &SelectorState, event: SelectorEvent) -> Result<Transition, SelectorError> {
    let mut next = state.clone();
    let mut fetch = None;
    let mut resolution = None;

    match event {
        SelectorEvent::Select { level, option_id } => {
            fetch = next.select(level, option_id)?;
        }
        SelectorEvent::Reload(level) => {
            fetch = Some(next.reload(level)?);
        }
        SelectorEvent::Clear => next.clear(),
        SelectorEvent::Resolved { ticket, outcome } => {
            resolution = Some(next.resolve(&ticket, outcome));
        }
    }

    Ok(Transition {
        state: next,
        fetch,
        resolution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> Vec<VehicleOption> {
        vec![
            VehicleOption::root("bmw", "BMW"),
            VehicleOption::root("audi", "Audi"),
        ]
    }

    fn models(brand: &str) -> Vec<VehicleOption> {
        let parent = OptionId::new(brand);
        match brand {
            "bmw" => vec![
                VehicleOption::child(&parent, "bmw-3", "3 Series"),
                VehicleOption::child(&parent, "bmw-5", "5 Series"),
            ],
            _ => vec![VehicleOption::child(&parent, "audi-a4", "A4")],
        }
    }

    fn years(model: &str) -> Vec<VehicleOption> {
        let parent = OptionId::new(model);
        vec![
            VehicleOption::child(&parent, format!("{model}:2015"), "2015"),
            VehicleOption::child(&parent, format!("{model}:2016"), "2016"),
        ]
    }

    fn step(state: &SelectorState, event: SelectorEvent) -> Transition {
        reduce(state, event).unwrap()
    }

    fn select(state: &SelectorState, level: Level, id: &str) -> Transition {
        step(
            state,
            SelectorEvent::Select {
                level,
                option_id: OptionId::new(id),
            },
        )
    }

    fn resolve(state: &SelectorState, ticket: FetchTicket, options: Vec<VehicleOption>) -> Transition {
        step(
            state,
            SelectorEvent::Resolved {
                ticket,
                outcome: Ok(options),
            },
        )
    }

    /// State with brands loaded.
    fn with_brands() -> SelectorState {
        let t = step(&SelectorState::new(), SelectorEvent::Reload(Level::Brand));
        let ticket = t.fetch.unwrap();
        resolve(&t.state, ticket, brands()).state
    }

    /// State with BMW / 3 Series chosen and years loaded.
    fn with_years() -> SelectorState {
        let t = select(&with_brands(), Level::Brand, "bmw");
        let t = resolve(&t.state, t.fetch.unwrap(), models("bmw"));
        let t = select(&t.state, Level::Model, "bmw-3");
        resolve(&t.state, t.fetch.unwrap(), years("bmw-3")).state
    }

    #[test]
    fn test_initial_state() {
        let state = SelectorState::new();
        for level in Level::ALL {
            assert_eq!(state.view(level), LevelView::Unselected);
            assert_eq!(state.token_for(level), 0);
        }
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_brand_load() {
        let t = step(&SelectorState::new(), SelectorEvent::Reload(Level::Brand));
        let ticket = t.fetch.clone().unwrap();
        assert_eq!(ticket.level, Level::Brand);
        assert_eq!(ticket.parent_id, None);
        assert_eq!(t.state.view(Level::Brand), LevelView::Loading);

        let t = resolve(&t.state, ticket, brands());
        assert_eq!(
            t.resolution,
            Some(Resolution::Applied {
                level: Level::Brand,
                options: 2
            })
        );
        assert_eq!(t.state.options_for(Level::Brand).len(), 2);
    }

    #[test]
    fn test_select_issues_fetch_for_next_level() {
        let t = select(&with_brands(), Level::Brand, "bmw");
        let ticket = t.fetch.unwrap();
        assert_eq!(ticket.level, Level::Model);
        assert_eq!(ticket.parent_id, Some(OptionId::new("bmw")));
        assert_eq!(t.state.status_for(Level::Model), &LevelStatus::Loading);
        assert_eq!(t.state.selection().brand().unwrap().id.as_str(), "bmw");
    }

    #[test]
    fn test_select_unknown_option_rejected() {
        let state = with_brands();
        let err = reduce(
            &state,
            SelectorEvent::Select {
                level: Level::Brand,
                option_id: OptionId::new("lada"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SelectorError::InvalidOption { level: Level::Brand, .. }));
    }

    #[test]
    fn test_select_before_load_rejected() {
        let err = reduce(
            &SelectorState::new(),
            SelectorEvent::Select {
                level: Level::Brand,
                option_id: OptionId::new("bmw"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, SelectorError::InvalidOption { .. }));
    }

    #[test]
    fn test_cascade_reset() {
        let state = with_years();
        let t = select(&state, Level::Year, "bmw-3:2015");
        assert_eq!(t.state.selection().depth(), 3);

        // Changing the brand drops model, year and engine.
        let t = select(&t.state, Level::Brand, "audi");
        assert_eq!(t.state.selection().depth(), 1);
        assert_eq!(t.state.view(Level::Model), LevelView::Loading);
        for level in [Level::Year, Level::Engine] {
            assert_eq!(t.state.selection().get(level), None);
            assert_eq!(t.state.status_for(level), &LevelStatus::Idle);
        }
    }

    #[test]
    fn test_reselect_same_level_keeps_siblings() {
        let state = with_years();
        let t = select(&state, Level::Model, "bmw-5");
        // Model options stay loaded so the shopper can switch again.
        assert_eq!(t.state.options_for(Level::Model).len(), 2);
        assert_eq!(t.state.selection().model().unwrap().id.as_str(), "bmw-5");
        assert_eq!(t.fetch.unwrap().parent_id, Some(OptionId::new("bmw-5")));
    }

    #[test]
    fn test_stale_response_discarded() {
        let state = with_brands();

        // Fetch A for BMW models, then fetch B for Audi models.
        let a = select(&state, Level::Brand, "bmw");
        let ticket_a = a.fetch.clone().unwrap();
        let b = select(&a.state, Level::Brand, "audi");
        let ticket_b = b.fetch.clone().unwrap();
        assert!(ticket_b.token > ticket_a.token);

        // B resolves first, then A arrives late.
        let t = resolve(&b.state, ticket_b, models("audi"));
        let t = resolve(&t.state, ticket_a.clone(), models("bmw"));

        assert_eq!(
            t.resolution,
            Some(Resolution::Stale {
                level: Level::Model,
                token: ticket_a.token
            })
        );
        let loaded = t.state.options_for(Level::Model);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "audi-a4");
    }

    #[test]
    fn test_stale_response_after_newer_in_flight() {
        let state = with_brands();
        let a = select(&state, Level::Brand, "bmw");
        let ticket_a = a.fetch.clone().unwrap();
        let b = select(&a.state, Level::Brand, "audi");

        // A resolves while B is still in flight: the level stays loading.
        let t = resolve(&b.state, ticket_a, models("bmw"));
        assert!(matches!(t.resolution, Some(Resolution::Stale { .. })));
        assert_eq!(t.state.status_for(Level::Model), &LevelStatus::Loading);
    }

    #[test]
    fn test_duplicate_resolution_is_stale() {
        let a = select(&with_brands(), Level::Brand, "bmw");
        let ticket = a.fetch.clone().unwrap();
        let t = resolve(&a.state, ticket.clone(), models("bmw"));
        let t = resolve(&t.state, ticket, vec![]);
        assert!(matches!(t.resolution, Some(Resolution::Stale { .. })));
        assert_eq!(t.state.options_for(Level::Model).len(), 2);
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let a = select(&with_brands(), Level::Brand, "bmw");
        let ticket = a.fetch.clone().unwrap();
        let cleared = step(&a.state, SelectorEvent::Clear);

        assert!(cleared.state.selection().is_empty());
        for level in Level::ALL {
            assert_eq!(cleared.state.status_for(level), &LevelStatus::Idle);
            assert!(cleared.state.token_for(level) > a.state.token_for(level));
        }

        let t = resolve(&cleared.state, ticket, models("bmw"));
        assert!(matches!(t.resolution, Some(Resolution::Stale { .. })));
        assert_eq!(t.state.status_for(Level::Model), &LevelStatus::Idle);
    }

    #[test]
    fn test_fetch_error_is_level_scoped_and_retryable() {
        let a = select(&with_brands(), Level::Brand, "bmw");
        let ticket = a.fetch.clone().unwrap();
        let failed = step(
            &a.state,
            SelectorEvent::Resolved {
                ticket,
                outcome: Err(FetchError::Transport("connection reset".into())),
            },
        );

        assert!(matches!(failed.resolution, Some(Resolution::Failed { level: Level::Model, .. })));
        assert!(matches!(failed.state.view(Level::Model), LevelView::Error(r) if r.contains("connection reset")));
        // Brands and the chosen brand are untouched.
        assert_eq!(failed.state.options_for(Level::Brand).len(), 2);
        assert_eq!(failed.state.selection().depth(), 1);

        let retry = step(&failed.state, SelectorEvent::Reload(Level::Model));
        let ticket = retry.fetch.clone().unwrap();
        assert_eq!(ticket.parent_id, Some(OptionId::new("bmw")));
        let t = resolve(&retry.state, ticket, models("bmw"));
        assert_eq!(t.state.options_for(Level::Model).len(), 2);
    }

    #[test]
    fn test_reload_requires_parent() {
        let err = reduce(&with_brands(), SelectorEvent::Reload(Level::Year)).unwrap_err();
        assert_eq!(err, SelectorError::ParentNotSelected(Level::Year));
    }

    #[test]
    fn test_select_engine_completes_without_fetch() {
        let t = select(&with_years(), Level::Year, "bmw-3:2016");
        let engine_ticket = t.fetch.unwrap();
        let year = OptionId::new("bmw-3:2016");
        let engines = vec![VehicleOption::child(&year, "320d", "320d")];
        let t = resolve(&t.state, engine_ticket, engines);

        let t = select(&t.state, Level::Engine, "320d");
        assert!(t.fetch.is_none());
        assert!(t.state.is_complete());
        assert!(matches!(t.state.view(Level::Engine), LevelView::Selected(o) if o.id.as_str() == "320d"));
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = with_brands();
        let before = state.clone();
        let _ = select(&state, Level::Brand, "bmw");
        let _ = step(&state, SelectorEvent::Clear);
        assert_eq!(state, before);
    }

    #[test]
    fn test_loaded_options_follow_chosen_parent() {
        let state = with_years();
        let model = state.selection().model().unwrap().id.clone();
        assert!(state
            .options_for(Level::Year)
            .iter()
            .all(|o| o.parent_id.as_ref() == Some(&model)));
    }
}
