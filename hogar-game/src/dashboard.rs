//! Derived values for the module dashboard.
//!
//! Nothing here is stored: every field is recomputed from the progression
//! state and the catalog on each build.
use serde::Serialize;

use crate::data::{Module, ModuleCatalog, RoadmapStep};
use crate::feedback::Tone;
use crate::gating::ModuleStatus;
use crate::level::Level;
use crate::offer::{OfferKind, OfferTerms};
use crate::roadmap::Roadmap;
use crate::state::ProgressionState;

/// One tile in the module grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCard {
    pub id: u32,
    pub title: String,
    pub desc: String,
    pub points: u32,
    pub minutes: u32,
    pub tone: Tone,
    pub status: ModuleStatus,
    /// Aggregate of recorded answers; partial while the module is in flight.
    pub score: u32,
}

impl ModuleCard {
    fn from_module(module: &Module, state: &ProgressionState) -> Self {
        Self {
            id: module.id,
            title: module.title.clone(),
            desc: module.desc.clone(),
            points: module.points,
            minutes: module.minutes,
            tone: module.tone,
            status: state.module_status(module.id),
            score: state.module_score(module.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub display_name: String,
    pub level: Level,
    pub level_label: String,
    pub points_to_next_level: Option<u32>,
    pub preparedness_points: u32,
    pub savings_points: u32,
    pub total_points: u32,
    pub progress_percent: f64,
    pub completed_modules: usize,
    pub available_modules: usize,
    pub badges: Vec<String>,
    pub modules: Vec<ModuleCard>,
    /// Lowest-id module that can be started now.
    pub next_module: Option<u32>,
    pub next_roadmap_step: Option<RoadmapStep>,
    /// Flash banner, present only inside the offer window.
    pub offer: Option<OfferTerms>,
}

impl DashboardView {
    #[must_use]
    pub fn build(state: &ProgressionState, catalog: &ModuleCatalog) -> Self {
        let modules: Vec<ModuleCard> = catalog
            .iter()
            .map(|module| ModuleCard::from_module(module, state))
            .collect();
        let count = |status: ModuleStatus| modules.iter().filter(|m| m.status == status).count();
        let level = state.level();

        Self {
            display_name: state.display_name().to_string(),
            level,
            level_label: level.to_string(),
            points_to_next_level: Level::points_to_next(state.preparedness_points),
            preparedness_points: state.preparedness_points,
            savings_points: state.savings_points,
            total_points: state.total_points(),
            progress_percent: state.progress_percent(),
            completed_modules: count(ModuleStatus::Completed),
            available_modules: count(ModuleStatus::Available),
            badges: state.badges.clone(),
            next_module: modules
                .iter()
                .find(|m| m.status == ModuleStatus::Available)
                .map(|m| m.id),
            next_roadmap_step: Roadmap::new(&catalog.roadmap).next_step(state).cloned(),
            offer: state
                .should_show_offer()
                .then(|| OfferTerms::for_kind(OfferKind::Flash)),
            modules,
        }
    }

    #[must_use]
    pub fn card(&self, module_id: u32) -> Option<&ModuleCard> {
        self.modules.iter().find(|card| card.id == module_id)
    }
}

/// What tapping a module tile leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Start(u32),
    ShowUpgrade(OfferTerms),
    AlreadyCompleted(u32),
}

/// Route a module tap. `None` for ids the catalog does not know.
#[must_use]
pub fn select_module(
    state: &ProgressionState,
    catalog: &ModuleCatalog,
    module_id: u32,
) -> Option<Selection> {
    let module = catalog.module(module_id)?;
    Some(match state.module_status(module.id) {
        ModuleStatus::Available => Selection::Start(module.id),
        ModuleStatus::Locked => Selection::ShowUpgrade(OfferTerms::for_kind(OfferKind::Main)),
        ModuleStatus::Completed => Selection::AlreadyCompleted(module.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRO_ACCESS_BADGE;

    fn catalog() -> &'static ModuleCatalog {
        ModuleCatalog::load_from_static().unwrap()
    }

    #[test]
    fn fresh_dashboard() {
        let view = DashboardView::build(&ProgressionState::default(), catalog());
        assert_eq!(view.modules.len(), 7);
        assert_eq!(view.card(1).unwrap().status, ModuleStatus::Available);
        assert_eq!(view.card(2).unwrap().status, ModuleStatus::Locked);
        assert_eq!(view.available_modules, 1);
        assert_eq!(view.next_module, Some(1));
        assert_eq!(view.level, Level::Novice);
        assert_eq!(view.level_label, "Level 1: Novice");
        assert_eq!(view.points_to_next_level, Some(401));
        assert!(view.offer.is_none());
        assert_eq!(view.next_roadmap_step.unwrap().id, 1);
    }

    #[test]
    fn mid_journey_shows_flash_offer() {
        let mut state = ProgressionState {
            email: "luis@example.org".to_string(),
            completed_steps: vec![1, 2, 3],
            current_step: 4,
            preparedness_points: 450,
            savings_points: 15,
            ..ProgressionState::default()
        };
        let view = DashboardView::build(&state, catalog());
        assert_eq!(view.display_name, "luis");
        assert_eq!(view.total_points, 465);
        assert_eq!(view.completed_modules, 3);
        assert_eq!(view.next_module, Some(4));
        assert_eq!(view.level, Level::Explorer);
        let offer = view.offer.unwrap();
        assert_eq!((offer.kind, offer.offer_price_eur), (OfferKind::Flash, 19));

        state.badges.push(PRO_ACCESS_BADGE.to_string());
        assert!(DashboardView::build(&state, catalog()).offer.is_none());
    }

    #[test]
    fn selection_routes_by_status() {
        let state = ProgressionState {
            completed_steps: vec![1],
            ..ProgressionState::default()
        };
        assert_eq!(
            select_module(&state, catalog(), 1),
            Some(Selection::AlreadyCompleted(1))
        );
        assert_eq!(select_module(&state, catalog(), 2), Some(Selection::Start(2)));
        match select_module(&state, catalog(), 5) {
            Some(Selection::ShowUpgrade(terms)) => assert_eq!(terms.kind, OfferKind::Main),
            other => panic!("expected upgrade prompt, got {other:?}"),
        }
        assert_eq!(select_module(&state, catalog(), 42), None);
    }
}
