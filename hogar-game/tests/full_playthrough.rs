use hogar_game::{
    Completion, DashboardView, Email, FeedbackTier, FinalVerdict, Level, MemoryStorage,
    ModuleCatalog, ModuleRunner, ModuleStatus, ProgressStorage, ProgressionState, RiskLevel,
    Roadmap, RunnerPhase, Selection, Store, SurveyRunner, constants::STORAGE_KEY,
    result_summary, select_module,
};
use std::time::Duration;

fn catalog() -> &'static ModuleCatalog {
    ModuleCatalog::load_from_static().unwrap()
}

/// Answer every question of every module with the choice at `pick`,
/// waiting out consequence screens.
fn play_all(store: &mut Store<MemoryStorage>, pick: usize) -> Vec<FeedbackTier> {
    let mut now = Duration::ZERO;
    let mut tiers = Vec::new();
    for module in catalog() {
        let mut runner = ModuleRunner::start(module, store).unwrap();
        while !runner.is_completed() {
            if runner.current_question().is_some() {
                let choice = pick.min(runner.current_question().unwrap().choices.len() - 1);
                runner.select(store, choice, now).unwrap();
            } else {
                now = runner.pending_deadline().unwrap();
                assert!(runner.poll(store, now));
            }
        }
        tiers.push(runner.outcome().unwrap().tier);
    }
    tiers
}

fn assert_same_derivations(a: &ProgressionState, b: &ProgressionState) {
    assert_eq!(a.level(), b.level());
    assert_eq!(a.should_show_offer(), b.should_show_offer());
    assert_eq!(a.progress_percent(), b.progress_percent());
    for id in 1..=8 {
        assert_eq!(a.module_status(id), b.module_status(id));
    }
}

#[test]
fn onboarding_then_first_choice_run_reaches_master() {
    let mut store = Store::open(MemoryStorage::new());

    let mut survey = SurveyRunner::new();
    for option in [0, 1, 2] {
        survey.answer(option).unwrap();
    }
    let outcome = survey.outcome().unwrap();
    assert_eq!(outcome.survival_hours, 4);
    assert_eq!(outcome.risk, RiskLevel::High);

    store.onboard(&Email::parse("marta@example.es").unwrap()).unwrap();
    assert_eq!(store.state().preparedness_points, 50);
    assert_eq!(store.state().current_step, 1);

    let tiers = play_all(&mut store, 0);
    assert_eq!(tiers[5], FeedbackTier::Warning);
    assert!(
        tiers
            .iter()
            .enumerate()
            .all(|(i, tier)| i == 5 || *tier == FeedbackTier::Success)
    );

    let state = store.state();
    assert_eq!(state.completed_steps, [1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(state.current_step, 8);
    // 50 bonus + 4 * 200 + 80 + (30 + 100 + 100) + 500
    assert_eq!(state.preparedness_points, 1_660);
    assert_eq!(state.savings_points, 8);
    assert_eq!(state.level(), Level::Master);
    assert!((state.progress_percent() - 100.0).abs() < f64::EPSILON);
    assert!(!state.should_show_offer());

    let summary = result_summary(state);
    assert_eq!(summary.verdict, FinalVerdict::Master);
    assert_eq!(summary.display_name, "marta");
    assert_eq!(summary.share_percentile, 166);
}

#[test]
fn worst_run_stays_novice_with_failure_feedback() {
    let mut store = Store::open(MemoryStorage::new());
    let tiers = play_all(&mut store, usize::MAX);
    assert_eq!(tiers[0], FeedbackTier::Failure);
    assert_eq!(tiers[4], FeedbackTier::Success);
    assert_eq!(tiers[5], FeedbackTier::Warning);
    assert_eq!(tiers[6], FeedbackTier::Failure);
    // 4 * 20 + 75 + (50 + 20 + 80) + (20 + 10 + 30 + 40 + 20)
    assert_eq!(store.state().preparedness_points, 425);
    assert_eq!(store.state().savings_points, 7);
    assert_eq!(store.state().level(), Level::Explorer);
    assert_eq!(
        result_summary(store.state()).verdict,
        FinalVerdict::Developing
    );
}

#[test]
fn every_mutation_round_trips_through_storage() {
    let storage = MemoryStorage::new();
    let mut store = Store::open(storage.clone());
    let check = |store: &Store<MemoryStorage>| {
        let reopened = Store::open(storage.clone());
        assert_eq!(reopened.state(), store.state());
        assert_same_derivations(reopened.state(), store.state());
    };

    store.onboard(&Email::parse("pau@example.cat").unwrap()).unwrap();
    check(&store);
    store.record_answer(1, 1, 100);
    check(&store);
    store.record_answer(1, 2, 50);
    check(&store);
    assert_eq!(store.complete_module(1), Completion::Completed { score: 150 });
    check(&store);
    store.add_points(0, 12);
    check(&store);
    assert!(store.add_badge("first-steps"));
    check(&store);
    store.complete_step(2, 100, 10);
    check(&store);
    store.complete_step(3, 100, 10);
    check(&store);
    assert!(store.state().should_show_offer());
}

#[test]
fn reset_returns_to_a_fresh_session() {
    let storage = MemoryStorage::new();
    let mut store = Store::open(storage.clone());
    play_all(&mut store, 0);
    store.reset();

    assert_eq!(store.state().preparedness_points, 0);
    assert!(store.state().completed_steps.is_empty());
    assert_eq!(store.state().level().tier(), 1);
    assert!(storage.load(STORAGE_KEY).unwrap().is_none());
    assert_eq!(Store::open(storage).state(), &ProgressionState::default());
}

#[test]
fn modules_unlock_in_a_chain() {
    let mut store = Store::open(MemoryStorage::new());
    for id in 1..=7 {
        let view = DashboardView::build(store.state(), catalog());
        assert_eq!(view.next_module, Some(id));
        assert_eq!(view.card(id).unwrap().status, ModuleStatus::Available);
        if id < 7 {
            assert_eq!(view.card(id + 1).unwrap().status, ModuleStatus::Locked);
            assert!(matches!(
                select_module(store.state(), catalog(), id + 1),
                Some(Selection::ShowUpgrade(_))
            ));
        }
        assert_eq!(store.complete_module(id), Completion::Completed { score: 0 });
    }
    assert_eq!(
        DashboardView::build(store.state(), catalog()).next_module,
        None
    );
}

#[test]
fn abandoning_a_module_keeps_partial_answers() {
    let mut store = Store::open(MemoryStorage::new());
    let scanner = catalog().module(1).unwrap();
    {
        let mut runner = ModuleRunner::start(scanner, &mut store).unwrap();
        runner.select(&mut store, 0, Duration::ZERO).unwrap();
        assert_eq!(runner.phase(), &RunnerPhase::Asking { number: 2 });
    }
    store.leave_module();
    assert_eq!(store.state().module_score(1), 100);
    assert_eq!(store.state().module_status(1), ModuleStatus::Available);

    // Replaying overwrites the earlier answer.
    let mut runner = ModuleRunner::start(scanner, &mut store).unwrap();
    runner.select(&mut store, 2, Duration::ZERO).unwrap();
    runner.select(&mut store, 2, Duration::ZERO).unwrap();
    assert_eq!(runner.outcome().unwrap().score, 20);
}

#[test]
fn roadmap_walks_alongside_modules() {
    let mut store = Store::open(MemoryStorage::new());
    store.onboard(&Email::parse("iker@example.eus").unwrap()).unwrap();
    let roadmap = Roadmap::new(&catalog().roadmap);

    let mut expected = 50;
    while let Some(step) = roadmap.next_step(store.state()) {
        expected += step.points;
        roadmap.take(&mut store, step.id).unwrap();
    }
    assert_eq!(store.state().current_step, 10);
    assert_eq!(store.state().preparedness_points, expected);
    assert_eq!(store.state().savings_points, 90);
    assert_eq!(roadmap.done_count(store.state()), 10);

    // Steps 1..=9 land in completedSteps; only the seven module ids count.
    let state = store.state();
    assert!(state.progress_percent() <= 100.0);
    assert!((state.progress_percent() - 100.0).abs() < f64::EPSILON);
    let summary = result_summary(state);
    assert_eq!(summary.completed_modules, 7);
    assert_eq!(summary.total_modules, 7);
}
