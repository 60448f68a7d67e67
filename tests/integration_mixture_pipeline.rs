//! Integration tests for mixtures, the fraction/scale fit and structural
//! refinement.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: phases with stacking models feed a
//!   mixture, the optimizer fits fractions and scales against specimens,
//!   and the refiner searches structural properties on top of that fit.
//!
//! Coverage
//! --------
//! - `mixture`:
//!   - Grid construction, `optimize` with every fit method code.
//! - `refinement`:
//!   - Empty selection, re-entrancy rejection, L-BFGS and genetic runs,
//!     worker-thread runs cancelled before and during the search.
//!
//! Exclusions
//! ----------
//! - Closed forms of the probability models and low-level minimizer
//!   plumbing; these are covered by unit tests.
//! - Python bindings.
use ndarray::Array1;
use rust_xrd::{
    mixture::{optimize, Mixture, MixtureData, Specimen, SpecimenId},
    phases::{Phase, PhaseId, PhaseProperty},
    refinement::{
        refine, spawn_refinement, BruteForceOptions, CancelToken, GeneticOptions, PropertyPath,
        RefineContext, RefineMethod, RefineOptions, RefineStatus,
    },
};
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Purpose
/// -------
/// Build the two-specimen mixture of the reference scenario.
///
/// Configuration
/// -------------
/// - One R0G1 phase (`W = [1.0]`).
/// - Two specimens on `2θ ∈ [5, 35]` with constant intensities 1.0 and 2.0
///   (100 points each).
/// - fractions `[1.0]`, scales `[1.0, 1.0]`, bgshifts `[0.0, 0.0]`.
fn constant_pattern_mixture() -> Mixture {
    let tt = Array1::linspace(5.0, 35.0, 100);
    let phases = vec![Phase::new("Kaolinite", 0, 1).expect("R0G1 is supported")];
    let specimens = vec![
        Specimen::with_experimental("Low", tt.clone(), Array1::from_elem(100, 1.0))
            .expect("equal lengths"),
        Specimen::with_experimental("High", tt, Array1::from_elem(100, 2.0)).expect("equal lengths"),
    ];
    let data = MixtureData::new(
        vec![vec![Some(PhaseId(0))], vec![Some(PhaseId(0))]],
        vec![Some(SpecimenId(0)), Some(SpecimenId(1))],
        vec!["Kaolinite".to_string()],
        vec![1.0],
        vec![1.0, 1.0],
        vec![0.0, 0.0],
    )
    .expect("consistent grid");
    Mixture::with_data("Reference", data, phases, specimens).expect("ids resolve")
}

/// Purpose
/// -------
/// Build a one-specimen mixture whose experimental pattern is generated
/// from an R1G2 phase with known CSDS average and `W1`.
///
/// Configuration
/// -------------
/// - Truth: CSDS average 8, `W1 = 0.4`, components at 10 and 14 Å.
/// - Model start: CSDS average 12, `W1 = 0.6`; only the CSDS average is
///   selected for refinement, in `[4, 20]`.
fn structural_mixture() -> (Mixture, PropertyPath) {
    let tt = Array1::linspace(4.0, 14.0, 120);
    let mut truth = Phase::new("I/S", 1, 2).expect("R1G2 is supported");
    truth.probabilities_mut().set_param("W1", 0.4).expect("W1 exists");
    truth.csds.set_average(8.0);

    let mut mixture = Mixture::new("Structural");
    let exp = truth
        .get_diffracted_intensity(&tt, &mixture.goniometer, None)
        .expect("intensity of a valid phase");
    let mut model = truth.clone();
    model.csds.set_average(12.0);
    model.probabilities_mut().set_param("W1", 0.6).expect("W1 exists");

    let p = mixture.add_phase_to_pool(model);
    let s = mixture.add_specimen_to_pool(Specimen::with_experimental("S", tt, exp).expect("lengths"));
    mixture.add_phase("I/S", 1.0);
    let row = mixture.add_specimen(Some(s), 1.0, 0.0).expect("specimen id");
    mixture.set_phase(row, 0, Some(p)).expect("cell");

    let path = PropertyPath { phase: p, property: PhaseProperty::CsdsAverage };
    let info = mixture.property_info_mut(&path).expect("CSDS info");
    info.minimum = 4.0;
    info.maximum = 20.0;
    info.refine = true;
    (mixture, path)
}

#[test]
// Purpose
// -------
// Reference scenario: every fit method returns a finite residual and keeps
// the fractions normalised.
//
// Given
// -----
// - The constant-pattern mixture from `constant_pattern_mixture`.
//
// Expect
// ------
// - For method codes 0, 1 and 3: finite, non-negative residual; fractions
//   sum to 1 within 1e-6; scales stay non-negative.
fn optimize_reference_scenario() {
    init_logging();
    for method in [0, 1, 3] {
        let mut mixture = constant_pattern_mixture();
        let residual = optimize(&mut mixture, method, false).expect("fit runs");
        assert!(residual.is_finite() && residual >= 0.0, "method {method}: {residual}");
        let total: f64 = mixture.data().fractions().iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "method {method}: fractions sum {total}");
        assert!(mixture.data().scales().iter().all(|&s| s >= 0.0));
        assert!(mixture.specimens().iter().all(|s| s.calculated().is_some()));
    }
}

#[test]
fn refine_without_selection_is_an_error() {
    init_logging();
    let mut mixture = constant_pattern_mixture();
    let ctx = refine(&mut mixture, &RefineOptions::default(), &CancelToken::new())
        .expect("lock is free");
    assert_eq!(ctx.status(), RefineStatus::Error);
    assert!(ctx.best_solution.is_none());
    assert!(!mixture.is_refining());
}

#[test]
fn refine_is_rejected_while_locked() {
    let (mut mixture, path) = structural_mixture();
    mixture.set_refine_lock(true);
    assert!(refine(&mut mixture, &RefineOptions::default(), &CancelToken::new()).is_none());
    assert_eq!(mixture.get_property(&path).unwrap(), 12.0);

    let shared = Arc::new(Mutex::new(mixture));
    assert!(spawn_refinement(shared, RefineOptions::default(), CancelToken::new()).is_none());
}

#[test]
// Purpose
// -------
// L-BFGS structural refinement lowers the residual and applies its best
// point.
//
// Given
// -----
// - `structural_mixture`: data at CSDS average 8, start at 12.
//
// Expect
// ------
// - Status `Finished`; best residual <= initial residual; the applied CSDS
//   average equals the best solution and lies inside [4, 20].
fn lbfgs_refinement_improves_residual() {
    init_logging();
    let (mut mixture, path) = structural_mixture();
    let ctx = refine(&mut mixture, &RefineOptions::default(), &CancelToken::new()).expect("free");

    assert_eq!(ctx.status(), RefineStatus::Finished);
    let (initial, best) = (ctx.initial_residual.unwrap(), ctx.best_residual.unwrap());
    assert!(best <= initial);
    let applied = mixture.get_property(&path).unwrap();
    assert_eq!(applied, ctx.best_solution.unwrap()[0]);
    assert!((4.0..=20.0).contains(&applied));
    assert!(!mixture.is_frozen());
}

#[test]
fn genetic_refinement_on_worker_thread() {
    init_logging();
    let (mixture, path) = structural_mixture();
    let shared = Arc::new(Mutex::new(mixture));
    let options = RefineOptions {
        method: RefineMethod::Genetic,
        genetic: GeneticOptions { population: 6, max_children: 6, max_generations: 3, seed: 11, ..Default::default() },
        ..Default::default()
    };

    let handle = spawn_refinement(Arc::clone(&shared), options, CancelToken::new()).expect("free");
    let ctx = handle.join().expect("worker does not panic");

    assert_eq!(ctx.status(), RefineStatus::Finished);
    assert!(ctx.best_residual.unwrap() <= ctx.initial_residual.unwrap());
    let mixture = shared.lock().unwrap();
    assert!(!mixture.is_refining());
    assert_eq!(mixture.get_property(&path).unwrap(), ctx.best_solution.unwrap()[0]);
}

#[test]
// Purpose
// -------
// A kill raised before the worker starts rolls back to the start values;
// a stop keeps the best point.
//
// Given
// -----
// - Tokens flagged before spawning.
//
// Expect
// ------
// - Kill: `Finished`, CSDS average back at 12.
// - Stop: `Stopped`, last solution equals best solution.
fn cancellation_on_worker_thread() {
    let (mixture, path) = structural_mixture();
    let shared = Arc::new(Mutex::new(mixture));

    let token = CancelToken::new();
    token.kill();
    let ctx = spawn_refinement(Arc::clone(&shared), RefineOptions::default(), token)
        .expect("free")
        .join()
        .expect("worker does not panic");
    assert_eq!(ctx.status(), RefineStatus::Finished);
    assert_eq!(shared.lock().unwrap().get_property(&path).unwrap(), 12.0);

    let token = CancelToken::new();
    token.stop();
    let ctx = spawn_refinement(Arc::clone(&shared), RefineOptions::default(), token)
        .expect("free")
        .join()
        .expect("worker does not panic");
    assert_eq!(ctx.status(), RefineStatus::Stopped);
    assert_eq!(ctx.last_solution, ctx.best_solution);
}

/// Number of grid points of the slow brute-force run used for mid-run
/// cancellation.
const SLOW_GRID: usize = 60;

/// Purpose
/// -------
/// Start a throttled brute-force refinement of `structural_mixture` on a
/// worker thread, let it run for a while, then cancel it with `cancel`.
///
/// Configuration
/// -------------
/// - `SLOW_GRID` samples with a 25 ms pause per evaluation, so the full grid
///   takes well over a second; `cancel` runs after 400 ms.
fn cancel_mid_run(cancel: fn(&CancelToken)) -> (Arc<Mutex<Mixture>>, PropertyPath, RefineContext) {
    let (mixture, path) = structural_mixture();
    let shared = Arc::new(Mutex::new(mixture));
    let options = RefineOptions {
        method: RefineMethod::BruteForce,
        brute: BruteForceOptions { samples_per_dim: SLOW_GRID },
        throttle: Some(Duration::from_millis(25)),
        ..Default::default()
    };
    let token = CancelToken::new();
    let handle = spawn_refinement(Arc::clone(&shared), options, token.clone()).expect("free");
    thread::sleep(Duration::from_millis(400));
    cancel(&token);
    let ctx = handle.join().expect("worker does not panic");
    (shared, path, ctx)
}

#[test]
// Purpose
// -------
// A stop raised while the search is running keeps the best point found so
// far and releases the mixture.
//
// Given
// -----
// - `cancel_mid_run` with `CancelToken::stop`.
//
// Expect
// ------
// - `Stopped` after more than one but fewer than all evaluations.
// - last solution == best solution, best residual <= initial residual.
// - The best CSDS average is applied; lock released, updates thawed.
fn stop_during_search_keeps_best_point() {
    init_logging();
    let (shared, path, ctx) = cancel_mid_run(CancelToken::stop);

    assert_eq!(ctx.status(), RefineStatus::Stopped);
    assert!(ctx.evaluations >= 2 && ctx.evaluations < SLOW_GRID + 1, "{} evaluations", ctx.evaluations);
    let best = ctx.best_solution.clone().expect("initial point was evaluated");
    assert_eq!(ctx.last_solution.as_ref(), Some(&best));
    assert_eq!(ctx.last_residual, ctx.best_residual);
    assert!(ctx.best_residual.unwrap() <= ctx.initial_residual.unwrap());

    let mixture = shared.lock().unwrap();
    assert_eq!(mixture.get_property(&path).unwrap(), best[0]);
    assert!(!mixture.is_refining());
    assert!(!mixture.is_frozen());
}

#[test]
// Purpose
// -------
// A kill raised while the search is running restores the start values.
//
// Given
// -----
// - `cancel_mid_run` with `CancelToken::kill`.
//
// Expect
// ------
// - `Finished` after more than one but fewer than all evaluations.
// - CSDS average back at 12; lock released, updates thawed.
fn kill_during_search_restores_start() {
    init_logging();
    let (shared, path, ctx) = cancel_mid_run(CancelToken::kill);

    assert_eq!(ctx.status(), RefineStatus::Finished);
    assert!(ctx.evaluations >= 2 && ctx.evaluations < SLOW_GRID + 1, "{} evaluations", ctx.evaluations);
    assert!(ctx.best_solution.is_some());

    let mixture = shared.lock().unwrap();
    assert_eq!(mixture.get_property(&path).unwrap(), 12.0);
    assert!(!mixture.is_refining());
    assert!(!mixture.is_frozen());
}
