//! Fairness objective and preference penalty.
//!
//! The objective is `preference_multiplier * penalty + fairness`, where
//! `fairness` depends on the configured [`FairnessStrategy`]:
//!
//! - **Bottleneck**: the largest weighted workload over all people.
//! - **Variance**: `Σ_p (w_p - avg)^2 + Σ_p (m_p - avg_main)^2`, with `w_p`
//!   the weighted workload and `m_p` its main-shift part. The square is
//!   built as `abs = |dev|`, `sq = abs * abs` so backends without variable
//!   multiplication in linear form can still accept it.
//!
//! Squaring punishes one person far from the average more than the same
//! total imbalance spread over many people.

use tracing::debug;

use crate::cp::{CpModel, LinearExpr, VarId};

use super::availability::Preference;
use super::config::{FairnessStrategy, RotaConfig};
use super::fabric::VariableFabric;
use super::types::RotaProblem;

/// The pieces of the objective, kept for inspection and tests.
#[derive(Debug, Clone)]
pub struct ObjectiveTerms {
    /// Fairness term (peak workload or summed squared deviations).
    pub fairness: LinearExpr,
    /// Unscaled preference penalty.
    pub preference: LinearExpr,
    /// The minimized expression.
    pub total: LinearExpr,
}

/// Penalty for `Maybe` slots used, reward (via a negative `best_weighting`)
/// for `Best` slots used as main shifts. `Yes` slots contribute nothing.
pub fn preference_penalty(
    fabric: &VariableFabric,
    problem: &RotaProblem,
    config: &RotaConfig,
) -> LinearExpr {
    let mw = config.main_shift_weighting;
    let sw = config.standby_shift_weighting;
    let mut penalty = LinearExpr::new();
    for p in 0..fabric.person_count() {
        for slot in fabric.slots() {
            match problem.availability.get(p, slot) {
                Preference::Maybe => {
                    penalty.add_term(fabric.main(p, slot), mw);
                    penalty.add_term(fabric.standby(p, slot), sw);
                }
                Preference::Best if config.best_weighting != 0 => {
                    penalty.add_term(fabric.main(p, slot), mw * config.best_weighting);
                }
                _ => {}
            }
        }
    }
    penalty
}

/// Even share of the week's weighted shift cost, rounded down.
pub fn average_workload(config: &RotaConfig, people: usize) -> i64 {
    let per_slot = config.num_main_workers as i64 * config.main_shift_weighting
        + config.num_standby_workers as i64 * config.standby_shift_weighting;
    config.slot_count() as i64 * per_slot / people.max(1) as i64
}

/// Even share of the week's main-shift cost, rounded down.
pub fn average_main_workload(config: &RotaConfig, people: usize) -> i64 {
    config.slot_count() as i64 * config.num_main_workers as i64 * config.main_shift_weighting
        / people.max(1) as i64
}

/// Largest weighted workload a person can reach: one shift per day, at most `cap`.
fn workload_ceiling(config: &RotaConfig, cap: u32, main_weight: i64, standby_weight: i64) -> i64 {
    let shifts = (cap as usize).min(config.days.len()) as i64;
    shifts * main_weight.max(standby_weight)
}

/// Declares `sq == (workload - average)^2` and returns `sq`.
///
/// `upper` bounds the workload from above; all auxiliary domains derive
/// from it.
pub fn add_squared_deviation(
    model: &mut CpModel,
    workload: LinearExpr,
    average: i64,
    upper: i64,
    name: &str,
) -> VarId {
    let dev_lo = -average;
    let dev_hi = upper - average;
    let abs_hi = dev_lo.abs().max(dev_hi.abs());

    let dev = model.new_int_var(format!("{name}_dev"), dev_lo, dev_hi);
    let abs = model.new_int_var(format!("{name}_abs"), 0, abs_hi);
    let sq = model.new_int_var(format!("{name}_sq"), 0, abs_hi * abs_hi);

    // workload - dev == average
    let mut def = workload;
    def.add_term(dev, -1);
    model.add_eq(def, average);
    model.add_abs_equality(abs, dev);
    model.add_product_equality(sq, vec![abs, abs]);
    sq
}

/// Peak weighted workload across people.
pub fn add_bottleneck(
    model: &mut CpModel,
    fabric: &VariableFabric,
    problem: &RotaProblem,
    config: &RotaConfig,
) -> LinearExpr {
    let (mw, sw) = (config.main_shift_weighting, config.standby_shift_weighting);
    let mut loads = Vec::with_capacity(problem.person_count());
    let mut peak_hi = 0;
    for (p, person) in problem.people.iter().enumerate() {
        let upper = workload_ceiling(config, person.max_shifts, mw, sw);
        peak_hi = peak_hi.max(upper);
        let load = model.new_int_var(format!("load_p{p}"), 0, upper);
        let mut def = fabric.workload(p, mw, sw);
        def.add_term(load, -1);
        model.add_eq(def, 0);
        loads.push(load);
    }
    let peak = model.new_int_var("peak_load", 0, peak_hi);
    model.add_max_equality(peak, loads);
    LinearExpr::from(peak)
}

/// Sum of squared deviations from the average, total and main-only.
pub fn add_variance(
    model: &mut CpModel,
    fabric: &VariableFabric,
    problem: &RotaProblem,
    config: &RotaConfig,
) -> LinearExpr {
    let (mw, sw) = (config.main_shift_weighting, config.standby_shift_weighting);
    let average = average_workload(config, problem.person_count());
    let average_main = average_main_workload(config, problem.person_count());
    debug!(average, average_main, "fairness averages");

    let mut fairness = LinearExpr::new();
    for (p, person) in problem.people.iter().enumerate() {
        let upper = workload_ceiling(config, person.max_shifts, mw, sw);
        let sq = add_squared_deviation(
            model,
            fabric.workload(p, mw, sw),
            average,
            upper,
            &format!("load_p{p}"),
        );
        fairness.add_term(sq, 1);

        let upper_main = workload_ceiling(config, person.max_shifts, mw, 0);
        let sq_main = add_squared_deviation(
            model,
            fabric.workload(p, mw, 0),
            average_main,
            upper_main,
            &format!("main_p{p}"),
        );
        fairness.add_term(sq_main, 1);
    }
    fairness
}

/// Builds the full objective and sets it as the model's minimization target.
pub fn add_objective(
    model: &mut CpModel,
    fabric: &VariableFabric,
    problem: &RotaProblem,
    config: &RotaConfig,
) -> ObjectiveTerms {
    let fairness = match config.fairness {
        FairnessStrategy::Bottleneck => add_bottleneck(model, fabric, problem, config),
        FairnessStrategy::Variance => add_variance(model, fabric, problem, config),
    };
    let preference = preference_penalty(fabric, problem, config);

    let mut total = preference.clone().scaled(config.preference_multiplier);
    total.add_expr(&fairness);
    model.minimize(total.clone());

    ObjectiveTerms {
        fairness,
        preference,
        total,
    }
}
