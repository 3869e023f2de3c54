//! Property tests: hard constraints hold on every solved random instance.

use proptest::prelude::*;
use u_rota::error::RotaError;
use u_rota::rota::{
    AvailabilityMatrix, FairnessStrategy, Person, Preference, RotaConfig, RotaProblem,
    RotaRunner,
};

const DAYS: [&str; 3] = ["Mon", "Tue", "Wed"];
const PERIODS: [&str; 2] = ["am", "pm"];

fn preference() -> impl Strategy<Value = Preference> {
    prop_oneof![
        4 => Just(Preference::Yes),
        1 => Just(Preference::Best),
        1 => Just(Preference::Maybe),
        2 => Just(Preference::No),
    ]
}

fn strategy() -> impl Strategy<Value = FairnessStrategy> {
    prop_oneof![
        Just(FairnessStrategy::Bottleneck),
        Just(FairnessStrategy::Variance)
    ]
}

prop_compose! {
    fn instance()(
        days in 1usize..=3,
        periods in 1usize..=2,
        people in 2usize..=4,
        standby in 0u32..=1,
        fairness in strategy(),
    )(
        rows in prop::collection::vec(
            prop::collection::vec(preference(), days * periods),
            people,
        ),
        caps in prop::collection::vec(0u32..=3, people),
        days in Just(days),
        periods in Just(periods),
        standby in Just(standby),
        fairness in Just(fairness),
    ) -> (RotaProblem, RotaConfig) {
        let config = RotaConfig::default()
            .with_days(&DAYS[..days])
            .with_periods(&PERIODS[..periods])
            .with_staffing(1, standby)
            .with_fairness(fairness)
            .with_max_time_seconds(3);
        let people = caps
            .iter()
            .enumerate()
            .map(|(i, &cap)| Person::new(format!("P{i}"), "", "", cap))
            .collect();
        let matrix = AvailabilityMatrix::from_rows(days, periods, rows);
        (RotaProblem::new(people, matrix).unwrap(), config)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn solved_rotas_respect_hard_constraints((problem, config) in instance()) {
        let outcome = match RotaRunner::run(&problem, &config) {
            Ok(outcome) => outcome,
            Err(RotaError::Infeasible) | Err(RotaError::NoSolutionWithinBudget { .. }) => {
                return Ok(());
            }
            Err(other) => return Err(TestCaseError::fail(other.to_string())),
        };
        let roster = &outcome.roster;

        for slot in &roster.slots {
            prop_assert_eq!(slot.main.len() as u32, config.num_main_workers);
            prop_assert_eq!(slot.standby.len() as u32, config.num_standby_workers);
        }
        for (p, person) in problem.people.iter().enumerate() {
            let summary = roster.people[p];
            prop_assert!(summary.total() <= person.max_shifts);
            prop_assert_eq!(
                summary.score,
                config.main_shift_weighting * summary.main as i64
                    + config.standby_shift_weighting * summary.standby as i64
            );
            for day in 0..config.days.len() {
                let on_day = roster.shifts_of(p).filter(|(s, _)| s.day == day).count();
                prop_assert!(on_day <= 1);
            }
            for (slot, _) in roster.shifts_of(p) {
                prop_assert_ne!(problem.availability.get(p, slot), Preference::No);
            }
        }
    }
}
