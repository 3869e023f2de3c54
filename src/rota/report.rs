//! Tab-separated text reports: the roster grid, totals and contact list.

use std::fmt::Write;

use super::aggregate::Roster;
use super::config::RotaConfig;
use super::types::{Role, RotaProblem, Slot};

fn cell(problem: &RotaProblem, config: &RotaConfig, person: usize, slot: Slot) -> String {
    let first = &problem.people[person].first;
    if config.debug_info {
        format!("{first}_{}", problem.availability.get(person, slot))
    } else {
        first.clone()
    }
}

fn grid_rows(
    out: &mut String,
    problem: &RotaProblem,
    config: &RotaConfig,
    roster: &Roster,
    role: Role,
) {
    let count = match role {
        Role::Main => config.num_main_workers,
        Role::Standby => config.num_standby_workers,
    };
    for r in 0..count as usize {
        for (i, slot) in config.slots().enumerate() {
            let staff = match role {
                Role::Main => &roster.slots[i].main,
                Role::Standby => &roster.slots[i].standby,
            };
            if let Some(&p) = staff.get(r) {
                out.push_str(&cell(problem, config, p, slot));
            }
            out.push('\t');
        }
        out.push('\n');
    }
}

/// Renders the roster grid.
///
/// One header row of `<Day>_<period>` keys, `num_main_workers` rows of main
/// staff, a separator row of tabs, then `num_standby_workers` rows of
/// standby staff. Every cell is followed by a tab.
pub fn render_grid(problem: &RotaProblem, config: &RotaConfig, roster: &Roster) -> String {
    let mut out = String::new();
    for slot in config.slots() {
        out.push_str(&config.slot_key(slot));
        out.push('\t');
    }
    out.push('\n');

    grid_rows(&mut out, problem, config, roster, Role::Main);
    out.push_str(&"\t".repeat(config.slot_count()));
    out.push('\n');
    grid_rows(&mut out, problem, config, roster, Role::Standby);
    out
}

/// Renders per-person totals. A cap that fell back to the default is
/// marked with `*`.
pub fn render_totals(problem: &RotaProblem, roster: &Roster) -> String {
    let mut out =
        String::from("Name\tMain shifts\tStandby shifts\tMaybe shifts\tScoring\tMax shifts willing to do\n");
    for (person, summary) in problem.people.iter().zip(&roster.people) {
        let marker = if person.uses_default_cap() { "*" } else { "" };
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}{}",
            person.full_name(),
            summary.main,
            summary.standby,
            summary.maybe,
            summary.score,
            person.max_shifts,
            marker
        );
    }
    out
}

/// Renders `email\tfirst\t<Day> <period> (<role>),...` for everyone with at
/// least one shift.
pub fn render_contacts(problem: &RotaProblem, config: &RotaConfig, roster: &Roster) -> String {
    let mut out = String::new();
    for (p, person) in problem.people.iter().enumerate() {
        let shifts: Vec<String> = roster
            .shifts_of(p)
            .map(|(slot, role)| format!("{} ({role})", config.slot_title(slot)))
            .collect();
        if shifts.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}\t{}\t{}", person.email, person.first, shifts.join(","));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rota::aggregate::{PersonSummary, SlotRoster};
    use crate::rota::{AvailabilityMatrix, Person, Preference};

    fn fixture() -> (RotaProblem, RotaConfig, Roster) {
        let config = RotaConfig::default()
            .with_days(&["Mon"])
            .with_staffing(1, 1);
        let matrix = AvailabilityMatrix::from_rows(
            1,
            2,
            vec![
                vec![Preference::Maybe, Preference::Yes],
                vec![Preference::Best, Preference::Yes],
                vec![Preference::No, Preference::No],
            ],
        );
        let people = vec![
            Person::new("Ann", "Lee", "ann@example.org", 2),
            Person::with_default_cap("Bob", "", "bob@example.org", 5),
            Person::new("Cat", "Roe", "cat@example.org", 1),
        ];
        let problem = RotaProblem::new(people, matrix).unwrap();
        let am = Slot::new(0, 0);
        let pm = Slot::new(0, 1);
        let roster = Roster {
            slots: vec![
                SlotRoster { slot: am, main: vec![1], standby: vec![0] },
                SlotRoster { slot: pm, main: vec![0], standby: vec![1] },
            ],
            people: vec![
                PersonSummary { main: 1, standby: 1, maybe: 1, score: 5 },
                PersonSummary { main: 1, standby: 1, maybe: 0, score: 5 },
                PersonSummary::default(),
            ],
            assignments: vec![
                (0, am, Role::Standby),
                (1, am, Role::Main),
                (0, pm, Role::Main),
                (1, pm, Role::Standby),
            ],
        };
        (problem, config, roster)
    }

    #[test]
    fn test_grid_with_debug_info() {
        let (problem, config, roster) = fixture();
        let grid = render_grid(&problem, &config, &roster);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "Mon_am\tMon_pm\t");
        assert_eq!(lines[1], "Bob_best\tAnn_yes\t");
        assert_eq!(lines[2], "\t\t");
        assert_eq!(lines[3], "Ann_maybe\tBob_yes\t");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_grid_plain_names() {
        let (problem, config, roster) = fixture();
        let grid = render_grid(&problem, &config.with_debug_info(false), &roster);
        assert_eq!(grid.lines().nth(1), Some("Bob\tAnn\t"));
    }

    #[test]
    fn test_totals_marks_default_cap() {
        let (problem, _, roster) = fixture();
        let totals = render_totals(&problem, &roster);
        let lines: Vec<&str> = totals.lines().collect();
        assert!(lines[0].starts_with("Name\tMain shifts"));
        assert_eq!(lines[1], "Ann Lee\t1\t1\t1\t5\t2");
        assert_eq!(lines[2], "Bob\t1\t1\t0\t5\t5*");
        assert_eq!(lines[3], "Cat Roe\t0\t0\t0\t0\t1");
    }

    #[test]
    fn test_contacts_skip_idle_people() {
        let (problem, config, roster) = fixture();
        let contacts = render_contacts(&problem, &config, &roster);
        let lines: Vec<&str> = contacts.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ann@example.org\tAnn\tMon am (standby),Mon pm (main)"
        );
        assert!(!contacts.contains("cat@example.org"));
    }
}
