//! Solves one richer instance and sweeps the decoded binding for every
//! hard invariant, plus the decode-idempotence guarantee.

use std::collections::HashMap;
use timetable_solver::data::{
    slot_day, Course, CourseKind, PenaltyWeights, Problem, Room, Rules, Teacher, TeacherRole,
    TimetableInput, DAYS, SLOT_COUNT,
};
use timetable_solver::model::{Binding, Model};
use timetable_solver::network::Network;
use timetable_solver::penalties::PenaltySet;
use timetable_solver::report;
use timetable_solver::solver::{HighsBackend, Solve, SolveOptions, SolveStatus};
use timetable_solver::{constraints, penalties};

fn teacher(name: &str, role: TeacherRole, max_courses: u32) -> Teacher {
    Teacher {
        name: name.into(),
        role,
        max_courses,
        ideal_courses: None,
        availability: vec![3; SLOT_COUNT],
        interest: HashMap::new(),
        attend: vec![],
        prefer_with: vec![],
        refuse_with: vec![],
        days_pref: Default::default(),
        gap_pref: Default::default(),
        boost: None,
    }
}

/// Two venues, five courses of all three kinds, five teachers with mixed
/// availability, one refused pairing.
fn rich_input() -> TimetableInput {
    let mut roman = teacher("Roman", TeacherRole::Lead, 2);
    roman.availability = vec![3, 3, 3, 0, 0, 0, 3, 3, 3, 3, 3, 3];
    roman.refuse_with = vec!["Pavel".into()];
    let mut hermiona = teacher("Hermiona", TeacherRole::BothLead, 3);
    hermiona.availability = vec![0, 3, 3, 3, 3, 3, 3, 3, 3, 0, 0, 0];
    let pavel = teacher("Pavel", TeacherRole::Lead, 1);
    let karla = teacher("Karla", TeacherRole::Follow, 2);
    let mut jana = teacher("Jana", TeacherRole::BothFollow, 2);
    jana.attend = vec!["Practice".into()];

    TimetableInput {
        rooms: vec![
            Room {
                name: "k-3".into(),
                venue: "koliste".into(),
            },
            Room {
                name: "m-1".into(),
                venue: "mosilana".into(),
            },
        ],
        courses: vec![
            Course {
                name: "LH 1".into(),
                kind: CourseKind::Regular,
            },
            Course {
                name: "LH 2".into(),
                kind: CourseKind::Regular,
            },
            Course {
                name: "Balboa 1".into(),
                kind: CourseKind::Regular,
            },
            Course {
                name: "Solo Jazz".into(),
                kind: CourseKind::Solo,
            },
            Course {
                name: "Practice".into(),
                kind: CourseKind::Open,
            },
        ],
        teachers: vec![roman, hermiona, pavel, karla, jana],
        students: vec![],
        rules: Rules::default(),
        weights: PenaltyWeights::default(),
    }
}

fn solve_pipeline(input: TimetableInput) -> (Problem, Model, Network, PenaltySet, Binding) {
    let problem = Problem::new(input).unwrap();
    let mut model = Model::new();
    let net = Network::build(&problem, &mut model);
    constraints::post(&problem, &net, &mut model);
    let set = penalties::compose(&problem, &net, &mut model);
    model.set_objective(set.objective());
    let outcome = HighsBackend.solve(&model, &SolveOptions::default(), &mut |_| {});
    assert_eq!(outcome.status, SolveStatus::Optimal);
    (problem, model, net, set, outcome.binding.unwrap())
}

#[test]
fn solved_instance_upholds_every_hard_invariant() {
    let (problem, _, net, _, binding) = solve_pipeline(rich_input());
    let snapshot = report::decode_schedule(&problem, &net, &binding);
    let n_courses = problem.n_courses();
    let n_teachers = problem.n_teachers();

    // Exactly one (slot, room) per active course, at most one course per
    // (slot, room).
    let mut occupied_cells = Vec::new();
    for c in 0..n_courses {
        match (snapshot.course_slot[c], snapshot.course_room[c]) {
            (Some(s), Some(r)) => occupied_cells.push((s, r)),
            (None, None) => {}
            other => panic!("course {c} half-placed: {other:?}"),
        }
    }
    let mut deduped = occupied_cells.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), occupied_cells.len());

    // Role invariants on every regular course: active means exactly one
    // lead and one follow, distinct, drawn from the eligibility pools;
    // inactive means nobody.
    for c in 0..n_courses {
        let Some(rv) = net.roles[c].as_ref() else {
            continue;
        };
        let leads: Vec<usize> = (0..n_teachers)
            .filter(|&t| binding.bool_value(rv.lead[t]))
            .collect();
        let follows: Vec<usize> = (0..n_teachers)
            .filter(|&t| binding.bool_value(rv.follow[t]))
            .collect();
        if snapshot.course_slot[c].is_some() {
            assert_eq!(leads.len(), 1);
            assert_eq!(follows.len(), 1);
            assert_ne!(leads[0], follows[0]);
            assert!(problem.lead_pool(c).contains(&leads[0]));
            assert!(problem.follow_pool(c).contains(&follows[0]));
        } else {
            assert!(leads.is_empty());
            assert!(follows.is_empty());
        }
    }

    // Open courses are never taught.
    for c in 0..n_courses {
        if problem.course(c).kind == CourseKind::Open {
            assert!((0..n_teachers).all(|t| !snapshot.teaches[t][c]));
        }
    }

    // Workload caps, hard availability, one course per teacher per slot,
    // one venue per teacher per day.
    for t in 0..n_teachers {
        let taught: Vec<usize> = (0..n_courses).filter(|&c| snapshot.teaches[t][c]).collect();
        assert!(taught.len() <= problem.teacher(t).max_courses as usize);

        let slots: Vec<usize> = taught
            .iter()
            .filter_map(|&c| snapshot.course_slot[c])
            .collect();
        let distinct = {
            let mut s = slots.clone();
            s.sort_unstable();
            s.dedup();
            s.len()
        };
        assert_eq!(distinct, slots.len(), "teacher {t} double-booked");
        for &s in &slots {
            assert_ne!(problem.availability[t][s], 0);
        }

        for d in 0..DAYS {
            let mut venues: Vec<usize> = taught
                .iter()
                .filter(|&&c| snapshot.course_slot[c].map(slot_day) == Some(d))
                .filter_map(|&c| snapshot.course_room[c])
                .map(|r| problem.room_venue[r])
                .collect();
            venues.sort_unstable();
            venues.dedup();
            assert!(venues.len() <= 1, "teacher {t} in two venues on day {d}");
        }
    }

    // Refused pairs never co-teach.
    for &(t1, t2) in &problem.refuse_pairs {
        for c in 0..n_courses {
            assert!(!(snapshot.teaches[t1][c] && snapshot.teaches[t2][c]));
        }
    }
}

#[test]
fn decoding_the_same_binding_twice_is_identical() {
    let (problem, _, net, set, binding) = solve_pipeline(rich_input());

    let first = report::build_output(&problem, &net, &set, &binding, SolveStatus::Optimal, 0);
    let second = report::build_output(&problem, &net, &set, &binding, SolveStatus::Optimal, 0);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(report::render_text(&first), report::render_text(&second));
}
