//! Domain rules that must hold in every accepted timetable. A violated
//! rule here means the whole input is infeasible; none of these are
//! softened or relaxed.

use crate::data::{CourseKind, Problem, DAYS, SLOT_COUNT, TIMES_PER_DAY};
use crate::model::{Expr, Model};
use crate::network::Network;
use itertools::Itertools;
use log::info;

pub fn post(problem: &Problem, net: &Network, model: &mut Model) {
    let n_rooms = problem.n_rooms();
    let n_courses = problem.n_courses();
    let n_teachers = problem.n_teachers();
    let n_venues = problem.n_venues();

    // At most one course per room per slot.
    for s in 0..SLOT_COUNT {
        for r in 0..n_rooms {
            let sum = Expr::sum_bools((0..n_courses).map(|c| net.placement[s][r][c]));
            model.add_le(sum, 1);
        }
    }

    // A teacher teaches at most one course per slot.
    for t in 0..n_teachers {
        for s in 0..SLOT_COUNT {
            let sum = Expr::sum_bools((0..n_courses).map(|c| net.teaches_in_slot[t][s][c]));
            model.add_le(sum, 1);
        }
    }

    // Role cardinality per course kind, gated by activity, and the
    // eligibility pools. Interest 0 is a hard refusal; role pools start
    // from the primary role and widen through declared secondary roles.
    for c in 0..n_courses {
        match problem.course(c).kind {
            CourseKind::Regular => {
                let rv = net.roles[c].as_ref().expect("regular course has role vars");
                let mut leads = Expr::sum_bools(rv.lead.iter().copied());
                leads.add_bool(-1, net.course_active[c]);
                model.add_eq(leads, 0);
                let mut follows = Expr::sum_bools(rv.follow.iter().copied());
                follows.add_bool(-1, net.course_active[c]);
                model.add_eq(follows, 0);
                for t in 0..n_teachers {
                    if problem.interest[t][c] == 0 {
                        model.add_eq(Expr::from_bool(net.teaches[t][c]), 0);
                    } else {
                        if !problem.can_lead[t] {
                            model.add_eq(Expr::from_bool(rv.lead[t]), 0);
                        }
                        if !problem.can_follow[t] {
                            model.add_eq(Expr::from_bool(rv.follow[t]), 0);
                        }
                    }
                }
            }
            CourseKind::Solo => {
                let mut sum = Expr::sum_bools((0..n_teachers).map(|t| net.teaches[t][c]));
                sum.add_bool(-1, net.course_active[c]);
                model.add_eq(sum, 0);
                for t in 0..n_teachers {
                    if problem.interest[t][c] == 0 {
                        model.add_eq(Expr::from_bool(net.teaches[t][c]), 0);
                    }
                }
            }
            CourseKind::Open => {
                let sum = Expr::sum_bools((0..n_teachers).map(|t| net.teaches[t][c]));
                model.add_eq(sum, 0);
            }
        }
    }

    // Workload ceiling. An unstated maximum is 0: nobody teaches on
    // missing data.
    for t in 0..n_teachers {
        model.add_le(
            Expr::from_int(net.teach_count[t]),
            i64::from(problem.teacher(t).max_courses),
        );
    }

    // Hard availability.
    for t in 0..n_teachers {
        for s in 0..SLOT_COUNT {
            if problem.availability[t][s] == 0 {
                model.add_eq(Expr::from_bool(net.teacher_busy[t][s]), 0);
            }
        }
    }

    // Declared incompatible pairs never share a course.
    for &(t1, t2) in &problem.refuse_pairs {
        for c in 0..n_courses {
            let mut pair = Expr::from_bool(net.teaches[t1][c]);
            pair.add_bool(1, net.teaches[t2][c]);
            model.add_le(pair, 1);
        }
    }

    // One venue per teacher per day.
    for t in 0..n_teachers {
        for d in 0..DAYS {
            let sum = Expr::sum_bools((0..n_venues).map(|v| net.teacher_venue_day[t][d][v]));
            model.add_le(sum, 1);
        }
    }

    // Pins.
    for &(c, s) in &problem.fixed_slot {
        model.add_eq(Expr::from_int(net.course_slot[c]), s as i64);
    }
    for (c, slots) in &problem.allowed_slots {
        // Staying closed is always allowed; activity is pinned elsewhere.
        let mut rows: Vec<Vec<i64>> = vec![vec![-1]];
        rows.extend(slots.iter().map(|&s| vec![s as i64]));
        model.add_table(vec![net.course_slot[*c]], rows);
    }
    for &c in &problem.force_open {
        model.add_eq(Expr::from_bool(net.course_active[c]), 1);
    }
    for &c in &problem.force_closed {
        model.add_eq(Expr::from_bool(net.course_active[c]), 0);
    }
    for &(t, c) in &problem.force_teacher {
        model.add_eq_if(
            Expr::from_bool(net.teaches[t][c]),
            1,
            &[net.course_active[c].lit()],
        );
    }
    for &(c, r) in &problem.room_required {
        let mut sum = Expr::sum_bools((0..SLOT_COUNT).map(|s| net.placement[s][r][c]));
        sum.add_bool(-1, net.course_active[c]);
        model.add_eq(sum, 0);
    }
    for &(c, r) in &problem.room_forbidden {
        let sum = Expr::sum_bools((0..SLOT_COUNT).map(|s| net.placement[s][r][c]));
        model.add_eq(sum, 0);
    }

    // Separation families, evaluated per active pair: an inactive course
    // has day -1 and must not take part in the comparison.
    for family in &problem.distinct_day_time {
        for pair in family.iter().combinations(2) {
            let (a, b) = (*pair[0], *pair[1]);
            let both = model.reify_and(&[net.course_active[a].lit(), net.course_active[b].lit()]);
            model.add_not_equal_if(
                Expr::from_int(net.course_day[a]),
                Expr::from_int(net.course_day[b]),
                &[both.lit()],
            );
            model.add_not_equal_if(
                Expr::from_int(net.course_time[a]),
                Expr::from_int(net.course_time[b]),
                &[both.lit()],
            );
        }
    }
    for family in &problem.distinct_day {
        for pair in family.iter().combinations(2) {
            let (a, b) = (*pair[0], *pair[1]);
            let both = model.reify_and(&[net.course_active[a].lit(), net.course_active[b].lit()]);
            model.add_not_equal_if(
                Expr::from_int(net.course_day[a]),
                Expr::from_int(net.course_day[b]),
                &[both.lit()],
            );
        }
    }

    // Back-to-back families: same day, same venue, contiguous times. The
    // allowed time tuples are enumerated: a 2-course family must take an
    // adjacent pair, not just two distinct times, and none of the rows
    // contain -1 so every member is forced open.
    for family in &problem.back_to_back {
        let first = family[0];
        for &other in &family[1..] {
            let mut day = Expr::from_int(net.course_day[first]);
            day.add_int(-1, net.course_day[other]);
            model.add_eq(day, 0);
            let mut venue = Expr::from_int(net.course_venue[first]);
            venue.add_int(-1, net.course_venue[other]);
            model.add_eq(venue, 0);
        }
        let times: Vec<_> = family.iter().map(|&c| net.course_time[c]).collect();
        let rows: Vec<Vec<i64>> = if family.len() == TIMES_PER_DAY {
            (0..TIMES_PER_DAY as i64)
                .permutations(TIMES_PER_DAY)
                .collect()
        } else {
            vec![vec![0, 1], vec![1, 0], vec![1, 2], vec![2, 1]]
        };
        model.add_table(times, rows);
    }

    let (bools, ints, constraints) = model.stats();
    info!(
        "hard constraints posted: {} booleans, {} integers, {} constraints",
        bools, ints, constraints
    );
}
