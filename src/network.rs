//! The variable network: primitive decision variables plus every derived
//! relation, tied together by two-directional equivalences so that hard
//! constraints and penalties can be written against whichever level is
//! most natural.

use crate::data::{day_slots, CourseKind, Problem, DAYS, SLOT_COUNT, TIMES_PER_DAY};
use crate::model::{BoolVar, Cmp, Expr, IntVar, Model};
use log::info;

/// Lead/follow refinement of `teaches` for one regular course, indexed by
/// teacher.
#[derive(Debug)]
pub struct RoleVars {
    pub lead: Vec<BoolVar>,
    pub follow: Vec<BoolVar>,
}

#[derive(Debug)]
pub struct Network {
    /// Course occupies (slot, room).
    pub placement: Vec<Vec<Vec<BoolVar>>>,
    /// Course occupies the slot in some room; agrees with `placement`
    /// summed over rooms, per slot.
    pub occupies: Vec<Vec<BoolVar>>,
    /// Flat slot of the course, -1 when it does not run.
    pub course_slot: Vec<IntVar>,
    pub course_active: Vec<BoolVar>,
    /// Day and time-of-day of the course, -1 when it does not run.
    pub course_day: Vec<IntVar>,
    pub course_time: Vec<IntVar>,
    /// Venue of the course's room, -1 when it does not run.
    pub course_venue: Vec<IntVar>,
    /// Course runs on the day in a room of the venue.
    pub course_day_venue: Vec<Vec<Vec<BoolVar>>>,
    /// Teacher teaches the course, in any role.
    pub teaches: Vec<Vec<BoolVar>>,
    /// Role refinement, present for regular courses only.
    pub roles: Vec<Option<RoleVars>>,
    /// Teacher teaches the course in the slot.
    pub teaches_in_slot: Vec<Vec<Vec<BoolVar>>>,
    /// Teacher teaches something in the slot.
    pub teacher_busy: Vec<Vec<BoolVar>>,
    /// Teacher teaches or attends the course.
    pub person_course: Vec<Vec<BoolVar>>,
    /// Teacher teaches or attends the course in the slot.
    pub person_in_slot: Vec<Vec<Vec<BoolVar>>>,
    /// Teacher teaches or attends something in the slot.
    pub person_busy: Vec<Vec<BoolVar>>,
    /// Teacher teaches something on the day.
    pub teacher_day: Vec<Vec<BoolVar>>,
    /// Teacher teaches or attends something on the day.
    pub person_day: Vec<Vec<BoolVar>>,
    /// Teacher teaches in the venue on the day.
    pub teacher_venue_day: Vec<Vec<Vec<BoolVar>>>,
    /// Number of courses the teacher teaches.
    pub teach_count: Vec<IntVar>,
    /// Number of slots the teacher teaches or attends in.
    pub occupied_count: Vec<IntVar>,
}

impl Network {
    pub fn build(problem: &Problem, model: &mut Model) -> Network {
        let n_rooms = problem.n_rooms();
        let n_courses = problem.n_courses();
        let n_teachers = problem.n_teachers();
        let n_venues = problem.n_venues();

        // Primitive decision variables.
        let placement: Vec<Vec<Vec<BoolVar>>> = (0..SLOT_COUNT)
            .map(|_| {
                (0..n_rooms)
                    .map(|_| (0..n_courses).map(|_| model.new_bool()).collect())
                    .collect()
            })
            .collect();
        let teaches: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|_| (0..n_courses).map(|_| model.new_bool()).collect())
            .collect();
        let roles: Vec<Option<RoleVars>> = (0..n_courses)
            .map(|c| {
                (problem.course(c).kind == CourseKind::Regular).then(|| RoleVars {
                    lead: (0..n_teachers).map(|_| model.new_bool()).collect(),
                    follow: (0..n_teachers).map(|_| model.new_bool()).collect(),
                })
            })
            .collect();

        // A teacher either leads or follows a regular course, never both
        // at once, and teaches it exactly when one of the roles holds.
        for (c, role_vars) in roles.iter().enumerate() {
            if let Some(rv) = role_vars {
                for t in 0..n_teachers {
                    model.link_or(teaches[t][c], &[rv.lead[t].lit(), rv.follow[t].lit()]);
                    let mut both = Expr::from_bool(rv.lead[t]);
                    both.add_bool(1, rv.follow[t]);
                    model.add_le(both, 1);
                }
            }
        }

        // Course occupancy per slot, and the slot/day/time/activity chain.
        let occupies: Vec<Vec<BoolVar>> = (0..SLOT_COUNT)
            .map(|s| {
                (0..n_courses)
                    .map(|c| {
                        let hit = model.new_bool();
                        let rooms = Expr::sum_bools((0..n_rooms).map(|r| placement[s][r][c]));
                        model.link_count_one_or_zero(hit, rooms);
                        hit
                    })
                    .collect()
            })
            .collect();

        let course_slot: Vec<IntVar> = (0..n_courses)
            .map(|_| model.new_int(-1, SLOT_COUNT as i64 - 1))
            .collect();
        for c in 0..n_courses {
            // Both directions per slot: a placement pins the slot value,
            // its absence forbids it, so -1 is left exactly for the
            // inactive case.
            for s in 0..SLOT_COUNT {
                model.link_int_eq(occupies[s][c], course_slot[c], s as i64);
            }
        }

        let course_active: Vec<BoolVar> = (0..n_courses)
            .map(|c| {
                let placement = &placement;
                let hit = model.new_bool();
                let total = Expr::sum_bools(
                    (0..SLOT_COUNT).flat_map(|s| (0..n_rooms).map(move |r| placement[s][r][c])),
                );
                model.link_count_one_or_zero(hit, total);
                hit
            })
            .collect();

        let course_day: Vec<IntVar> = (0..n_courses)
            .map(|_| model.new_int(-1, DAYS as i64 - 1))
            .collect();
        let course_time: Vec<IntVar> = (0..n_courses)
            .map(|_| model.new_int(-1, TIMES_PER_DAY as i64 - 1))
            .collect();
        for c in 0..n_courses {
            let active = course_active[c].lit();
            let inactive = course_active[c].negated();
            // slot = 3*day + time with time in [0,2]: floor semantics of
            // the flat index.
            let mut flat = Expr::from_int(course_slot[c]);
            flat.add_int(-(TIMES_PER_DAY as i64), course_day[c]);
            flat.add_int(-1, course_time[c]);
            model.add_eq_if(flat, 0, &[active]);
            model.add_ge_if(Expr::from_int(course_day[c]), 0, &[active]);
            model.add_ge_if(Expr::from_int(course_time[c]), 0, &[active]);
            model.add_eq_if(Expr::from_int(course_day[c]), -1, &[inactive]);
            model.add_eq_if(Expr::from_int(course_time[c]), -1, &[inactive]);
        }

        // Venue chain.
        let course_day_venue: Vec<Vec<Vec<BoolVar>>> = (0..n_courses)
            .map(|c| {
                let placement = &placement;
                (0..DAYS)
                    .map(|d| {
                        (0..n_venues)
                            .map(|v| {
                                let hit = model.new_bool();
                                let sum = Expr::sum_bools(day_slots(d).flat_map(|s| {
                                    (0..n_rooms)
                                        .filter(|&r| problem.room_venue[r] == v)
                                        .map(move |r| placement[s][r][c])
                                }));
                                model.link_count_positive(hit, sum);
                                hit
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let course_venue: Vec<IntVar> = (0..n_courses)
            .map(|_| model.new_int(-1, n_venues as i64 - 1))
            .collect();
        for c in 0..n_courses {
            for v in 0..n_venues {
                let lits: Vec<_> = (0..DAYS).map(|d| course_day_venue[c][d][v].lit()).collect();
                let hit = model.reify_or(&lits);
                model.link_int_eq(hit, course_venue[c], v as i64);
            }
        }

        // Teaching occupancy chain.
        let teaches_in_slot: Vec<Vec<Vec<BoolVar>>> = (0..n_teachers)
            .map(|t| {
                (0..SLOT_COUNT)
                    .map(|s| {
                        (0..n_courses)
                            .map(|c| {
                                let hit = model.new_bool();
                                model.link_and(
                                    hit,
                                    &[teaches[t][c].lit(), occupies[s][c].lit()],
                                );
                                hit
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let teacher_busy: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|t| {
                (0..SLOT_COUNT)
                    .map(|s| {
                        let hit = model.new_bool();
                        let sum = Expr::sum_bools((0..n_courses).map(|c| teaches_in_slot[t][s][c]));
                        model.link_count_positive(hit, sum);
                        hit
                    })
                    .collect()
            })
            .collect();

        // Teach-or-attend occupancy chain. Attendance wishes are static
        // input, so `person_course` collapses to `teaches` unless the
        // wish pins it true.
        let person_course: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|p| {
                (0..n_courses)
                    .map(|c| {
                        let hit = model.new_bool();
                        if problem.attends[p][c] {
                            model.add_eq(Expr::from_bool(hit), 1);
                        } else {
                            let mut same = Expr::from_bool(hit);
                            same.add_bool(-1, teaches[p][c]);
                            model.add_eq(same, 0);
                        }
                        hit
                    })
                    .collect()
            })
            .collect();

        let person_in_slot: Vec<Vec<Vec<BoolVar>>> = (0..n_teachers)
            .map(|p| {
                (0..SLOT_COUNT)
                    .map(|s| {
                        (0..n_courses)
                            .map(|c| {
                                let hit = model.new_bool();
                                model.link_and(
                                    hit,
                                    &[person_course[p][c].lit(), occupies[s][c].lit()],
                                );
                                hit
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let person_busy: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|p| {
                (0..SLOT_COUNT)
                    .map(|s| {
                        let hit = model.new_bool();
                        let sum = Expr::sum_bools((0..n_courses).map(|c| person_in_slot[p][s][c]));
                        model.link_count_positive(hit, sum);
                        hit
                    })
                    .collect()
            })
            .collect();

        // Day aggregates.
        let teacher_day: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|t| {
                (0..DAYS)
                    .map(|d| {
                        let hit = model.new_bool();
                        let sum = Expr::sum_bools(day_slots(d).map(|s| teacher_busy[t][s]));
                        model.link_count_positive(hit, sum);
                        hit
                    })
                    .collect()
            })
            .collect();
        let person_day: Vec<Vec<BoolVar>> = (0..n_teachers)
            .map(|p| {
                (0..DAYS)
                    .map(|d| {
                        let hit = model.new_bool();
                        let sum = Expr::sum_bools(day_slots(d).map(|s| person_busy[p][s]));
                        model.link_count_positive(hit, sum);
                        hit
                    })
                    .collect()
            })
            .collect();

        // Teacher commits to a venue per day through the courses taught.
        let teacher_venue_day: Vec<Vec<Vec<BoolVar>>> = (0..n_teachers)
            .map(|t| {
                (0..DAYS)
                    .map(|d| {
                        (0..n_venues)
                            .map(|v| {
                                let links: Vec<BoolVar> = (0..n_courses)
                                    .map(|c| {
                                        model.reify_and(&[
                                            teaches[t][c].lit(),
                                            course_day_venue[c][d][v].lit(),
                                        ])
                                    })
                                    .collect();
                                let hit = model.new_bool();
                                model.link_count_positive(hit, Expr::sum_bools(links));
                                hit
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        // Counters.
        let teach_count: Vec<IntVar> = (0..n_teachers)
            .map(|t| {
                let count = model.new_int(0, n_courses as i64);
                let mut sum = Expr::sum_bools((0..n_courses).map(|c| teaches[t][c]));
                sum.add_int(-1, count);
                model.add_linear(sum, Cmp::Eq, 0);
                count
            })
            .collect();
        let occupied_count: Vec<IntVar> = (0..n_teachers)
            .map(|p| {
                let count = model.new_int(0, SLOT_COUNT as i64);
                let mut sum = Expr::sum_bools((0..SLOT_COUNT).map(|s| person_busy[p][s]));
                sum.add_int(-1, count);
                model.add_linear(sum, Cmp::Eq, 0);
                count
            })
            .collect();

        let (bools, ints, constraints) = model.stats();
        info!(
            "variable network: {} booleans, {} integers, {} constraints so far",
            bools, ints, constraints
        );

        Network {
            placement,
            occupies,
            course_slot,
            course_active,
            course_day,
            course_time,
            course_venue,
            course_day_venue,
            teaches,
            roles,
            teaches_in_slot,
            teacher_busy,
            person_course,
            person_in_slot,
            person_busy,
            teacher_day,
            person_day,
            teacher_venue_day,
            teach_count,
            occupied_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Course, CourseKind, PenaltyWeights, Room, Rules, Teacher, TeacherRole, TimetableInput};
    use std::collections::HashMap;

    #[test]
    fn network_tables_have_domain_shape() {
        let input = TimetableInput {
            rooms: vec![
                Room {
                    name: "k-3".into(),
                    venue: "koliste".into(),
                },
                Room {
                    name: "k-4".into(),
                    venue: "koliste".into(),
                },
            ],
            courses: vec![
                Course {
                    name: "Blues 1".into(),
                    kind: CourseKind::Regular,
                },
                Course {
                    name: "Solo Jazz".into(),
                    kind: CourseKind::Solo,
                },
            ],
            teachers: vec![Teacher {
                name: "Roman".into(),
                role: TeacherRole::Lead,
                max_courses: 1,
                ideal_courses: None,
                availability: vec![3; SLOT_COUNT],
                interest: HashMap::new(),
                attend: vec![],
                prefer_with: vec![],
                refuse_with: vec![],
                days_pref: Default::default(),
                gap_pref: Default::default(),
                boost: None,
            }],
            students: vec![],
            rules: Rules::default(),
            weights: PenaltyWeights::default(),
        };
        let problem = Problem::new(input).unwrap();
        let mut model = Model::new();
        let net = Network::build(&problem, &mut model);
        assert_eq!(net.placement.len(), SLOT_COUNT);
        assert_eq!(net.placement[0].len(), 2);
        assert_eq!(net.placement[0][0].len(), 2);
        assert_eq!(net.course_slot.len(), 2);
        assert!(net.roles[0].is_some());
        assert!(net.roles[1].is_none());
        assert_eq!(net.teacher_venue_day[0].len(), DAYS);
        assert_eq!(net.teacher_venue_day[0][0].len(), 1);
        assert_eq!(model.int_domain(net.course_slot[0]), (-1, 11));
    }
}
