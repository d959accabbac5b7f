//! Soft-preference violations, composed as independently named, weighted
//! and explainable integer terms. The objective is the weighted sum of
//! every contribution.
//!
//! A term only ever charges people who expressed the matching preference:
//! indifference yields a zero contribution, not just a zero weight. Both
//! that applicability and the "best preference" boost are pure functions
//! of the person's preferences, evaluated once while composing.

use crate::data::{
    slot_day, slot_name, BoostDimension, CourseKind, DaysPref, GapPref, Problem, TeacherId, DAYS,
    SLOT_COUNT, TIMES_PER_DAY,
};
use crate::model::{Expr, Model};
use crate::network::Network;
use crate::report::ScheduleSnapshot;
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PenaltyKind {
    /// Squared gap between taught and ideal course count.
    Utilization,
    /// Squared teaching days beyond the minimum the course count needs.
    TeachDays,
    /// Same, over teach-or-attend occupancy.
    OccupiedDays,
    /// Days with all three slots taught.
    TeachThree,
    /// Days teaching first and last slot with the middle free.
    Split,
    /// Teaching in strongly disliked slots.
    SlotprefBad,
    /// Teaching in mildly disliked slots.
    SlotprefSlight,
    /// Teaching strongly disliked courses.
    CourseprefBad,
    /// Teaching mildly disliked courses.
    CourseprefSlight,
    /// Not a single course shared with a preferred co-teacher.
    TeachTogether,
    /// People kept from attending a course they asked for.
    AttendClash,
    /// Courses that did not run.
    CoursesClosed,
    /// Students whose wish cannot be attended at all.
    StudBad,
    /// Ad hoc terms registered by the caller.
    Custom(String),
}

impl PenaltyKind {
    pub fn name(&self) -> &str {
        match self {
            PenaltyKind::Utilization => "utilization",
            PenaltyKind::TeachDays => "teach_days",
            PenaltyKind::OccupiedDays => "occupied_days",
            PenaltyKind::TeachThree => "teach_three",
            PenaltyKind::Split => "split",
            PenaltyKind::SlotprefBad => "slotpref_bad",
            PenaltyKind::SlotprefSlight => "slotpref_slight",
            PenaltyKind::CourseprefBad => "coursepref_bad",
            PenaltyKind::CourseprefSlight => "coursepref_slight",
            PenaltyKind::TeachTogether => "teach_together",
            PenaltyKind::AttendClash => "attend_clash",
            PenaltyKind::CoursesClosed => "courses_closed",
            PenaltyKind::StudBad => "stud_bad",
            PenaltyKind::Custom(name) => name,
        }
    }
}

/// Whether the term applies to this person at all and, if so, which
/// multiplier their contributions carry. `None` means the person never
/// contributes, no matter what the schedule looks like. The multiplier
/// is 2 when the term's dimension is the person's declared best
/// preference, 1 otherwise.
pub fn person_factor(kind: &PenaltyKind, problem: &Problem, t: TeacherId) -> Option<i64> {
    let teacher = problem.teacher(t);
    let boost = |dim: BoostDimension| if teacher.boost == Some(dim) { 2 } else { 1 };
    let slot_vals = &problem.availability[t];
    let course_vals = || -> Vec<u8> {
        (0..problem.n_courses())
            .filter(|&c| problem.course(c).kind != CourseKind::Open)
            .map(|c| problem.interest[t][c])
            .collect()
    };
    match kind {
        PenaltyKind::Utilization => teacher.ideal_courses.map(|_| 1),
        PenaltyKind::TeachDays | PenaltyKind::OccupiedDays => {
            (teacher.days_pref == DaysPref::FewerDays).then_some(1)
        }
        PenaltyKind::TeachThree => (teacher.days_pref == DaysPref::FewerPerDay).then_some(1),
        PenaltyKind::Split => (teacher.gap_pref == GapPref::DislikesGaps).then_some(1),
        PenaltyKind::SlotprefBad => (slot_vals.contains(&1)
            && (slot_vals.contains(&2) || slot_vals.contains(&3)))
        .then(|| boost(BoostDimension::Time)),
        PenaltyKind::SlotprefSlight => (slot_vals.contains(&2) && slot_vals.contains(&3))
            .then(|| boost(BoostDimension::Time)),
        PenaltyKind::CourseprefBad => {
            let vals = course_vals();
            (vals.contains(&1) && (vals.contains(&2) || vals.contains(&3)))
                .then(|| boost(BoostDimension::Course))
        }
        PenaltyKind::CourseprefSlight => {
            let vals = course_vals();
            (vals.contains(&2) && vals.contains(&3)).then(|| boost(BoostDimension::Course))
        }
        PenaltyKind::TeachTogether => {
            (!problem.prefer_with[t].is_empty()).then(|| boost(BoostDimension::Person))
        }
        PenaltyKind::AttendClash
        | PenaltyKind::CoursesClosed
        | PenaltyKind::StudBad
        | PenaltyKind::Custom(_) => None,
    }
}

/// One named objective term: integer contributions (boost already folded
/// in) and the weight they are charged at.
#[derive(Debug)]
pub struct PenaltyTerm {
    pub kind: PenaltyKind,
    pub weight: i64,
    pub contributions: Vec<Expr>,
}

impl PenaltyTerm {
    /// Raw count of the term under a concrete assignment.
    pub fn count(&self, binding: &crate::model::Binding) -> i64 {
        self.contributions.iter().map(|e| e.eval(binding)).sum()
    }
}

#[derive(Debug, Default)]
pub struct PenaltySet {
    pub terms: Vec<PenaltyTerm>,
}

impl PenaltySet {
    /// Registers an ad hoc term. Custom terms carry no automatic explain
    /// detail; the raw count still shows up in the ledger.
    pub fn add_custom(&mut self, name: impl Into<String>, weight: i64, contributions: Vec<Expr>) {
        if weight == 0 {
            return;
        }
        self.terms.push(PenaltyTerm {
            kind: PenaltyKind::Custom(name.into()),
            weight,
            contributions,
        });
    }

    /// The minimization objective: weighted sum over every term.
    pub fn objective(&self) -> Expr {
        let mut total = Expr::default();
        for term in &self.terms {
            for contribution in &term.contributions {
                for &(coeff, var) in &contribution.terms {
                    total.terms.push((term.weight * coeff, var));
                }
                total.constant += term.weight * contribution.constant;
            }
        }
        total
    }
}

pub fn compose(problem: &Problem, net: &Network, model: &mut Model) -> PenaltySet {
    let weights = problem.input.weights.clone();
    let n_courses = problem.n_courses();
    let n_teachers = problem.n_teachers();
    let mut set = PenaltySet::default();

    let push = |set: &mut PenaltySet, kind: PenaltyKind, weight: i64, contributions: Vec<Expr>| {
        if weight == 0 {
            info!("penalties: skipping '{}'", kind.name());
            return;
        }
        set.terms.push(PenaltyTerm {
            kind,
            weight,
            contributions,
        });
    };

    // utilization: squared deviation from the stated ideal.
    {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            let Some(mult) = person_factor(&PenaltyKind::Utilization, problem, t) else {
                continue;
            };
            let ideal = i64::from(problem.teacher(t).ideal_courses.unwrap_or(0));
            let (lo, hi) = (-ideal, n_courses as i64 - ideal);
            let diff = model.new_int(lo, hi);
            let mut tie = Expr::from_int(net.teach_count[t]);
            tie.add_const(-ideal);
            tie.add_int(-1, diff);
            model.add_eq(tie, 0);
            let sq = model.new_int(0, (lo * lo).max(hi * hi));
            model.add_square(sq, diff);
            let mut e = Expr::default();
            e.add_int(mult, sq);
            contributions.push(e);
        }
        push(&mut set, PenaltyKind::Utilization, weights.utilization, contributions);
    }

    // teach_days / occupied_days: squared days beyond the minimum the
    // count of taught courses (or busy slots) could fit into.
    let excess_days = |model: &mut Model,
                           day_flags: &[crate::model::BoolVar],
                           count: crate::model::IntVar,
                           count_max: i64|
     -> Expr {
        let days = model.new_int(0, DAYS as i64);
        let mut tie = Expr::sum_bools(day_flags.iter().copied());
        tie.add_int(-1, days);
        model.add_eq(tie, 0);
        let some = model.reify_count_positive(Expr::from_int(count));
        let minus_one = model.new_int(0, (count_max - 1).max(0));
        let mut m = Expr::from_int(count);
        m.add_const(-1);
        m.add_int(-1, minus_one);
        model.add_eq_if(m, 0, &[some.lit()]);
        model.add_eq_if(Expr::from_int(minus_one), 0, &[some.negated()]);
        // -1 then divide compensates the rounding: n courses need
        // (n-1) div 3 + 1 days.
        let needed = model.new_int(0, DAYS as i64);
        model.add_div_const(needed, Expr::from_int(minus_one), TIMES_PER_DAY as i64);
        let extra = model.new_int(0, DAYS as i64);
        let mut x = Expr::from_int(days);
        x.add_int(-1, needed);
        x.add_const(-1);
        x.add_int(-1, extra);
        model.add_eq_if(x, 0, &[some.lit()]);
        model.add_eq_if(Expr::from_int(extra), 0, &[some.negated()]);
        let sq = model.new_int(0, (DAYS * DAYS) as i64);
        model.add_square(sq, extra);
        Expr::from_int(sq)
    };

    {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            if person_factor(&PenaltyKind::TeachDays, problem, t).is_none() {
                continue;
            }
            contributions.push(excess_days(
                model,
                &net.teacher_day[t],
                net.teach_count[t],
                n_courses as i64,
            ));
        }
        push(&mut set, PenaltyKind::TeachDays, weights.teach_days, contributions);
    }
    {
        let mut contributions = Vec::new();
        for p in 0..n_teachers {
            if person_factor(&PenaltyKind::OccupiedDays, problem, p).is_none() {
                continue;
            }
            contributions.push(excess_days(
                model,
                &net.person_day[p],
                net.occupied_count[p],
                SLOT_COUNT as i64,
            ));
        }
        push(
            &mut set,
            PenaltyKind::OccupiedDays,
            weights.occupied_days,
            contributions,
        );
    }

    // teach_three: fully taught days, for people who would rather spread.
    {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            if person_factor(&PenaltyKind::TeachThree, problem, t).is_none() {
                continue;
            }
            let mut full_days = Vec::new();
            for d in 0..DAYS {
                let base = d * TIMES_PER_DAY;
                full_days.push(model.reify_and(&[
                    net.teacher_busy[t][base].lit(),
                    net.teacher_busy[t][base + 1].lit(),
                    net.teacher_busy[t][base + 2].lit(),
                ]));
            }
            contributions.push(Expr::sum_bools(full_days));
        }
        push(&mut set, PenaltyKind::TeachThree, weights.teach_three, contributions);
    }

    // split: first and last slot taught, middle free.
    {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            if person_factor(&PenaltyKind::Split, problem, t).is_none() {
                continue;
            }
            let mut split_days = Vec::new();
            for d in 0..DAYS {
                let base = d * TIMES_PER_DAY;
                split_days.push(model.reify_and(&[
                    net.teacher_busy[t][base].lit(),
                    net.teacher_busy[t][base + 1].negated(),
                    net.teacher_busy[t][base + 2].lit(),
                ]));
            }
            contributions.push(Expr::sum_bools(split_days));
        }
        push(&mut set, PenaltyKind::Split, weights.split, contributions);
    }

    // Disliked slots and courses, boostable.
    let slotpref = |kind: PenaltyKind, disliked: u8, weight: i64, set: &mut PenaltySet| {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            let Some(mult) = person_factor(&kind, problem, t) else {
                continue;
            };
            let slots: Vec<_> = (0..SLOT_COUNT)
                .filter(|&s| problem.availability[t][s] == disliked)
                .collect();
            if slots.is_empty() {
                continue;
            }
            let mut e = Expr::default();
            for s in slots {
                e.add_bool(mult, net.teacher_busy[t][s]);
            }
            contributions.push(e);
        }
        push(set, kind, weight, contributions);
    };
    slotpref(PenaltyKind::SlotprefBad, 1, weights.slotpref_bad, &mut set);
    slotpref(
        PenaltyKind::SlotprefSlight,
        2,
        weights.slotpref_slight,
        &mut set,
    );

    let coursepref = |kind: PenaltyKind, disliked: u8, weight: i64, set: &mut PenaltySet| {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            let Some(mult) = person_factor(&kind, problem, t) else {
                continue;
            };
            let courses: Vec<_> = (0..n_courses)
                .filter(|&c| {
                    problem.course(c).kind != CourseKind::Open && problem.interest[t][c] == disliked
                })
                .collect();
            if courses.is_empty() {
                continue;
            }
            let mut e = Expr::default();
            for c in courses {
                e.add_bool(mult, net.teaches[t][c]);
            }
            contributions.push(e);
        }
        push(set, kind, weight, contributions);
    };
    coursepref(PenaltyKind::CourseprefBad, 1, weights.coursepref_bad, &mut set);
    coursepref(
        PenaltyKind::CourseprefSlight,
        2,
        weights.coursepref_slight,
        &mut set,
    );

    // teach_together: one binary miss per teacher with a stated wish.
    {
        let mut contributions = Vec::new();
        for t in 0..n_teachers {
            let Some(mult) = person_factor(&PenaltyKind::TeachTogether, problem, t) else {
                continue;
            };
            let mut successes = Vec::new();
            for c in 0..n_courses {
                let partner = model.reify_count_positive(Expr::sum_bools(
                    problem.prefer_with[t].iter().map(|&o| net.teaches[o][c]),
                ));
                successes.push(model.reify_and(&[net.teaches[t][c].lit(), partner.lit()]));
            }
            let any = model.reify_count_positive(Expr::sum_bools(successes));
            let mut e = Expr::constant(mult);
            e.add_bool(-mult, any);
            contributions.push(e);
        }
        push(
            &mut set,
            PenaltyKind::TeachTogether,
            weights.teach_together,
            contributions,
        );
    }

    // attend_clash: per wished course and slot, how many interested
    // people are blocked there. Blocked means hard-unavailable or busy
    // with a different course; the wished course itself is excluded,
    // otherwise its own audience would count as blocked.
    {
        let mut contributions = Vec::new();
        for c in 0..n_courses {
            let people: Vec<_> = (0..n_teachers).filter(|&p| problem.attends[p][c]).collect();
            if people.is_empty() {
                continue;
            }
            let mut course_expr = Expr::default();
            for s in 0..SLOT_COUNT {
                let mut blocked = Expr::default();
                for &p in &people {
                    if problem.availability[p][s] == 0 {
                        blocked.add_const(1);
                    } else {
                        let lits: Vec<_> = (0..n_courses)
                            .filter(|&other| other != c)
                            .map(|other| net.person_in_slot[p][s][other].lit())
                            .collect();
                        let busy_elsewhere = model.reify_or(&lits);
                        blocked.add_bool(1, busy_elsewhere);
                    }
                }
                let pen = model.new_int(0, people.len() as i64);
                let mut tie = blocked;
                tie.add_int(-1, pen);
                model.add_eq_if(tie, 0, &[net.occupies[s][c].lit()]);
                model.add_eq_if(Expr::from_int(pen), 0, &[net.occupies[s][c].negated()]);
                course_expr.add_int(1, pen);
            }
            contributions.push(course_expr);
        }
        push(&mut set, PenaltyKind::AttendClash, weights.attend_clash, contributions);
    }

    // courses_closed: courses the solver left out. Courses pinned closed
    // by configuration are not charged.
    {
        let mut e = Expr::default();
        for c in 0..n_courses {
            if problem.force_closed.contains(&c) {
                continue;
            }
            e.add_const(1);
            e.add_bool(-1, net.course_active[c]);
        }
        push(
            &mut set,
            PenaltyKind::CoursesClosed,
            weights.courses_closed,
            vec![e],
        );
    }

    // stud_bad: a wish is lost when no matching course runs in a slot
    // outside the student's blackout.
    {
        let mut contributions = Vec::new();
        for (student, _, matched) in &problem.student_wishes {
            let blackout = &problem.input.students[*student].blackout;
            let lits: Vec<_> = matched
                .iter()
                .flat_map(|&c| {
                    (0..SLOT_COUNT)
                        .filter(|s| !blackout.contains(s))
                        .map(move |s| (c, s))
                })
                .map(|(c, s)| net.occupies[s][c].lit())
                .collect();
            if lits.is_empty() {
                contributions.push(Expr::constant(1));
                continue;
            }
            let reachable = model.reify_or(&lits);
            let mut e = Expr::constant(1);
            e.add_bool(-1, reachable);
            contributions.push(e);
        }
        push(&mut set, PenaltyKind::StudBad, weights.stud_bad, contributions);
    }

    info!(
        "penalty composer: {} active terms",
        set.terms.len()
    );
    set
}

impl PenaltyTerm {
    /// Re-derives, from the decoded schedule alone, the people and
    /// courses responsible for this term's count. This is deliberately
    /// independent of the solver variables so it doubles as a
    /// consistency check on the encoding.
    pub fn explain(&self, problem: &Problem, snapshot: &ScheduleSnapshot) -> Vec<String> {
        let n_courses = problem.n_courses();
        let n_teachers = problem.n_teachers();
        let taught = |t: TeacherId| -> Vec<usize> {
            (0..n_courses).filter(|&c| snapshot.teaches[t][c]).collect()
        };
        let teaching_slots = |t: TeacherId| -> Vec<usize> {
            taught(t)
                .into_iter()
                .filter_map(|c| snapshot.course_slot[c])
                .collect()
        };
        let busy_slots = |p: TeacherId| -> Vec<usize> {
            let mut slots: Vec<usize> = (0..n_courses)
                .filter(|&c| snapshot.teaches[p][c] || problem.attends[p][c])
                .filter_map(|c| snapshot.course_slot[c])
                .collect();
            slots.sort_unstable();
            slots.dedup();
            slots
        };
        let applies = |t: TeacherId| person_factor(&self.kind, problem, t).is_some();

        match &self.kind {
            PenaltyKind::Utilization => (0..n_teachers)
                .filter(|&t| applies(t))
                .filter_map(|t| {
                    let ideal = u32::from(problem.teacher(t).ideal_courses.unwrap_or(0)) as usize;
                    let real = taught(t).len();
                    (real != ideal).then(|| {
                        format!(
                            "{} teaches {}, wanted {}",
                            problem.teacher(t).name,
                            real,
                            ideal
                        )
                    })
                })
                .collect(),
            PenaltyKind::TeachDays => (0..n_teachers)
                .filter(|&t| applies(t))
                .filter_map(|t| {
                    let slots = teaching_slots(t);
                    if slots.is_empty() {
                        return None;
                    }
                    let mut days: Vec<_> = slots.iter().map(|&s| slot_day(s)).collect();
                    days.sort_unstable();
                    days.dedup();
                    let needed = (slots.len() - 1) / TIMES_PER_DAY + 1;
                    (days.len() > needed).then(|| {
                        format!(
                            "{}: {} courses across {} days",
                            problem.teacher(t).name,
                            slots.len(),
                            days.len()
                        )
                    })
                })
                .collect(),
            PenaltyKind::OccupiedDays => (0..n_teachers)
                .filter(|&p| applies(p))
                .filter_map(|p| {
                    let slots = busy_slots(p);
                    if slots.is_empty() {
                        return None;
                    }
                    let mut days: Vec<_> = slots.iter().map(|&s| slot_day(s)).collect();
                    days.sort_unstable();
                    days.dedup();
                    let needed = (slots.len() - 1) / TIMES_PER_DAY + 1;
                    (days.len() > needed).then(|| {
                        format!(
                            "{}: {} busy slots across {} days",
                            problem.teacher(p).name,
                            slots.len(),
                            days.len()
                        )
                    })
                })
                .collect(),
            PenaltyKind::TeachThree => (0..n_teachers)
                .filter(|&t| applies(t))
                .flat_map(|t| {
                    let slots = teaching_slots(t);
                    (0..DAYS)
                        .filter(move |&d| {
                            (0..TIMES_PER_DAY).all(|i| slots.contains(&(d * TIMES_PER_DAY + i)))
                        })
                        .map(move |d| {
                            format!(
                                "{}: all of {}",
                                problem.teacher(t).name,
                                crate::data::DAY_NAMES[d]
                            )
                        })
                })
                .collect(),
            PenaltyKind::Split => (0..n_teachers)
                .filter(|&t| applies(t))
                .flat_map(|t| {
                    let slots = teaching_slots(t);
                    (0..DAYS)
                        .filter(move |&d| {
                            let base = d * TIMES_PER_DAY;
                            slots.contains(&base)
                                && !slots.contains(&(base + 1))
                                && slots.contains(&(base + 2))
                        })
                        .map(move |d| {
                            format!(
                                "{}: gap on {}",
                                problem.teacher(t).name,
                                crate::data::DAY_NAMES[d]
                            )
                        })
                })
                .collect(),
            PenaltyKind::SlotprefBad | PenaltyKind::SlotprefSlight => {
                let disliked = if self.kind == PenaltyKind::SlotprefBad {
                    1
                } else {
                    2
                };
                (0..n_teachers)
                    .filter(|&t| applies(t))
                    .flat_map(|t| {
                        teaching_slots(t)
                            .into_iter()
                            .filter(move |&s| problem.availability[t][s] == disliked)
                            .map(move |s| {
                                format!("{}: {}", problem.teacher(t).name, slot_name(s))
                            })
                    })
                    .collect()
            }
            PenaltyKind::CourseprefBad | PenaltyKind::CourseprefSlight => {
                let disliked = if self.kind == PenaltyKind::CourseprefBad {
                    1
                } else {
                    2
                };
                (0..n_teachers)
                    .filter(|&t| applies(t))
                    .flat_map(|t| {
                        taught(t)
                            .into_iter()
                            .filter(move |&c| problem.interest[t][c] == disliked)
                            .map(move |c| {
                                format!(
                                    "{}: {}",
                                    problem.teacher(t).name,
                                    problem.course(c).name
                                )
                            })
                    })
                    .collect()
            }
            PenaltyKind::TeachTogether => (0..n_teachers)
                .filter(|&t| applies(t))
                .filter(|&t| {
                    !taught(t).iter().any(|&c| {
                        problem.prefer_with[t].iter().any(|&o| snapshot.teaches[o][c])
                    })
                })
                .map(|t| problem.teacher(t).name.clone())
                .collect(),
            PenaltyKind::AttendClash => {
                let mut out = Vec::new();
                for c in 0..n_courses {
                    let Some(s) = snapshot.course_slot[c] else {
                        continue;
                    };
                    for p in 0..n_teachers {
                        if !problem.attends[p][c] {
                            continue;
                        }
                        let hard = problem.availability[p][s] == 0;
                        let elsewhere = (0..n_courses).any(|other| {
                            other != c
                                && snapshot.course_slot[other] == Some(s)
                                && (snapshot.teaches[p][other] || problem.attends[p][other])
                        });
                        if hard || elsewhere {
                            out.push(format!(
                                "{} misses {}",
                                problem.teacher(p).name,
                                problem.course(c).name
                            ));
                        }
                    }
                }
                out
            }
            PenaltyKind::CoursesClosed => (0..n_courses)
                .filter(|&c| {
                    snapshot.course_slot[c].is_none() && !problem.force_closed.contains(&c)
                })
                .map(|c| problem.course(c).name.clone())
                .collect(),
            PenaltyKind::StudBad => problem
                .student_wishes
                .iter()
                .filter(|(student, _, matched)| {
                    let blackout = &problem.input.students[*student].blackout;
                    !matched.iter().any(|&c| {
                        snapshot.course_slot[c]
                            .map(|s| !blackout.contains(&s))
                            .unwrap_or(false)
                    })
                })
                .map(|(student, stated, _)| {
                    format!("{}: {}", problem.input.students[*student].name, stated)
                })
                .collect(),
            PenaltyKind::Custom(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        Course, CourseKind, PenaltyWeights, Room, Rules, Student, Teacher, TeacherRole,
        TimetableInput,
    };
    use std::collections::HashMap;

    fn teacher(name: &str, role: TeacherRole) -> Teacher {
        Teacher {
            name: name.into(),
            role,
            max_courses: 2,
            ideal_courses: None,
            availability: vec![3; SLOT_COUNT],
            interest: HashMap::new(),
            attend: vec![],
            prefer_with: vec![],
            refuse_with: vec![],
            days_pref: DaysPref::default(),
            gap_pref: GapPref::default(),
            boost: None,
        }
    }

    fn two_course_problem() -> Problem {
        let input = TimetableInput {
            rooms: vec![Room {
                name: "k-3".into(),
                venue: "koliste".into(),
            }],
            courses: vec![
                Course {
                    name: "Blues 1".into(),
                    kind: CourseKind::Regular,
                },
                Course {
                    name: "Blues 2".into(),
                    kind: CourseKind::Regular,
                },
            ],
            teachers: vec![
                teacher("Roman", TeacherRole::Lead),
                teacher("Karla", TeacherRole::Follow),
            ],
            students: vec![],
            rules: Rules::default(),
            weights: PenaltyWeights::default(),
        };
        Problem::new(input).unwrap()
    }

    #[test]
    fn indifferent_preferences_never_apply() {
        let problem = two_course_problem();
        assert_eq!(person_factor(&PenaltyKind::TeachDays, &problem, 0), None);
        assert_eq!(person_factor(&PenaltyKind::TeachThree, &problem, 0), None);
        assert_eq!(person_factor(&PenaltyKind::Split, &problem, 0), None);
        assert_eq!(person_factor(&PenaltyKind::Utilization, &problem, 0), None);
        assert_eq!(person_factor(&PenaltyKind::TeachTogether, &problem, 0), None);
        // Uniform availability expresses no slot preference either.
        assert_eq!(person_factor(&PenaltyKind::SlotprefBad, &problem, 0), None);
    }

    #[test]
    fn boost_doubles_the_declared_dimension_only() {
        let mut problem = two_course_problem();
        problem.input.teachers[0].boost = Some(BoostDimension::Time);
        problem.availability[0][0] = 1;
        problem.interest[0][0] = 1;
        assert_eq!(
            person_factor(&PenaltyKind::SlotprefBad, &problem, 0),
            Some(2)
        );
        assert_eq!(
            person_factor(&PenaltyKind::CourseprefBad, &problem, 0),
            Some(1)
        );
    }

    #[test]
    fn teach_days_mutually_exclusive_with_teach_three() {
        let mut problem = two_course_problem();
        problem.input.teachers[0].days_pref = DaysPref::FewerDays;
        assert!(person_factor(&PenaltyKind::TeachDays, &problem, 0).is_some());
        assert!(person_factor(&PenaltyKind::TeachThree, &problem, 0).is_none());
        problem.input.teachers[0].days_pref = DaysPref::FewerPerDay;
        assert!(person_factor(&PenaltyKind::TeachDays, &problem, 0).is_none());
        assert!(person_factor(&PenaltyKind::TeachThree, &problem, 0).is_some());
    }

    #[test]
    fn custom_terms_join_the_objective_under_their_own_name() {
        let mut set = PenaltySet::default();
        set.add_custom("venue_spread", 10, vec![Expr::constant(2)]);
        set.add_custom("disabled", 0, vec![Expr::constant(5)]);
        assert_eq!(set.terms.len(), 1);
        assert_eq!(set.terms[0].kind.name(), "venue_spread");
        assert_eq!(set.objective().constant, 20);
    }

    #[test]
    fn stud_bad_explain_reports_exact_pair() {
        let mut input = TimetableInput {
            rooms: vec![Room {
                name: "k-3".into(),
                venue: "koliste".into(),
            }],
            courses: vec![Course {
                name: "Blues 1".into(),
                kind: CourseKind::Regular,
            }],
            teachers: vec![
                teacher("Roman", TeacherRole::Lead),
                teacher("Karla", TeacherRole::Follow),
            ],
            students: vec![Student {
                name: "Pavel".into(),
                blackout: vec![4],
                desired: vec!["Blues".into()],
            }],
            rules: Rules::default(),
            weights: PenaltyWeights::default(),
        };
        input.students.push(Student {
            name: "Jana".into(),
            blackout: vec![],
            desired: vec!["Blues".into()],
        });
        let problem = Problem::new(input).unwrap();
        let term = PenaltyTerm {
            kind: PenaltyKind::StudBad,
            weight: 50,
            contributions: vec![],
        };
        // Course placed exactly inside Pavel's blackout.
        let snapshot = ScheduleSnapshot {
            course_slot: vec![Some(4)],
            course_room: vec![Some(0)],
            teaches: vec![vec![true], vec![true]],
            cells: vec![],
        };
        assert_eq!(term.explain(&problem, &snapshot), vec!["Pavel: Blues"]);
    }

    #[test]
    fn utilization_explain_lists_only_deviations() {
        let mut problem = two_course_problem();
        problem.input.teachers[0].ideal_courses = Some(2);
        problem.input.teachers[1].ideal_courses = Some(1);
        let term = PenaltyTerm {
            kind: PenaltyKind::Utilization,
            weight: 25,
            contributions: vec![],
        };
        let snapshot = ScheduleSnapshot {
            course_slot: vec![Some(0), None],
            course_room: vec![Some(0), None],
            teaches: vec![vec![true, false], vec![true, false]],
            cells: vec![],
        };
        assert_eq!(
            term.explain(&problem, &snapshot),
            vec!["Roman teaches 1, wanted 2"]
        );
    }
}
