//! Decoding a solver binding into a schedule snapshot, a penalty ledger
//! and a workload histogram. Everything here is a pure function of the
//! binding: decoding the same binding twice gives identical output.

use crate::data::{slot_name, CourseKind, Problem, RoomId, SlotId, SLOT_COUNT};
use crate::model::Binding;
use crate::network::Network;
use crate::penalties::PenaltySet;
use crate::solver::SolveStatus;
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub teacher: String,
    /// "lead"/"follow" from the role variables, "solo" otherwise. Never
    /// positional.
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCell {
    pub slot: SlotId,
    pub slot_label: String,
    pub room: String,
    pub course: String,
    /// Empty for open courses.
    pub teachers: Vec<TeacherAssignment>,
}

/// The decoded assignment surface the explain functions work from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSnapshot {
    pub course_slot: Vec<Option<SlotId>>,
    pub course_room: Vec<Option<RoomId>>,
    pub teaches: Vec<Vec<bool>>,
    pub cells: Vec<ScheduleCell>,
}

pub fn decode_schedule(problem: &Problem, net: &Network, binding: &Binding) -> ScheduleSnapshot {
    let n_courses = problem.n_courses();
    let n_teachers = problem.n_teachers();

    let course_slot: Vec<Option<SlotId>> = (0..n_courses)
        .map(|c| {
            let slot = binding.int_value(net.course_slot[c]);
            (slot >= 0).then_some(slot as SlotId)
        })
        .collect();
    let course_room: Vec<Option<RoomId>> = (0..n_courses)
        .map(|c| {
            course_slot[c].and_then(|s| {
                (0..problem.n_rooms()).find(|&r| binding.bool_value(net.placement[s][r][c]))
            })
        })
        .collect();
    let teaches: Vec<Vec<bool>> = (0..n_teachers)
        .map(|t| {
            (0..n_courses)
                .map(|c| binding.bool_value(net.teaches[t][c]))
                .collect()
        })
        .collect();

    let mut cells = Vec::new();
    for s in 0..SLOT_COUNT {
        for r in 0..problem.n_rooms() {
            for c in 0..n_courses {
                if !binding.bool_value(net.placement[s][r][c]) {
                    continue;
                }
                let teachers = match problem.course(c).kind {
                    CourseKind::Open => Vec::new(),
                    CourseKind::Solo => (0..n_teachers)
                        .filter(|&t| teaches[t][c])
                        .map(|t| TeacherAssignment {
                            teacher: problem.teacher(t).name.clone(),
                            role: "solo".into(),
                        })
                        .collect(),
                    CourseKind::Regular => {
                        let rv = net.roles[c].as_ref().expect("regular course has role vars");
                        let mut assigned = Vec::new();
                        if let Some(t) =
                            (0..n_teachers).find(|&t| binding.bool_value(rv.lead[t]))
                        {
                            assigned.push(TeacherAssignment {
                                teacher: problem.teacher(t).name.clone(),
                                role: "lead".into(),
                            });
                        }
                        if let Some(t) =
                            (0..n_teachers).find(|&t| binding.bool_value(rv.follow[t]))
                        {
                            assigned.push(TeacherAssignment {
                                teacher: problem.teacher(t).name.clone(),
                                role: "follow".into(),
                            });
                        }
                        assigned
                    }
                };
                cells.push(ScheduleCell {
                    slot: s,
                    slot_label: slot_name(s),
                    room: problem.room(r).name.clone(),
                    course: problem.course(c).name.clone(),
                    teachers,
                });
            }
        }
    }

    ScheduleSnapshot {
        course_slot,
        course_room,
        teaches,
        cells,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub name: String,
    pub weight: i64,
    pub count: i64,
    pub cost: i64,
    pub detail: Vec<String>,
}

pub fn penalty_ledger(
    problem: &Problem,
    snapshot: &ScheduleSnapshot,
    penalties: &PenaltySet,
    binding: &Binding,
) -> Vec<LedgerEntry> {
    penalties
        .terms
        .iter()
        .map(|term| {
            let count = term.count(binding);
            let detail = if count != 0 {
                term.explain(problem, snapshot)
            } else {
                Vec::new()
            };
            LedgerEntry {
                name: term.kind.name().to_string(),
                weight: term.weight,
                count,
                cost: term.weight * count,
                detail,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationBucket {
    pub courses: usize,
    pub teachers: Vec<String>,
}

/// How many courses each teacher ended up with, grouped by count.
pub fn utilization_histogram(problem: &Problem, snapshot: &ScheduleSnapshot) -> Vec<UtilizationBucket> {
    let grouped = (0..problem.n_teachers())
        .map(|t| {
            let courses = snapshot.teaches[t].iter().filter(|&&x| x).count();
            (courses, problem.teacher(t).name.clone())
        })
        .into_group_map();
    grouped
        .into_iter()
        .sorted_by_key(|(courses, _)| *courses)
        .map(|(courses, teachers)| UtilizationBucket { courses, teachers })
        .collect()
}

/// The rendered result of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub status: SolveStatus,
    pub objective: i64,
    pub cells: Vec<ScheduleCell>,
    pub closed_courses: Vec<String>,
    pub ledger: Vec<LedgerEntry>,
    pub utilization: Vec<UtilizationBucket>,
    pub wall_time_ms: u64,
}

pub fn build_output(
    problem: &Problem,
    net: &Network,
    penalties: &PenaltySet,
    binding: &Binding,
    status: SolveStatus,
    wall_time_ms: u64,
) -> TimetableOutput {
    let snapshot = decode_schedule(problem, net, binding);
    let ledger = penalty_ledger(problem, &snapshot, penalties, binding);
    let objective = ledger.iter().map(|entry| entry.cost).sum();
    let closed_courses = (0..problem.n_courses())
        .filter(|&c| snapshot.course_slot[c].is_none())
        .map(|c| problem.course(c).name.clone())
        .collect();
    let utilization = utilization_histogram(problem, &snapshot);
    TimetableOutput {
        status,
        objective,
        cells: snapshot.cells.clone(),
        closed_courses,
        ledger,
        utilization,
        wall_time_ms,
    }
}

/// Plain-text rendering, one line per occupied (slot, room).
pub fn render_text(output: &TimetableOutput) -> String {
    let mut out = String::new();
    for cell in &output.cells {
        let teachers = if cell.teachers.is_empty() {
            "OPEN".to_string()
        } else {
            cell.teachers
                .iter()
                .map(|a| a.teacher.as_str())
                .join(" + ")
        };
        out.push_str(&format!(
            "{: <11}{: <6}{: <22}{}\n",
            cell.slot_label, cell.room, teachers, cell.course
        ));
    }
    if !output.closed_courses.is_empty() {
        out.push_str(&format!("closed: {}\n", output.closed_courses.join(", ")));
    }
    out.push_str("Penalties:\n");
    let mut total = 0;
    for entry in &output.ledger {
        total += entry.cost;
        if entry.detail.is_empty() {
            out.push_str(&format!(
                "{}: {} * {} = {}\n",
                entry.name, entry.count, entry.weight, entry.cost
            ));
        } else {
            out.push_str(&format!(
                "{}: {} * {} = {} ({})\n",
                entry.name,
                entry.count,
                entry.weight,
                entry.cost,
                entry.detail.join(", ")
            ));
        }
    }
    for bucket in &output.utilization {
        out.push_str(&format!(
            "{}: {}\n",
            bucket.courses,
            bucket.teachers.join(", ")
        ));
    }
    out.push_str(&format!("TOTAL: {total}\n"));
    out
}
