use crate::error::ConfigError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

// Type aliases for clarity
pub type SlotId = usize;
pub type RoomId = usize;
pub type VenueId = usize;
pub type CourseId = usize;
pub type TeacherId = usize;
pub type StudentId = usize;

pub const DAYS: usize = 4;
pub const TIMES_PER_DAY: usize = 3;
pub const SLOT_COUNT: usize = DAYS * TIMES_PER_DAY;

pub const DAY_NAMES: [&str; DAYS] = ["Mon", "Tue", "Wed", "Thu"];
pub const TIME_NAMES: [&str; TIMES_PER_DAY] = ["17:30", "18:45", "20:00"];

/// Highest value on the 0..=3 availability/interest scale.
pub const PREF_MAX: u8 = 3;

pub fn slot_day(slot: SlotId) -> usize {
    slot / TIMES_PER_DAY
}

pub fn slot_time(slot: SlotId) -> usize {
    slot % TIMES_PER_DAY
}

pub fn slot_name(slot: SlotId) -> String {
    format!("{} {}", DAY_NAMES[slot_day(slot)], TIME_NAMES[slot_time(slot)])
}

/// Flat slot indices belonging to one day.
pub fn day_slots(day: usize) -> Range<SlotId> {
    day * TIMES_PER_DAY..(day + 1) * TIMES_PER_DAY
}

/// Whether a general course name (as stated in a preference answer) covers
/// a specific course variant.
///
/// A general name matches every specific course sharing its prefix, so
/// "LH 4" covers "LH 4 - Rhythm /1" and "LH 4 - Rhythm /2". Two course
/// families opt out of prefix matching and require the identical name:
/// anything ending in "English" (so "LH 1" does not sweep up the English
/// variant) and the "Collegiate Shag" family (so "Collegiate Shag 1" never
/// matches "Collegiate Shag 2" through their shared prefix). Whether more
/// families need the same treatment is a question for the schedule owner,
/// not for this function.
pub fn course_name_generalizes(general: &str, specific: &str) -> bool {
    if specific.ends_with("English") || specific.starts_with("Collegiate Shag") {
        return general == specific;
    }
    specific.starts_with(general)
}

/// A physical room, belonging to exactly one venue.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    pub venue: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseKind {
    /// Taught by one lead and one follow teacher.
    Regular,
    /// Taught by exactly one teacher, no role distinction.
    Solo,
    /// Self-run practice, never taught.
    Open,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub name: String,
    pub kind: CourseKind,
}

/// Primary dance role, with the two "both" refinements declaring a
/// secondary role on top of the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TeacherRole {
    Lead,
    Follow,
    BothLead,
    BothFollow,
}

impl TeacherRole {
    pub fn can_lead(self) -> bool {
        !matches!(self, TeacherRole::Follow)
    }

    pub fn can_follow(self) -> bool {
        !matches!(self, TeacherRole::Lead)
    }
}

/// How much a teacher cares about compressing their week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DaysPref {
    /// Come in on as few days as possible.
    FewerDays,
    /// Avoid teaching a full day; spread across days instead.
    FewerPerDay,
    #[default]
    Indifferent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GapPref {
    /// Dislikes a free middle slot between two taught slots.
    DislikesGaps,
    ToleratesGaps,
    #[default]
    Indifferent,
}

/// The one preference dimension whose violations count double for this
/// person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoostDimension {
    Time,
    Course,
    Person,
}

/// One row of the normalized preference table.
///
/// Availability and interest use the ordinal scale 0..=3: 0 is a hard no
/// (never scheduled there / never teaches that), 1 strongly dislikes,
/// 2 mildly dislikes, 3 is fine. Interest is keyed by *general* course
/// names and expanded through [`course_name_generalizes`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub name: String,
    pub role: TeacherRole,
    /// Hard cap on taught courses. Absent means "cannot teach".
    #[serde(default)]
    pub max_courses: u32,
    /// Soft target for taught courses; None means no stated target.
    #[serde(default)]
    pub ideal_courses: Option<u32>,
    /// 12 entries, one per slot. An empty vector means no answer and is
    /// treated as all-unavailable.
    #[serde(default)]
    pub availability: Vec<u8>,
    #[serde(default)]
    pub interest: HashMap<String, u8>,
    /// Courses this teacher would like to attend as a participant.
    #[serde(default)]
    pub attend: Vec<String>,
    #[serde(default)]
    pub prefer_with: Vec<String>,
    #[serde(default)]
    pub refuse_with: Vec<String>,
    #[serde(default)]
    pub days_pref: DaysPref,
    #[serde(default)]
    pub gap_pref: GapPref,
    #[serde(default)]
    pub boost: Option<BoostDimension>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    /// Slots where this student can never attend anything.
    #[serde(default)]
    pub blackout: Vec<SlotId>,
    /// Desired courses, general names allowed.
    #[serde(default)]
    pub desired: Vec<String>,
}

/// Pins and structural placement rules, all keyed by name and resolved to
/// indices during validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    /// Course -> flat slot index it must occupy (forces the course open).
    #[serde(default)]
    pub fixed_slot: HashMap<String, SlotId>,
    /// Course -> slots it may occupy if it runs at all.
    #[serde(default)]
    pub allowed_slots: HashMap<String, Vec<SlotId>>,
    #[serde(default)]
    pub force_open: Vec<String>,
    #[serde(default)]
    pub force_closed: Vec<String>,
    /// Teacher -> courses they must teach whenever the course runs.
    #[serde(default)]
    pub force_teacher: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub room_required: HashMap<String, String>,
    #[serde(default)]
    pub room_forbidden: HashMap<String, String>,
    /// Families of courses that must differ pairwise in day AND in time.
    #[serde(default)]
    pub distinct_day_time: Vec<Vec<String>>,
    /// Families of courses that must differ pairwise in day.
    #[serde(default)]
    pub distinct_day: Vec<Vec<String>>,
    /// Families that run back to back: same day, same venue, contiguous
    /// times. Forces every member open.
    #[serde(default)]
    pub back_to_back: Vec<Vec<String>>,
}

fn w_utilization() -> i64 {
    25
}
fn w_teach_days() -> i64 {
    75
}
fn w_occupied_days() -> i64 {
    25
}
fn w_teach_three() -> i64 {
    50
}
fn w_split() -> i64 {
    50
}
fn w_slotpref_bad() -> i64 {
    80
}
fn w_slotpref_slight() -> i64 {
    20
}
fn w_coursepref_bad() -> i64 {
    80
}
fn w_coursepref_slight() -> i64 {
    20
}
fn w_teach_together() -> i64 {
    25
}
fn w_attend_clash() -> i64 {
    50
}
fn w_courses_closed() -> i64 {
    100
}
fn w_stud_bad() -> i64 {
    50
}

/// Per-term weights of the soft objective. A zero weight disables the
/// term entirely.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyWeights {
    #[serde(default = "w_utilization")]
    pub utilization: i64,
    #[serde(default = "w_teach_days")]
    pub teach_days: i64,
    #[serde(default = "w_occupied_days")]
    pub occupied_days: i64,
    #[serde(default = "w_teach_three")]
    pub teach_three: i64,
    #[serde(default = "w_split")]
    pub split: i64,
    #[serde(default = "w_slotpref_bad")]
    pub slotpref_bad: i64,
    #[serde(default = "w_slotpref_slight")]
    pub slotpref_slight: i64,
    #[serde(default = "w_coursepref_bad")]
    pub coursepref_bad: i64,
    #[serde(default = "w_coursepref_slight")]
    pub coursepref_slight: i64,
    #[serde(default = "w_teach_together")]
    pub teach_together: i64,
    #[serde(default = "w_attend_clash")]
    pub attend_clash: i64,
    #[serde(default = "w_courses_closed")]
    pub courses_closed: i64,
    #[serde(default = "w_stud_bad")]
    pub stud_bad: i64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        PenaltyWeights {
            utilization: w_utilization(),
            teach_days: w_teach_days(),
            occupied_days: w_occupied_days(),
            teach_three: w_teach_three(),
            split: w_split(),
            slotpref_bad: w_slotpref_bad(),
            slotpref_slight: w_slotpref_slight(),
            coursepref_bad: w_coursepref_bad(),
            coursepref_slight: w_coursepref_slight(),
            teach_together: w_teach_together(),
            attend_clash: w_attend_clash(),
            courses_closed: w_courses_closed(),
            stud_bad: w_stud_bad(),
        }
    }
}

/// The complete input of a scheduling run: the normalized preference
/// table plus rooms, rules and objective weights. Produced by ingestion
/// code outside this crate.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub weights: PenaltyWeights,
}

/// A validated problem: every name resolved to an index, every vector
/// normalized, every contradiction rejected. Building a [`Problem`] is
/// the configuration-error boundary; past this point only solver-level
/// outcomes can fail.
#[derive(Debug)]
pub struct Problem {
    pub input: TimetableInput,
    pub venues: Vec<String>,
    pub room_venue: Vec<VenueId>,
    /// Normalized 12-entry availability per teacher.
    pub availability: Vec<[u8; SLOT_COUNT]>,
    /// Interest per teacher per specific course, expanded from general
    /// names. Open courses are 0 (never taught); courses the teacher did
    /// not mention default to 3 (no stated preference).
    pub interest: Vec<Vec<u8>>,
    /// Static attendance wish per teacher per specific course.
    pub attends: Vec<Vec<bool>>,
    pub prefer_with: Vec<Vec<TeacherId>>,
    pub refuse_pairs: Vec<(TeacherId, TeacherId)>,
    pub can_lead: Vec<bool>,
    pub can_follow: Vec<bool>,
    /// (student, stated name, matching specific courses) triples.
    pub student_wishes: Vec<(StudentId, String, Vec<CourseId>)>,
    pub fixed_slot: Vec<(CourseId, SlotId)>,
    pub allowed_slots: Vec<(CourseId, Vec<SlotId>)>,
    pub force_open: Vec<CourseId>,
    pub force_closed: Vec<CourseId>,
    pub force_teacher: Vec<(TeacherId, CourseId)>,
    pub room_required: Vec<(CourseId, RoomId)>,
    pub room_forbidden: Vec<(CourseId, RoomId)>,
    pub distinct_day_time: Vec<Vec<CourseId>>,
    pub distinct_day: Vec<Vec<CourseId>>,
    pub back_to_back: Vec<Vec<CourseId>>,
}

impl Problem {
    pub fn new(input: TimetableInput) -> Result<Problem, ConfigError> {
        let mut venues: Vec<String> = Vec::new();
        let mut room_index: HashMap<String, RoomId> = HashMap::new();
        let mut room_venue = Vec::with_capacity(input.rooms.len());
        for (r, room) in input.rooms.iter().enumerate() {
            if room_index.insert(room.name.clone(), r).is_some() {
                return Err(ConfigError::DuplicateRoom(room.name.clone()));
            }
            let v = match venues.iter().position(|v| *v == room.venue) {
                Some(v) => v,
                None => {
                    venues.push(room.venue.clone());
                    venues.len() - 1
                }
            };
            room_venue.push(v);
        }

        let mut course_index: HashMap<String, CourseId> = HashMap::new();
        for (c, course) in input.courses.iter().enumerate() {
            if course_index.insert(course.name.clone(), c).is_some() {
                return Err(ConfigError::DuplicateCourse(course.name.clone()));
            }
        }
        let mut teacher_index: HashMap<String, TeacherId> = HashMap::new();
        for (t, teacher) in input.teachers.iter().enumerate() {
            if teacher_index.insert(teacher.name.clone(), t).is_some() {
                return Err(ConfigError::DuplicateTeacher(teacher.name.clone()));
            }
        }

        let n_courses = input.courses.len();
        let match_course = |general: &str| -> Vec<CourseId> {
            input
                .courses
                .iter()
                .enumerate()
                .filter(|(_, course)| course_name_generalizes(general, &course.name))
                .map(|(c, _)| c)
                .collect()
        };

        let mut availability = Vec::with_capacity(input.teachers.len());
        let mut interest = Vec::with_capacity(input.teachers.len());
        let mut attends = Vec::with_capacity(input.teachers.len());
        let mut prefer_with = Vec::with_capacity(input.teachers.len());
        let mut refuse_pairs = Vec::new();
        let mut can_lead = Vec::with_capacity(input.teachers.len());
        let mut can_follow = Vec::with_capacity(input.teachers.len());

        for (t, teacher) in input.teachers.iter().enumerate() {
            let mut slots = [0u8; SLOT_COUNT];
            if teacher.availability.is_empty() {
                warn!(
                    "{} gave no availability answer, treating every slot as unavailable",
                    teacher.name
                );
            } else if teacher.availability.len() != SLOT_COUNT {
                return Err(ConfigError::BadAvailabilityLength {
                    teacher: teacher.name.clone(),
                    got: teacher.availability.len(),
                    expected: SLOT_COUNT,
                });
            } else {
                for (s, &v) in teacher.availability.iter().enumerate() {
                    if v > PREF_MAX {
                        return Err(ConfigError::BadPreferenceValue {
                            teacher: teacher.name.clone(),
                            value: v,
                        });
                    }
                    slots[s] = v;
                }
            }
            availability.push(slots);

            // Unmentioned teachable courses default to "fine": only an
            // explicit 0 excludes. The ingestion layer maps unanswered
            // survey cells to 0 before the table reaches us.
            let mut row = vec![PREF_MAX; n_courses];
            for (c, course) in input.courses.iter().enumerate() {
                if course.kind == CourseKind::Open {
                    row[c] = 0;
                }
            }
            // Shorter (more general) names first so specific answers win.
            let mut stated: Vec<(&String, &u8)> = teacher.interest.iter().collect();
            stated.sort_by_key(|(name, _)| (name.len(), name.as_str().to_owned()));
            for (general, &v) in stated {
                if v > PREF_MAX {
                    return Err(ConfigError::BadPreferenceValue {
                        teacher: teacher.name.clone(),
                        value: v,
                    });
                }
                let matched = match_course(general);
                if matched.is_empty() {
                    return Err(ConfigError::UnknownCourse(general.clone()));
                }
                for c in matched {
                    if input.courses[c].kind != CourseKind::Open {
                        row[c] = v;
                    }
                }
            }
            interest.push(row);

            let mut wish = vec![false; n_courses];
            for general in &teacher.attend {
                let matched = match_course(general);
                if matched.is_empty() {
                    return Err(ConfigError::UnknownCourse(general.clone()));
                }
                for c in matched {
                    wish[c] = true;
                }
            }
            attends.push(wish);

            let mut liked = Vec::new();
            for other in &teacher.prefer_with {
                match teacher_index.get(other) {
                    Some(&o) => liked.push(o),
                    None => warn!(
                        "{} prefers to teach with unknown teacher {}, ignoring",
                        teacher.name, other
                    ),
                }
            }
            prefer_with.push(liked);
            for other in &teacher.refuse_with {
                match teacher_index.get(other) {
                    Some(&o) => refuse_pairs.push((t, o)),
                    None => warn!(
                        "{} refuses to teach with unknown teacher {}, ignoring",
                        teacher.name, other
                    ),
                }
            }

            can_lead.push(teacher.role.can_lead());
            can_follow.push(teacher.role.can_follow());
        }

        let mut student_wishes = Vec::new();
        for (p, student) in input.students.iter().enumerate() {
            for &slot in &student.blackout {
                if slot >= SLOT_COUNT {
                    return Err(ConfigError::SlotOutOfRange {
                        name: student.name.clone(),
                        slot,
                        max: SLOT_COUNT,
                    });
                }
            }
            for general in &student.desired {
                let matched = match_course(general);
                if matched.is_empty() {
                    return Err(ConfigError::UnknownCourse(general.clone()));
                }
                student_wishes.push((p, general.clone(), matched));
            }
        }

        let rules = &input.rules;
        let lookup_course = |name: &String| -> Result<CourseId, ConfigError> {
            course_index
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownCourse(name.clone()))
        };
        let lookup_room = |name: &String| -> Result<RoomId, ConfigError> {
            room_index
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownRoom(name.clone()))
        };

        let mut force_open = Vec::new();
        for name in &rules.force_open {
            if rules.force_closed.contains(name) {
                return Err(ConfigError::OpenClosedContradiction(name.clone()));
            }
            force_open.push(lookup_course(name)?);
        }
        let mut force_closed = Vec::new();
        for name in &rules.force_closed {
            force_closed.push(lookup_course(name)?);
        }

        let mut fixed_slot = Vec::new();
        for (name, &slot) in sorted_entries(&rules.fixed_slot) {
            let c = lookup_course(name)?;
            if slot >= SLOT_COUNT {
                return Err(ConfigError::SlotOutOfRange {
                    name: name.clone(),
                    slot,
                    max: SLOT_COUNT,
                });
            }
            if force_closed.contains(&c) {
                return Err(ConfigError::FixedSlotOnClosedCourse(name.clone()));
            }
            fixed_slot.push((c, slot));
        }

        let mut allowed_slots = Vec::new();
        for (name, slots) in sorted_entries(&rules.allowed_slots) {
            let c = lookup_course(name)?;
            for &slot in slots {
                if slot >= SLOT_COUNT {
                    return Err(ConfigError::SlotOutOfRange {
                        name: name.clone(),
                        slot,
                        max: SLOT_COUNT,
                    });
                }
            }
            allowed_slots.push((c, slots.clone()));
        }

        let mut force_teacher = Vec::new();
        for (teacher_name, courses) in sorted_entries(&rules.force_teacher) {
            let t = teacher_index
                .get(teacher_name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownTeacher(teacher_name.clone()))?;
            for name in courses {
                let c = lookup_course(name)?;
                if input.courses[c].kind == CourseKind::Open {
                    return Err(ConfigError::ForcedTeacherOnOpenCourse(name.clone()));
                }
                force_teacher.push((t, c));
            }
        }

        let mut room_required = Vec::new();
        for (name, room) in sorted_entries(&rules.room_required) {
            let c = lookup_course(name)?;
            let r = lookup_room(room)?;
            if rules.room_forbidden.get(name) == Some(room) {
                return Err(ConfigError::RoomPinContradiction {
                    course: name.clone(),
                    room: room.clone(),
                });
            }
            room_required.push((c, r));
        }
        let mut room_forbidden = Vec::new();
        for (name, room) in sorted_entries(&rules.room_forbidden) {
            room_forbidden.push((lookup_course(name)?, lookup_room(room)?));
        }

        let resolve_family =
            |family: &Vec<String>, max: usize| -> Result<Vec<CourseId>, ConfigError> {
                if family.len() < 2 || family.len() > max {
                    return Err(ConfigError::BadFamilySize {
                        got: family.len(),
                        min: 2,
                        max,
                    });
                }
                family.iter().map(lookup_course).collect()
            };
        let mut distinct_day_time = Vec::new();
        for family in &rules.distinct_day_time {
            distinct_day_time.push(resolve_family(family, DAYS.min(TIMES_PER_DAY))?);
        }
        let mut distinct_day = Vec::new();
        for family in &rules.distinct_day {
            distinct_day.push(resolve_family(family, DAYS)?);
        }
        let mut back_to_back = Vec::new();
        for family in &rules.back_to_back {
            back_to_back.push(resolve_family(family, TIMES_PER_DAY)?);
        }

        Ok(Problem {
            venues,
            room_venue,
            availability,
            interest,
            attends,
            prefer_with,
            refuse_pairs,
            can_lead,
            can_follow,
            student_wishes,
            fixed_slot,
            allowed_slots,
            force_open,
            force_closed,
            force_teacher,
            room_required,
            room_forbidden,
            distinct_day_time,
            distinct_day,
            back_to_back,
            input,
        })
    }

    pub fn n_rooms(&self) -> usize {
        self.input.rooms.len()
    }

    pub fn n_courses(&self) -> usize {
        self.input.courses.len()
    }

    pub fn n_teachers(&self) -> usize {
        self.input.teachers.len()
    }

    pub fn n_venues(&self) -> usize {
        self.venues.len()
    }

    pub fn course(&self, c: CourseId) -> &Course {
        &self.input.courses[c]
    }

    pub fn teacher(&self, t: TeacherId) -> &Teacher {
        &self.input.teachers[t]
    }

    pub fn room(&self, r: RoomId) -> &Room {
        &self.input.rooms[r]
    }

    /// Teachers allowed to take the lead role of a regular course.
    pub fn lead_pool(&self, c: CourseId) -> Vec<TeacherId> {
        (0..self.n_teachers())
            .filter(|&t| self.can_lead[t] && self.interest[t][c] > 0)
            .collect()
    }

    /// Teachers allowed to take the follow role of a regular course.
    pub fn follow_pool(&self, c: CourseId) -> Vec<TeacherId> {
        (0..self.n_teachers())
            .filter(|&t| self.can_follow[t] && self.interest[t][c] > 0)
            .collect()
    }
}

/// Deterministic iteration over name-keyed rule maps.
fn sorted_entries<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<(&String, &V)> = map.iter().collect();
    entries.sort_by_key(|(name, _)| name.as_str());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_name_covers_prefixed_variants() {
        assert!(course_name_generalizes("LH 4", "LH 4 - Rhythm /1"));
        assert!(course_name_generalizes("LH 4", "LH 4 - Rhythm /2"));
        assert!(course_name_generalizes("Balboa", "Balboa Beginners"));
        assert!(!course_name_generalizes("LH 2", "LH 1 - Beginners /1"));
    }

    #[test]
    fn english_variant_needs_exact_name() {
        assert!(!course_name_generalizes("LH 1", "LH 1 - English"));
        assert!(course_name_generalizes("LH 1 - English", "LH 1 - English"));
        assert!(course_name_generalizes("LH 1", "LH 1 - Beginners /1"));
    }

    #[test]
    fn collegiate_shag_needs_exact_name() {
        assert!(!course_name_generalizes(
            "Collegiate Shag",
            "Collegiate Shag 1"
        ));
        assert!(!course_name_generalizes(
            "Collegiate Shag 1",
            "Collegiate Shag 1b"
        ));
        assert!(course_name_generalizes(
            "Collegiate Shag 2",
            "Collegiate Shag 2"
        ));
    }

    #[test]
    fn slot_flattening_uses_floor_semantics() {
        assert_eq!(slot_day(0), 0);
        assert_eq!(slot_time(0), 0);
        assert_eq!(slot_day(5), 1);
        assert_eq!(slot_time(5), 2);
        assert_eq!(slot_day(11), 3);
        assert_eq!(slot_time(11), 2);
        assert_eq!(day_slots(2).collect::<Vec<_>>(), vec![6, 7, 8]);
    }

    fn minimal_input() -> TimetableInput {
        TimetableInput {
            rooms: vec![Room {
                name: "k-3".into(),
                venue: "koliste".into(),
            }],
            courses: vec![Course {
                name: "Blues 1".into(),
                kind: CourseKind::Regular,
            }],
            teachers: vec![],
            students: vec![],
            rules: Rules::default(),
            weights: PenaltyWeights::default(),
        }
    }

    fn plain_teacher(name: &str, role: TeacherRole) -> Teacher {
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

    #[test]
    fn open_closed_contradiction_is_fatal() {
        let mut input = minimal_input();
        input.rules.force_open.push("Blues 1".into());
        input.rules.force_closed.push("Blues 1".into());
        assert!(matches!(
            Problem::new(input),
            Err(ConfigError::OpenClosedContradiction(_))
        ));
    }

    #[test]
    fn fixed_slot_on_closed_course_is_fatal() {
        let mut input = minimal_input();
        input.rules.fixed_slot.insert("Blues 1".into(), 4);
        input.rules.force_closed.push("Blues 1".into());
        assert!(matches!(
            Problem::new(input),
            Err(ConfigError::FixedSlotOnClosedCourse(_))
        ));
    }

    #[test]
    fn unknown_pinned_course_is_fatal() {
        let mut input = minimal_input();
        input.rules.fixed_slot.insert("Blues 9".into(), 4);
        assert!(matches!(
            Problem::new(input),
            Err(ConfigError::UnknownCourse(_))
        ));
    }

    #[test]
    fn missing_availability_defaults_to_unavailable() {
        let mut input = minimal_input();
        let mut teacher = plain_teacher("Karla", TeacherRole::Follow);
        teacher.availability = vec![];
        input.teachers.push(teacher);
        let problem = Problem::new(input).unwrap();
        assert_eq!(problem.availability[0], [0u8; SLOT_COUNT]);
    }

    #[test]
    fn unknown_partner_is_ignored_not_fatal() {
        let mut input = minimal_input();
        let mut teacher = plain_teacher("Karla", TeacherRole::Follow);
        teacher.prefer_with = vec!["Nobody".into()];
        teacher.refuse_with = vec!["NobodyElse".into()];
        input.teachers.push(teacher);
        let problem = Problem::new(input).unwrap();
        assert!(problem.prefer_with[0].is_empty());
        assert!(problem.refuse_pairs.is_empty());
    }

    #[test]
    fn interest_zero_empties_role_pools() {
        let mut input = minimal_input();
        let mut teacher = plain_teacher("Roman", TeacherRole::Lead);
        teacher.interest.insert("Blues".into(), 0);
        input.teachers.push(teacher);
        let problem = Problem::new(input).unwrap();
        assert!(problem.lead_pool(0).is_empty());
        assert!(problem.follow_pool(0).is_empty());
    }

    #[test]
    fn specific_interest_overrides_general() {
        let mut input = minimal_input();
        input.courses.push(Course {
            name: "Blues 2".into(),
            kind: CourseKind::Regular,
        });
        let mut teacher = plain_teacher("Roman", TeacherRole::Lead);
        teacher.interest.insert("Blues".into(), 1);
        teacher.interest.insert("Blues 2".into(), 3);
        input.teachers.push(teacher);
        let problem = Problem::new(input).unwrap();
        assert_eq!(problem.interest[0][0], 1);
        assert_eq!(problem.interest[0][1], 3);
    }

    #[test]
    fn secondary_roles_extend_pools() {
        let mut input = minimal_input();
        input.teachers.push(plain_teacher("Roman", TeacherRole::Lead));
        input
            .teachers
            .push(plain_teacher("Hermiona", TeacherRole::BothLead));
        input
            .teachers
            .push(plain_teacher("Karla", TeacherRole::Follow));
        let problem = Problem::new(input).unwrap();
        assert_eq!(problem.lead_pool(0), vec![0, 1]);
        assert_eq!(problem.follow_pool(0), vec![1, 2]);
    }
}
