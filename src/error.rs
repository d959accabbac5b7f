use thiserror::Error;

/// Problems in the normalized preference table or the scheduling rules.
///
/// These are fatal and detected at model-build time; nothing is handed to
/// the solver when one of these fires. Recoverable data-quality issues
/// (unknown teacher in a social-preference list, missing availability
/// vector) are logged as warnings instead and the run continues with the
/// most restrictive default.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown course: '{0}'")]
    UnknownCourse(String),

    #[error("unknown teacher: '{0}'")]
    UnknownTeacher(String),

    #[error("unknown room: '{0}'")]
    UnknownRoom(String),

    #[error("duplicate course name: '{0}'")]
    DuplicateCourse(String),

    #[error("duplicate teacher name: '{0}'")]
    DuplicateTeacher(String),

    #[error("duplicate room name: '{0}'")]
    DuplicateRoom(String),

    #[error("slot index {slot} out of range (0..{max}) for '{name}'")]
    SlotOutOfRange {
        name: String,
        slot: usize,
        max: usize,
    },

    #[error("availability vector for teacher '{teacher}' has {got} entries, expected {expected}")]
    BadAvailabilityLength {
        teacher: String,
        got: usize,
        expected: usize,
    },

    #[error("preference value {value} for teacher '{teacher}' is outside the 0..=3 scale")]
    BadPreferenceValue { teacher: String, value: u8 },

    #[error("course '{0}' is pinned both open and closed")]
    OpenClosedContradiction(String),

    #[error("course '{0}' has a fixed slot but is pinned closed")]
    FixedSlotOnClosedCourse(String),

    #[error("course '{course}' both requires and forbids room '{room}'")]
    RoomPinContradiction { course: String, room: String },

    #[error("open course '{0}' cannot have a forced teacher")]
    ForcedTeacherOnOpenCourse(String),

    #[error("course family has {got} members, supported {min}..={max}")]
    BadFamilySize { got: usize, min: usize, max: usize },
}

/// Top-level failure of a scheduling run.
///
/// Infeasibility and an unknown/timed-out search are distinct outcomes:
/// the former means the hard constraints cannot all hold for this input,
/// the latter that the solver gave up before finding any feasible
/// incumbent. Neither is retryable without changing the input or the
/// search budget.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("model is infeasible: {0}")]
    Infeasible(String),

    #[error("no solution found: {0}")]
    Unknown(String),
}
