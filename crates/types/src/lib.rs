use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, OneOrMany, PickFirst};
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(RoomId);
id_newtype!(SlotId);
id_newtype!(DayId);

/// Calendar bounds of the published timetable. Stamped onto every output row.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct Window {
    pub start_date: String,
    pub end_date: String,
}

/// A `TIMESLOTS` row. `end_time` may be left empty when `start_time` carries
/// both bounds, e.g. `"01:30 PM 03:00 PM"`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct TimeslotRow {
    pub slot_id: SlotId,
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct RequirementRow {
    pub course_code: String,
    pub curriculum: String,
    pub semester: String,
    pub section_id: String,
    pub teacher: TeacherId,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schemars(with = "u32")]
    pub slots_required: u32,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schemars(with = "f64")]
    pub min_total_hours: f64,
    /// Either a list or a single comma-separated cell.
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(default)]
    #[schemars(with = "Vec<String>")]
    pub available_rooms: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct BreakRow {
    pub curriculum: String,
    pub semester: String,
    pub section_id: String,
    pub day: DayId,
    pub break_from: String,
    pub break_to: String,
}

/// A `TEACHER_AVAILABILITY` row. `day` may list several days, `"Mon / Wed"`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct TeacherAvailabilityRow {
    pub teacher: TeacherId,
    pub day: String,
    pub available_from: String,
    #[serde(default)]
    pub available_to: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct TimetableInput {
    pub window: Window,
    pub timeslots: Vec<TimeslotRow>,
    pub requirements: Vec<RequirementRow>,
    pub days: Vec<DayId>,
    #[serde(default)]
    pub breaks: Vec<BreakRow>,
    #[serde(default)]
    pub teacher_availability: Vec<TeacherAvailabilityRow>,
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    200
}

fn default_seed() -> u64 {
    123
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct SolveParams {
    #[serde(default = "default_true")]
    pub partial_solution_mode: bool,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts_per_variable: u32,
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    #[serde(default)]
    pub candidate_limit: Option<u32>,
    /// Overrides the service's generation-time budget. `0` disables it.
    #[serde(default)]
    pub time_budget_sec: Option<u64>,
}

impl Default for SolveParams {
    fn default() -> Self {
        Self {
            partial_solution_mode: true,
            debug_mode: false,
            max_attempts_per_variable: default_max_attempts(),
            random_seed: default_seed(),
            candidate_limit: None,
            time_budget_sec: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveEnvelope {
    pub input: TimetableInput,
    #[serde(default)]
    pub params: SolveParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct DayBlock {
    pub day: DayId,
    pub time_from: String,
    pub time_to: String,
    pub room: Option<RoomId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct ScheduledRow {
    pub start_date: String,
    pub end_date: String,
    pub course_code: String,
    pub curriculum: String,
    pub semester: String,
    pub section_id: String,
    pub teacher: TeacherId,
    pub blocks: Vec<DayBlock>,
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    NoAvailableRoom,
    TeacherUnavailable,
    SectionConflict,
    AttemptsExhausted,
    InsufficientHours,
    Cancelled,
}

impl UnscheduledReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAvailableRoom => "no_available_room",
            Self::TeacherUnavailable => "teacher_unavailable",
            Self::SectionConflict => "section_conflict",
            Self::AttemptsExhausted => "attempts_exhausted",
            Self::InsufficientHours => "insufficient_hours",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct UnscheduledRow {
    pub course_code: String,
    pub curriculum: String,
    pub semester: String,
    pub section_id: String,
    pub teacher: TeacherId,
    pub slots_required: u32,
    pub min_total_hours: f64,
    pub available_rooms: Vec<RoomId>,
    pub reason: UnscheduledReason,
    #[serde(default)]
    pub detail: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    SkippedAvailability,
    SkippedBreak,
    TeacherOversubscribed,
    SectionOversubscribed,
    NoAvailabilityFit,
    InsufficientHours,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Solved,
    Partial,
    Cancelled,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct SolveStats {
    pub nodes: u64,
    pub backtracks: u64,
    pub wipeouts: u64,
    pub restarts: u64,
    pub attempts: u64,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub scheduled: Vec<ScheduledRow>,
    pub unscheduled: Vec<UnscheduledRow>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: SolveStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_row_accepts_spreadsheet_shapes() {
        let row: RequirementRow = serde_json::from_value(serde_json::json!({
            "course_code": "CS101",
            "curriculum": "BSCS",
            "semester": "3",
            "section_id": "A",
            "teacher": "Smith",
            "slots_required": "2",
            "min_total_hours": 3,
            "available_rooms": "R1, R2"
        }))
        .unwrap();
        assert_eq!(row.slots_required, 2);
        assert_eq!(row.min_total_hours, 3.0);
        assert_eq!(row.available_rooms, vec!["R1, R2".to_string()]);

        let row: RequirementRow = serde_json::from_value(serde_json::json!({
            "course_code": "CS101",
            "curriculum": "BSCS",
            "semester": "3",
            "section_id": "A",
            "teacher": "Smith",
            "slots_required": 1,
            "min_total_hours": "1.5",
            "available_rooms": ["R1", "R2"]
        }))
        .unwrap();
        assert_eq!(row.min_total_hours, 1.5);
        assert_eq!(row.available_rooms.len(), 2);
    }

    #[test]
    fn params_default_when_omitted() {
        let p: SolveParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, SolveParams::default());
        assert!(p.partial_solution_mode);
        assert!(!p.debug_mode);
        assert_eq!(p.max_attempts_per_variable, 200);
        assert_eq!(p.random_seed, 123);
    }

    #[test]
    fn reasons_serialize_snake_case() {
        let s = serde_json::to_string(&UnscheduledReason::NoAvailableRoom).unwrap();
        assert_eq!(s, "\"no_available_room\"");
        assert_eq!(UnscheduledReason::TeacherUnavailable.to_string(), "teacher_unavailable");
    }
}
