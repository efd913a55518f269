//! Caller-supplied context used by the temporal and user-context factors

use serde::{Deserialize, Serialize};

/// What the caller knows about the user issuing a query.
///
/// Every field is optional; a missing field never matches anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserContext {
    /// Semester the user is currently in (e.g. "S4")
    pub current_semester: Option<String>,

    /// Course the user is enrolled in
    pub course: Option<String>,

    /// Exam type the user is dealing with
    pub exam_type: Option<String>,
}

impl UserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.current_semester = Some(semester.into());
        self
    }

    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    pub fn with_exam_type(mut self, exam_type: impl Into<String>) -> Self {
        self.exam_type = Some(exam_type.into());
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.current_semester.is_none() && self.course.is_none() && self.exam_type.is_none()
    }
}
