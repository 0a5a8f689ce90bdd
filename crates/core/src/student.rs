//! Student record value objects.
//!
//! A `StudentRecord` is built once when the directory is constructed and is
//! never mutated afterwards. Field order inside every list is significant and
//! preserved exactly as defined.

use serde::{Deserialize, Serialize};

/// A single student's static profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Opaque identifier, unique within the directory (e.g. "STU001").
    pub id: String,

    /// Display name.
    pub name: String,

    /// Class, department and year.
    pub academic_details: AcademicDetails,

    /// Subjects with grades, in display order.
    #[serde(default)]
    pub subjects: Vec<Subject>,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub weaknesses: Vec<String>,

    #[serde(default)]
    pub areas_for_improvement: Vec<String>,

    pub learning_style: LearningStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicDetails {
    /// Free-form class label such as "12th Grade".
    #[serde(rename = "class")]
    pub class_label: String,

    pub department: String,

    pub year: u32,
}

/// A subject and the grade obtained in it, out of 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub grade: u32,
}

impl Subject {
    pub fn new(name: impl Into<String>, grade: u32) -> Self {
        Self {
            name: name.into(),
            grade,
        }
    }

    /// Render as `"<name>: <grade>/100"`.
    pub fn grade_line(&self) -> String {
        format!("{}: {}/100", self.name, self.grade)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStyle {
    #[serde(rename = "type")]
    pub kind: String,

    pub description: String,

    #[serde(default)]
    pub examples_based_on_strengths: Vec<String>,
}

impl StudentRecord {
    /// One `"<name>: <grade>/100"` line per subject, in record order.
    pub fn grade_lines(&self) -> Vec<String> {
        self.subjects.iter().map(Subject::grade_line).collect()
    }
}
