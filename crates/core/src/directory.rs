//! The student directory: a read-only, ordered roster of student records.
//!
//! Built once at start-up and shared behind an `Arc` for the lifetime of the
//! process. Iteration order is the definition order, independent of the
//! lookup index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;
use crate::student::{AcademicDetails, LearningStyle, StudentRecord, Subject};

/// A keyed record as it is defined (in a roster file or the built-in roster).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    /// Selector key, e.g. "emma".
    pub key: String,

    #[serde(flatten)]
    pub record: StudentRecord,
}

/// One row of the student selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorEntry {
    pub key: String,
    pub display_name: String,
}

#[derive(Debug)]
pub struct StudentDirectory {
    entries: Vec<DirectoryEntry>,
    index: HashMap<String, usize>,
    selector: Vec<SelectorEntry>,
}

impl StudentDirectory {
    /// Build a directory, validating keys, ids and grades.
    pub fn new(entries: Vec<DirectoryEntry>) -> Result<Self, DirectoryError> {
        validate(&entries)?;
        Ok(Self::indexed(entries))
    }

    /// Index entries already known to be valid.
    fn indexed(entries: Vec<DirectoryEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, e)| (e.key.clone(), position))
            .collect();
        let selector = entries
            .iter()
            .map(|e| SelectorEntry {
                key: e.key.clone(),
                display_name: e.record.name.clone(),
            })
            .collect();

        tracing::debug!(students = entries.len(), "Student directory built");

        Self {
            entries,
            index,
            selector,
        }
    }

    /// Look up a student by key.
    pub fn get(&self, key: &str) -> Result<&StudentRecord, DirectoryError> {
        self.index
            .get(key)
            .map(|&i| &self.entries[i].record)
            .ok_or_else(|| DirectoryError::NotFound(key.to_string()))
    }

    /// All keys, in definition order.
    pub fn list_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Selector rows `(key, display name)`, in definition order.
    pub fn selector(&self) -> &[SelectorEntry] {
        &self.selector
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The roster shipped with the binary.
    pub fn builtin() -> Self {
        Self::indexed(builtin_roster())
    }
}

fn validate(entries: &[DirectoryEntry]) -> Result<(), DirectoryError> {
    let mut keys = HashSet::with_capacity(entries.len());
    let mut ids = HashSet::with_capacity(entries.len());

    for entry in entries {
        if !keys.insert(entry.key.as_str()) {
            return Err(DirectoryError::DuplicateKey(entry.key.clone()));
        }
        if !ids.insert(entry.record.id.as_str()) {
            return Err(DirectoryError::DuplicateId(entry.record.id.clone()));
        }
        if let Some(subject) = entry.record.subjects.iter().find(|s| s.grade > 100) {
            return Err(DirectoryError::GradeOutOfRange {
                student: entry.key.clone(),
                subject: subject.name.clone(),
                grade: subject.grade,
            });
        }
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_roster() -> Vec<DirectoryEntry> {
    vec![
        DirectoryEntry {
            key: "emma".into(),
            record: StudentRecord {
                id: "STU001".into(),
                name: "Emma".into(),
                academic_details: AcademicDetails {
                    class_label: "12th Grade".into(),
                    department: "Science".into(),
                    year: 2025,
                },
                subjects: vec![
                    Subject::new("Mathematics", 30),
                    Subject::new("Physics", 32),
                    Subject::new("Chemistry", 99),
                    Subject::new("computer science", 30),
                ],
                strengths: strings(&[
                    "Excellent problem-solving skills",
                    "Quick understanding of scientific concepts",
                ]),
                weaknesses: strings(&[
                    "Lower confidence in literature-based subjects",
                    "Difficulty summarizing long reading content",
                ]),
                areas_for_improvement: strings(&[
                    "Improve reading comprehension and essay writing",
                    "Practice literature concepts regularly",
                    "Enhance note-taking for theory-heavy subjects",
                ]),
                learning_style: LearningStyle {
                    kind: "Step-by-step learning".into(),
                    description: "Learns best through structured steps and logical flow.".into(),
                    examples_based_on_strengths: strings(&[
                        "Math-based explanations with clear formulas",
                        "Physics concepts taught using diagrams and real-world analogies",
                        "Breaking complex problems into smaller steps",
                    ]),
                },
            },
        },
        DirectoryEntry {
            key: "michael".into(),
            record: StudentRecord {
                id: "STU002".into(),
                name: "Michael".into(),
                academic_details: AcademicDetails {
                    class_label: "12th Grade".into(),
                    department: "Arts & Literature".into(),
                    year: 2025,
                },
                subjects: vec![
                    Subject::new("Art", 95),
                    Subject::new("computer science", 90),
                    Subject::new("Mathematics", 65),
                    Subject::new("Physics", 70),
                ],
                strengths: strings(&[
                    "Creative expression and imagination",
                    "Strong memory and storytelling ability",
                    "Good conceptual understanding in humanities subjects",
                ]),
                weaknesses: strings(&[
                    "Struggles with numerical problem-solving",
                    "Difficulty understanding abstract formulas",
                ]),
                areas_for_improvement: strings(&[
                    "Practice basic mathematics daily",
                    "Use visual and real-life examples to learn physics",
                    "Strengthen logical reasoning with simple step-based exercises",
                ]),
                learning_style: LearningStyle {
                    kind: "Example-based learning".into(),
                    description: "Learns best through visual examples, stories, and comparisons."
                        .into(),
                    examples_based_on_strengths: strings(&[
                        "Use art-based analogies to explain physics concepts",
                        "Explain math problems using visual metaphors",
                        "Use storytelling to teach difficult subjects",
                    ]),
                },
            },
        },
    ]
}
