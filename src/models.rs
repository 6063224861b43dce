use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque record identifier. New ids are UUID v4 strings; ids loaded from storage
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            LetterGrade::A => "bg-success",
            LetterGrade::B => "bg-primary",
            LetterGrade::C => "bg-warning text-dark",
            LetterGrade::D => "bg-danger",
            LetterGrade::F => "bg-dark",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity carried across edits: never reassigned once minted.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: RecordId,
    pub created_at: i64,
}

impl Identity {
    pub fn mint() -> Self {
        Self {
            id: RecordId::mint(),
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub math: f64,
    pub english: f64,
    pub science: f64,
}

/// A fully derived student record. Built only through `grading::build`, so `total`,
/// `avg` and `grade` always agree with the three scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: RecordId,
    pub name: String,
    pub math: f64,
    pub english: f64,
    pub science: f64,
    pub total: f64,
    pub avg: f64,
    pub grade: LetterGrade,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl StudentRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            created_at: self.created_at,
        }
    }
}

/// Raw field values as a user typed them, before validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StudentInput {
    pub name: String,
    pub math: String,
    pub english: String,
    pub science: String,
}

impl StudentInput {
    pub fn new(name: &str, math: &str, english: &str, science: &str) -> Self {
        Self {
            name: name.to_string(),
            math: math.to_string(),
            english: english.to_string(),
            science: science.to_string(),
        }
    }

    /// Editable copy of an existing record.
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            math: record.math.to_string(),
            english: record.english.to_string(),
            science: record.science.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Unsorted,
    Newest,
    Oldest,
    AvgHigh,
    AvgLow,
    NameAz,
    NameZa,
}

impl SortMode {
    /// Lenient parse: anything unrecognised leaves the list unsorted.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "newest" => SortMode::Newest,
            "oldest" => SortMode::Oldest,
            "avgHigh" => SortMode::AvgHigh,
            "avgLow" => SortMode::AvgLow,
            "nameAZ" => SortMode::NameAz,
            "nameZA" => SortMode::NameZa,
            _ => SortMode::Unsorted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Unsorted => "insertion order",
            SortMode::Newest => "newest first",
            SortMode::Oldest => "oldest first",
            SortMode::AvgHigh => "highest average",
            SortMode::AvgLow => "lowest average",
            SortMode::NameAz => "name A-Z",
            SortMode::NameZa => "name Z-A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStats {
    pub shown: usize,
    pub total: usize,
}
