use std::str::FromStr;

use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::error::RosterError;
use crate::grading;
use crate::models::{Identity, RecordId, Scores, StudentRecord};

pub const DEFAULT_SLOT: &str = "grades_manager_students_v1";

/// A durable key-value slot holding one serialized roster.
pub trait SlotStore {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, RosterError>;
    async fn write_slot(&self, key: &str, value: &str) -> Result<(), RosterError>;
}

pub struct SqliteSlotStore {
    pool: SqlitePool,
}

impl SqliteSlotStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("failed to open SQLite database")?;
        Ok(Self { pool })
    }

    pub async fn init_db(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

impl SlotStore for SqliteSlotStore {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, RosterError> {
        let row = sqlx::query("SELECT value FROM roster_slots WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| RosterError::StorageUnavailable(err.to_string()))?;
        Ok(row.map(|row| row.get("value")))
    }

    async fn write_slot(&self, key: &str, value: &str) -> Result<(), RosterError> {
        sqlx::query(
            r#"
            INSERT INTO roster_slots (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE
            SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| RosterError::StorageWrite(err.to_string()))?;
        Ok(())
    }
}

/// Loads and normalizes the roster. Never fails: an absent, unreadable or
/// non-array slot yields an empty roster.
pub async fn load<S: SlotStore>(store: &S, key: &str) -> Vec<StudentRecord> {
    match read_roster(store, key).await {
        Ok(students) => {
            info!(slot = key, count = students.len(), "roster loaded");
            students
        }
        Err(err) => {
            info!(slot = key, error = %err, "starting with an empty roster");
            Vec::new()
        }
    }
}

async fn read_roster<S: SlotStore>(store: &S, key: &str) -> Result<Vec<StudentRecord>, RosterError> {
    let Some(text) = store.read_slot(key).await? else {
        return Ok(Vec::new());
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(&text).map_err(|err| RosterError::StorageCorrupt(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(RosterError::StorageCorrupt(
            "slot does not hold an array".to_string(),
        ));
    };

    Ok(items.iter().filter_map(normalize).collect())
}

pub async fn save<S: SlotStore>(
    store: &S,
    key: &str,
    students: &[StudentRecord],
) -> Result<(), RosterError> {
    let text =
        serde_json::to_string(students).map_err(|err| RosterError::StorageWrite(err.to_string()))?;
    store.write_slot(key, &text).await
}

/// Stored shape, tolerant of the alternate key spellings written by older builds.
/// Stored aggregates are ignored and re-derived.
#[derive(Deserialize)]
struct RawStudent {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    math: Option<Value>,
    #[serde(default, rename = "mathGrade")]
    math_grade: Option<Value>,
    #[serde(default)]
    english: Option<Value>,
    #[serde(default, rename = "englishGrade")]
    english_grade: Option<Value>,
    #[serde(default)]
    science: Option<Value>,
    #[serde(default, rename = "scienceGrade")]
    science_grade: Option<Value>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<Value>,
}

/// Turns one stored element into a record, or `None` when it is not an object,
/// has a blank name, or carries an invalid score.
pub fn normalize(raw: &Value) -> Option<StudentRecord> {
    if !raw.is_object() {
        debug!("discarding stored element that is not an object");
        return None;
    }
    let raw = match RawStudent::deserialize(raw) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, "discarding stored element that is not a student");
            return None;
        }
    };

    let name = match grading::validate_name(&coerce_text(raw.name.as_ref())) {
        Ok(name) => name,
        Err(_) => {
            debug!("discarding stored student with a blank name");
            return None;
        }
    };

    let scores = Scores {
        math: coerce_number(raw.math.as_ref().or(raw.math_grade.as_ref())),
        english: coerce_number(raw.english.as_ref().or(raw.english_grade.as_ref())),
        science: coerce_number(raw.science.as_ref().or(raw.science_grade.as_ref())),
    };
    let Ok(scores) = grading::validate_scores(scores) else {
        debug!(name = %name, "discarding stored student with invalid scores");
        return None;
    };

    let id = coerce_id(raw.id.as_ref()).unwrap_or_else(RecordId::mint);
    let created_at = coerce_number(raw.created_at.as_ref());
    let created_at = if created_at.is_finite() && created_at > 0.0 {
        created_at as i64
    } else {
        Utc::now().timestamp_millis()
    };

    Some(grading::build(&name, scores, Some(Identity { id, created_at })))
}

fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) if text.trim().is_empty() => 0.0,
        Some(Value::String(text)) => text.trim().parse().unwrap_or(f64::NAN),
        Some(Value::Bool(flag)) => f64::from(u8::from(*flag)),
        _ => f64::NAN,
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn coerce_id(value: Option<&Value>) -> Option<RecordId> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(RecordId::from(text.as_str())),
        Some(Value::Number(number)) => Some(RecordId::from(number.to_string())),
        _ => None,
    }
}

#[cfg(test)]
pub use memory::MemorySlotStore;
