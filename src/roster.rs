use tracing::{debug, info, warn};

use crate::error::RosterError;
use crate::grading;
use crate::models::{RecordId, SortMode, StudentInput, StudentRecord, ViewStats};
use crate::store::{self, SlotStore};
use crate::view;

/// Result of a mutation. The mutation is applied in memory even when the
/// follow-up write fails; `write_warning` then carries the storage error.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub write_warning: Option<RosterError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub added: usize,
    pub rejected: Vec<(usize, String)>,
}

/// Single owner of the master collection. Every mutation ends with a write of
/// the whole roster to its slot.
pub struct Roster<S> {
    store: S,
    slot: String,
    students: Vec<StudentRecord>,
}

impl<S: SlotStore> Roster<S> {
    pub async fn open(store: S, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let students = store::load(&store, &slot).await;
        Self {
            store,
            slot,
            students,
        }
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn get(&self, id: &RecordId) -> Option<&StudentRecord> {
        self.students.iter().find(|student| &student.id == id)
    }

    pub fn view(&self, search: &str, mode: SortMode) -> (Vec<&StudentRecord>, ViewStats) {
        let list = view::compute_view(&self.students, search, mode);
        let stats = view::compute_stats(&self.students, &list);
        (list, stats)
    }

    pub async fn add(&mut self, input: &StudentInput) -> Result<Outcome<StudentRecord>, RosterError> {
        let (name, scores) = grading::validate_input(input)?;
        let student = grading::build(&name, scores, None);
        self.students.push(student.clone());
        info!(id = %student.id, name = %student.name, "student added");
        Ok(self.persisted(student).await)
    }

    /// Overwrites every field except id and creation time. Validation runs before
    /// the lookup, so a bad edit of a vanished record still reports the bad field.
    pub async fn edit(
        &mut self,
        id: &RecordId,
        input: &StudentInput,
    ) -> Result<Outcome<StudentRecord>, RosterError> {
        let (name, scores) = grading::validate_input(input)?;
        let Some(existing) = self.students.iter_mut().find(|student| &student.id == id) else {
            debug!(id = %id, "edit skipped, student no longer present");
            return Err(RosterError::RecordNotFound(id.clone()));
        };

        *existing = grading::build(&name, scores, Some(existing.identity()));
        let student = existing.clone();
        info!(id = %student.id, "student updated");
        Ok(self.persisted(student).await)
    }

    pub async fn delete(&mut self, id: &RecordId) -> Result<Outcome<StudentRecord>, RosterError> {
        let Some(index) = self.students.iter().position(|student| &student.id == id) else {
            debug!(id = %id, "delete skipped, student no longer present");
            return Err(RosterError::RecordNotFound(id.clone()));
        };

        let removed = self.students.remove(index);
        info!(id = %removed.id, "student deleted");
        Ok(self.persisted(removed).await)
    }

    /// Clears the roster only when `confirmed`; returns `None` when the caller did not
    /// confirm, leaving everything untouched.
    pub async fn reset_all(&mut self, confirmed: bool) -> Option<Outcome<usize>> {
        if !confirmed {
            debug!("reset declined");
            return None;
        }

        let cleared = self.students.len();
        self.students.clear();
        info!(cleared, "roster reset");
        Some(self.persisted(cleared).await)
    }

    /// Adds each valid row and skips the rest, writing once at the end. Rows that
    /// could not be read arrive as `Err` and are reported alongside invalid ones.
    pub async fn add_batch(&mut self, rows: &[Result<StudentInput, String>]) -> Outcome<BatchSummary> {
        let mut summary = BatchSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let input = match row {
                Ok(input) => input,
                Err(reason) => {
                    debug!(row = index + 1, reason = %reason, "batch row unreadable");
                    summary.rejected.push((index + 1, reason.clone()));
                    continue;
                }
            };
            match grading::validate_input(input) {
                Ok((name, scores)) => {
                    self.students.push(grading::build(&name, scores, None));
                    summary.added += 1;
                }
                Err(err) => {
                    debug!(row = index + 1, error = %err, "batch row rejected");
                    summary.rejected.push((index + 1, err.to_string()));
                }
            }
        }

        if summary.added == 0 {
            return Outcome {
                value: summary,
                write_warning: None,
            };
        }
        info!(added = summary.added, rejected = summary.rejected.len(), "batch added");
        self.persisted(summary).await
    }

    async fn persisted<T>(&self, value: T) -> Outcome<T> {
        let write_warning = match store::save(&self.store, &self.slot, &self.students).await {
            Ok(()) => None,
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "roster change not saved");
                Some(err)
            }
        };
        Outcome {
            value,
            write_warning,
        }
    }
}
