use crate::error::RosterError;
use crate::models::{Identity, LetterGrade, Scores, StudentInput, StudentRecord};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

pub fn validate_score(score: f64) -> Result<f64, RosterError> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(RosterError::InvalidScore)
    }
}

pub fn validate_name(name: &str) -> Result<String, RosterError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(RosterError::InvalidName)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parses a typed score. Blank or non-numeric text yields NaN so that
/// `validate_score` rejects it.
pub fn parse_score(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Validates raw form input: name first, then all three scores together.
pub fn validate_input(input: &StudentInput) -> Result<(String, Scores), RosterError> {
    let name = validate_name(&input.name)?;
    let scores = validate_scores(Scores {
        math: parse_score(&input.math),
        english: parse_score(&input.english),
        science: parse_score(&input.science),
    })?;
    Ok((name, scores))
}

pub fn validate_scores(scores: Scores) -> Result<Scores, RosterError> {
    validate_score(scores.math)?;
    validate_score(scores.english)?;
    validate_score(scores.science)?;
    Ok(scores)
}

pub fn classify(average: f64) -> LetterGrade {
    match average {
        avg if avg >= 90.0 => LetterGrade::A,
        avg if avg >= 80.0 => LetterGrade::B,
        avg if avg >= 70.0 => LetterGrade::C,
        avg if avg >= 60.0 => LetterGrade::D,
        _ => LetterGrade::F,
    }
}

/// Derives a record from already-validated fields. Reuses `identity` on the edit
/// path and mints a fresh one otherwise.
pub fn build(name: &str, scores: Scores, identity: Option<Identity>) -> StudentRecord {
    let identity = identity.unwrap_or_else(Identity::mint);
    let total = scores.math + scores.english + scores.science;
    let avg = total / 3.0;

    StudentRecord {
        id: identity.id,
        name: name.to_string(),
        math: scores.math,
        english: scores.english,
        science: scores.science,
        total,
        avg,
        grade: classify(avg),
        created_at: identity.created_at,
    }
}
