//! Harmony task data model and validation.
//!
//! A task carries a notated score, a prose description, and one or more
//! answer references. Validation runs both when persisting a task and when
//! loading one, so externally edited storage cannot smuggle a malformed
//! record past the repository.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Format of a score payload. `data` holds either inline content or a
/// reference path, depending on the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Musicxml,
    Image,
    Json,
}

/// Format of an answer payload. Same set as [`ScoreType`].
pub type AnswerType = ScoreType;

impl ScoreType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreType::Musicxml => "musicxml",
            ScoreType::Image => "image",
            ScoreType::Json => "json",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The notated exercise given to the student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    pub data: String,
}

/// One model answer for an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "type")]
    pub answer_type: AnswerType,
    pub data: String,
}

/// Exercise difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(Error::Validation("difficulty is invalid".to_string())),
        }
    }
}

/// A single harmony exercise task.
///
/// `id` is the storage key and immutable once created. Optional fields are
/// omitted from the wire format when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonyTask {
    pub id: String,
    pub description: String,
    pub score: Score,
    pub answer: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl HarmonyTask {
    /// Check the invariants the type system cannot carry: non-empty id,
    /// description and payload data, and at least one answer. Runs before
    /// every save.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(invalid("id is required"));
        }
        if self.description.is_empty() {
            return Err(invalid("description is required"));
        }
        if self.score.data.is_empty() {
            return Err(invalid("score.data is required"));
        }
        if self.answer.is_empty() {
            return Err(invalid("answer must be a non-empty array"));
        }
        if self.answer.iter().any(|a| a.data.is_empty()) {
            return Err(invalid("answer.data is required"));
        }
        Ok(())
    }
}

const VALID_TYPES: [&str; 3] = ["musicxml", "image", "json"];
const DIFFICULTIES: [&str; 3] = ["easy", "normal", "hard"];

/// Validate an untyped task record field by field, failing on the first
/// violation with a message naming it. Runs on every load, as a defense
/// against corrupted or externally edited storage.
///
/// Optional fields serialized as JSON `null` (other writers of the same
/// format do this) are treated as absent.
pub fn validate_record(candidate: &Value) -> Result<HarmonyTask> {
    let record = candidate
        .as_object()
        .ok_or_else(|| invalid("task must be an object"))?;

    if !is_non_empty_string(record.get("id")) {
        return Err(invalid("id is required"));
    }
    if !is_non_empty_string(record.get("description")) {
        return Err(invalid("description is required"));
    }

    let score = record
        .get("score")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("score is required"))?;
    if !is_valid_type(score.get("type")) {
        return Err(invalid("score.type is invalid"));
    }
    if !is_non_empty_string(score.get("data")) {
        return Err(invalid("score.data is required"));
    }

    let answers = record
        .get("answer")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| invalid("answer must be a non-empty array"))?;
    for answer in answers {
        let entry = answer
            .as_object()
            .ok_or_else(|| invalid("answer.type is invalid"))?;
        if !is_valid_type(entry.get("type")) {
            return Err(invalid("answer.type is invalid"));
        }
        if !is_non_empty_string(entry.get("data")) {
            return Err(invalid("answer.data is required"));
        }
    }

    if let Some(difficulty) = record.get("difficulty").filter(|v| !v.is_null()) {
        let known = difficulty
            .as_str()
            .is_some_and(|d| DIFFICULTIES.contains(&d));
        if !known {
            return Err(invalid("difficulty is invalid"));
        }
    }
    if let Some(tags) = record.get("tags").filter(|v| !v.is_null()) {
        if !tags.is_array() {
            return Err(invalid("tags must be an array"));
        }
    }

    serde_json::from_value(candidate.clone())
        .map_err(|err| invalid(&format!("task record is malformed: {err}")))
}

fn invalid(message: &str) -> Error {
    Error::Validation(message.to_string())
}

fn is_non_empty_string(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}

fn is_valid_type(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| VALID_TYPES.contains(&s))
}
