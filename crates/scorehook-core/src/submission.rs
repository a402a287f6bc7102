//! Submission validation: untyped JSON in, [`SubmissionRecord`] out.
//!
//! Scores are the load-bearing content and are validated strictly. Every
//! other field is total: a malformed or missing value degrades to a
//! sentinel instead of failing the submission.

use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::digest::{self, Authenticity};
use crate::error::ValidationError;
use crate::escape::md_escape;

/// Sentinel for absent text fields.
pub const MISSING: &str = "Missing";
/// Sentinel for an absent attempt count.
pub const MISSING_TAKES: &str = "⁉️ Missing takes";
/// Names longer than this are rewritten by [`LongNamePolicy`].
pub const MAX_NAME_CHARS: usize = 200;
/// Score count expected from the current quiz.
pub const DEFAULT_SCORE_COUNT: usize = 7;
/// Accepted layout of the `time` field, after a trailing `Z` is rewritten
/// to `+00:00`. The fraction must carry one to six digits.
pub const ANSWERED_AT_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const MAX_FRACTION_DIGITS: usize = 6;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

/// How names over [`MAX_NAME_CHARS`] are shortened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LongNamePolicy {
    /// Keep every 200th character starting at the first. This is what the
    /// deployed service has always done and usually leaves one character.
    #[default]
    Stride,
    /// Keep the first 200 characters.
    Truncate,
}

impl LongNamePolicy {
    fn apply(self, name: &str) -> String {
        match self {
            Self::Stride => name.chars().step_by(MAX_NAME_CHARS).collect(),
            Self::Truncate => name.chars().take(MAX_NAME_CHARS).collect(),
        }
    }
}

impl std::str::FromStr for LongNamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stride" => Ok(Self::Stride),
            "truncate" => Ok(Self::Truncate),
            other => Err(format!("unknown long-name policy: {other}")),
        }
    }
}

/// Knobs fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub score_count: usize,
    pub long_names: LongNamePolicy,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            score_count: DEFAULT_SCORE_COUNT,
            long_names: LongNamePolicy::default(),
        }
    }
}

/// Quiz edition, matched on the first letter of the submitted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    Short,
    Full,
    MissingEdition,
}

impl Edition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "🤏 Short Edition",
            Self::Full => "🐍 Full Edition",
            Self::MissingEdition => "❔ Missing Edition",
        }
    }
}

/// A validated score. Serialises as the number the client sent, so integer
/// scores stay integers in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    raw: Number,
    value: f64,
}

impl Score {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn raw(&self) -> &Number {
        &self.raw
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// One validated submission. Built once per request by
/// [`SubmissionRecord::from_value`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    name: String,
    scores: Vec<Score>,
    authenticity: Authenticity,
    user_agent: String,
    version: String,
    answered_at: Option<DateTime<FixedOffset>>,
    edition: Edition,
    takes: String,
}

impl SubmissionRecord {
    /// Validate with the default long-name policy.
    pub fn parse(
        data: &Value,
        user_agent: Option<&str>,
        score_count: usize,
    ) -> Result<Self, ValidationError> {
        let options = ValidatorOptions {
            score_count,
            ..ValidatorOptions::default()
        };
        Self::from_value(data, user_agent, &options)
    }

    /// Validate a raw submission object.
    ///
    /// `user_agent` comes from the transport, not the body. Only score
    /// problems are errors; a non-object `data` simply has no fields and
    /// therefore fails with [`ValidationError::MissingScores`].
    pub fn from_value(
        data: &Value,
        user_agent: Option<&str>,
        options: &ValidatorOptions,
    ) -> Result<Self, ValidationError> {
        let name = parse_name(field(data, "name"), options.long_names);
        let scores = parse_scores(field(data, "vals"), options.score_count)?;

        let values: Vec<f64> = scores.iter().map(Score::value).collect();
        let submitted = field(data, "digest")
            .and_then(Value::as_str)
            .and_then(digest::decode_digest);
        let authenticity = digest::check_digest(submitted.as_deref(), &values);

        Ok(Self {
            name,
            scores,
            authenticity,
            user_agent: escape_or_missing(user_agent),
            version: escape_or_missing(field(data, "version").map(scalar_text).as_deref()),
            answered_at: parse_answered_at(field(data, "time")),
            edition: parse_edition(field(data, "edition")),
            takes: parse_takes(field(data, "takes")),
        })
    }

    /// Trimmed, unescaped submitter name or [`MISSING`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn score_values(&self) -> Vec<f64> {
        self.scores.iter().map(Score::value).collect()
    }

    pub fn authenticity(&self) -> Authenticity {
        self.authenticity
    }

    /// Escaped user agent or [`MISSING`].
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Escaped client version or [`MISSING`].
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn answered_at(&self) -> Option<DateTime<FixedOffset>> {
        self.answered_at
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Escaped attempt count or [`MISSING_TAKES`].
    pub fn takes(&self) -> &str {
        &self.takes
    }
}

/// Look up a key, treating JSON `null` as absent.
fn field<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strings verbatim, everything else as its JSON text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_or_missing(value: Option<&str>) -> String {
    value.map_or_else(|| MISSING.to_string(), md_escape)
}

pub fn parse_name(value: Option<&Value>, policy: LongNamePolicy) -> String {
    let Some(value) = value else {
        return MISSING.to_string();
    };
    let text = scalar_text(value);
    let name = text.trim();
    if name.chars().count() > MAX_NAME_CHARS {
        policy.apply(name)
    } else {
        name.to_string()
    }
}

pub fn parse_scores(value: Option<&Value>, count: usize) -> Result<Vec<Score>, ValidationError> {
    let value = value.ok_or(ValidationError::MissingScores)?;
    let items = value.as_array().ok_or(ValidationError::NotAnArray {
        kind: kind_of(value),
    })?;

    if items.len() != count {
        return Err(ValidationError::CountMismatch {
            got: items.len(),
            want: count,
        });
    }

    items
        .iter()
        .map(|item| {
            let (Value::Number(raw), Some(value)) = (item, item.as_f64()) else {
                return Err(ValidationError::TypeMismatch {
                    value: scalar_text(item),
                    kind: kind_of(item),
                });
            };
            if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                return Err(ValidationError::OutOfRange { value: raw.clone() });
            }
            Ok(Score {
                raw: raw.clone(),
                value,
            })
        })
        .collect()
}

pub fn parse_answered_at(value: Option<&Value>) -> Option<DateTime<FixedOffset>> {
    let text = value?.as_str()?.trim();

    // `%.f` alone would accept a missing fraction or nanoseconds.
    let (_, fraction) = text.split_once('.')?;
    let digits = fraction.bytes().take_while(u8::is_ascii_digit).count();
    if !(1..=MAX_FRACTION_DIGITS).contains(&digits) {
        return None;
    }

    match text.strip_suffix('Z') {
        Some(utc) => DateTime::parse_from_str(&format!("{utc}+00:00"), ANSWERED_AT_FMT).ok(),
        None => DateTime::parse_from_str(text, ANSWERED_AT_FMT).ok(),
    }
}

pub fn parse_edition(value: Option<&Value>) -> Edition {
    let Some(text) = value.and_then(Value::as_str) else {
        return Edition::MissingEdition;
    };
    let edition = text.trim().to_lowercase();
    if edition.starts_with('s') {
        Edition::Short
    } else if edition.starts_with('f') {
        Edition::Full
    } else {
        Edition::MissingEdition
    }
}

pub fn parse_takes(value: Option<&Value>) -> String {
    value.map_or_else(|| MISSING_TAKES.to_string(), |v| md_escape(&scalar_text(v)))
}
