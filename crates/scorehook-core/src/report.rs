//! Fixed-layout markdown report for a validated submission.
//!
//! Field order, labels and the timestamp format are read by people and bots
//! downstream and must not drift.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::escape::md_escape;
use crate::submission::{Score, SubmissionRecord};

pub const TIMESTAMP_FMT: &str = "%H:%M:%S - %d/%m/%Y";
pub const MISSING_TIME: &str = "⏳ Missing time";

#[derive(Serialize)]
struct ScoreFragment<'a> {
    name: &'a str,
    values: &'a [Score],
}

/// Pretty JSON of the raw name and scores: keys sorted, 4-space indent.
pub fn score_fragment(record: &SubmissionRecord) -> Result<String, serde_json::Error> {
    let fragment = ScoreFragment {
        name: record.name(),
        values: record.scores(),
    };
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    fragment.serialize(&mut ser)?;
    Ok(String::from_utf8(buf).expect("serde_json emits UTF-8"))
}

/// `HH:MM:SS - DD/MM/YYYY` in the timestamp's own offset.
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format(TIMESTAMP_FMT).to_string()
}

/// Render the report stamped with the current time.
pub fn render(record: &SubmissionRecord) -> Result<String, serde_json::Error> {
    render_at(record, Utc::now())
}

/// Render the report with an explicit submission time. The answered time is
/// printed in the offset the client sent, not converted.
pub fn render_at(
    record: &SubmissionRecord,
    submitted: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let answered = record
        .answered_at()
        .map_or_else(|| MISSING_TIME.to_string(), |ts| format_timestamp(&ts));

    Ok(format!(
        "\n**User:** {user}\n\
         **Time Submitted:** {submitted} (UTC)\n\
         **Time Answered:** {answered} (UTC)\n\
         **Edition:** {edition}\n\
         **Authenticity:** {authenticity}\n\
         **Takes**: {takes}\n\
         **User Agent:** {user_agent}\n\
         **Version:** {version}\n\
         ```json\n\
         {fragment}\n\
         ```",
        user = md_escape(record.name()),
        submitted = format_timestamp(&submitted),
        edition = record.edition().label(),
        authenticity = record.authenticity().label(),
        takes = record.takes(),
        user_agent = record.user_agent(),
        version = record.version(),
        fragment = score_fragment(record)?,
    ))
}
