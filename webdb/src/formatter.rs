use colored::*;
use serde_json::Value;
use webdb_core::{
    chrono::{DateTime, Utc},
    client::{Page, Record},
    error::DatabaseError,
    state::TYPE_KEY,
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct RecordList(pub Vec<Record>);

pub struct Count(pub i64);

pub struct LastUpdate(pub Option<DateTime<Utc>>);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// The fields of a record, with `_type` shown as the type name when it is known.
fn record_json(record: &Record) -> Value {
    let mut values = record.state().simple_values();
    if let Some(object_type) = record.object_type() {
        values.insert(
            TYPE_KEY.to_string(),
            Value::String(object_type.internal_name.clone()),
        );
    }
    Value::Object(values)
}

impl From<Value> for FormattedString {
    fn from(value: Value) -> Self {
        FormattedString(pretty(&value))
    }
}

impl From<Option<Record>> for FormattedString {
    fn from(record: Option<Record>) -> Self {
        match record {
            Some(record) => FormattedString(pretty(&record_json(&record))),
            None => FormattedString("No object found.".yellow().to_string()),
        }
    }
}

impl From<RecordList> for FormattedString {
    fn from(RecordList(records): RecordList) -> Self {
        if records.is_empty() {
            return FormattedString("No objects found.".yellow().to_string());
        }

        let items = Value::Array(records.iter().map(record_json).collect());
        FormattedString(format!(
            "{} {}\n{}",
            records.len().to_string().green(),
            "object(s):".cyan(),
            pretty(&items)
        ))
    }
}

impl From<Page<Record>> for FormattedString {
    fn from(page: Page<Record>) -> Self {
        FormattedString::from(page.map(|record| record_json(&record)))
    }
}

impl From<Page<Value>> for FormattedString {
    fn from(page: Page<Value>) -> Self {
        if page.is_empty() {
            return FormattedString(format!(
                "{} ({} in total)",
                "Empty page.".yellow(),
                page.count
            ));
        }

        let header = format!(
            "{} {}-{} {} {}",
            "Items".cyan(),
            page.first_item_index(),
            page.last_item_index(),
            "of".cyan(),
            page.count.to_string().green()
        );
        let next = if page.has_next() {
            format!("\n{} --offset {}", "Next page:".cyan(), page.next_offset())
        } else {
            String::new()
        };

        FormattedString(format!("{header}\n{}{next}", pretty(&Value::Array(page.items))))
    }
}

impl From<Count> for FormattedString {
    fn from(Count(count): Count) -> Self {
        FormattedString(format!("{} {}", "Count:".cyan(), count.to_string().green()))
    }
}

impl From<LastUpdate> for FormattedString {
    fn from(LastUpdate(time): LastUpdate) -> Self {
        match time {
            Some(time) => FormattedString(format!(
                "{} {}",
                "Last update:".cyan(),
                time.to_rfc3339().green()
            )),
            None => FormattedString("Never updated.".yellow().to_string()),
        }
    }
}

impl From<DatabaseError> for FormattedString {
    fn from(err: DatabaseError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Request Failed:".red().bold(), err))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Error:".red().bold(), err))
    }
}
