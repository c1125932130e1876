//! The query context that macros read from.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Seconds between the Unix epoch and `0001-01-01T00:00:00Z`, the instant used for unset time ranges.
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

/// The instant an unset time range starts and ends at.
#[must_use]
pub fn zero_instant() -> DateTime<Utc> {
	DateTime::from_timestamp(ZERO_INSTANT_SECS, 0).unwrap_or_default()
}

/// Formats an instant the way the time macros print it, e.g. `2024-03-01T12:00:00Z`.
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
	instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The time range a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
	/// Start of the range.
	pub from: DateTime<Utc>,
	/// End of the range.
	pub to: DateTime<Utc>,
}

impl TimeRange {
	/// Creates a time range.
	#[must_use]
	pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
		Self { from, to }
	}
}

impl Default for TimeRange {
	fn default() -> Self {
		let zero = zero_instant();
		Self { from: zero, to: zero }
	}
}

/// How the results of a query are meant to be shaped.
///
/// Encoded in the query model as a number: `0` time series, `1` table, `2` logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "u32")]
pub enum Format {
	/// One frame per series.
	#[default]
	TimeSeries,
	/// A single table.
	Table,
	/// Log lines.
	Logs,
}

impl TryFrom<u32> for Format {
	type Error = String;

	fn try_from(value: u32) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Format::TimeSeries),
			1 => Ok(Format::Table),
			2 => Ok(Format::Logs),
			other => Err(format!("unknown query format {other}")),
		}
	}
}

/// A single query, as seen by macros.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
	/// Identifies the query within a request.
	pub ref_id: String,
	/// The template text. While interpolating, this holds the partially expanded text.
	pub raw_sql: String,
	/// The requested result shape.
	pub format: Format,
	/// Substituted by `$__table`.
	pub table: String,
	/// Substituted by `$__column`.
	pub column: String,
	/// Suggested interval between points.
	#[serde(rename = "intervalMs", deserialize_with = "millis")]
	pub interval: Duration,
	/// Upper bound on returned points.
	pub max_data_points: i64,
	/// The time range used by the time macros.
	#[serde(skip)]
	pub time_range: TimeRange,
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
	u64::deserialize(deserializer).map(Duration::from_millis)
}

impl Query {
	/// Creates a query from template text, leaving everything else at its default.
	#[must_use]
	pub fn new(raw_sql: impl Into<String>) -> Self {
		Self { raw_sql: raw_sql.into(), ..Self::default() }
	}

	/// Decodes a query from its JSON model, e.g. `{"refId": "A", "rawSql": "select $__column from $__table"}`.
	///
	/// # Errors
	/// Errors if the bytes are not a valid query object.
	pub fn from_json(bytes: &[u8], time_range: TimeRange) -> Result<Self, serde_json::Error> {
		let mut query: Self = serde_json::from_slice(bytes)?;
		query.time_range = time_range;
		Ok(query)
	}

	/// Returns a copy of this query with different template text.
	#[must_use]
	pub fn with_sql(&self, raw_sql: impl Into<String>) -> Self {
		Self { raw_sql: raw_sql.into(), ..self.clone() }
	}

	/// Sets the table name.
	#[must_use]
	pub fn with_table(mut self, table: impl Into<String>) -> Self {
		self.table = table.into();
		self
	}

	/// Sets the column name.
	#[must_use]
	pub fn with_column(mut self, column: impl Into<String>) -> Self {
		self.column = column.into();
		self
	}

	/// Sets the time range.
	#[must_use]
	pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
		self.time_range = time_range;
		self
	}
}

#[cfg(test)]
mod test {
	use crate::query::*;
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	#[test]
	fn zero_instant_test() {
		assert_eq!(format_instant(&TimeRange::default().from), "0001-01-01T00:00:00Z");
		assert_eq!(format_instant(&TimeRange::default().to), "0001-01-01T00:00:00Z");
	}

	#[test]
	fn format_test() {
		let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
		assert_eq!(format_instant(&instant), "2024-03-01T12:30:05Z");
	}

	#[test]
	fn json_test() {
		let body = br#"{"refId": "A", "rawSql": "select $__column from $__table", "format": 1, "table": "t", "column": "c", "intervalMs": 1500, "maxDataPoints": 100}"#;
		let query = Query::from_json(body, TimeRange::default()).unwrap();
		assert_eq!(query.ref_id, "A");
		assert_eq!(query.raw_sql, "select $__column from $__table");
		assert_eq!(query.format, Format::Table);
		assert_eq!(query.table, "t");
		assert_eq!(query.column, "c");
		assert_eq!(query.interval, Duration::from_millis(1500));
		assert_eq!(query.max_data_points, 100);

		let sparse = Query::from_json(br#"{"rawSql": "select 1"}"#, TimeRange::default()).unwrap();
		assert_eq!(sparse, Query::new("select 1"));
		assert!(Query::from_json(b"[1, 2]", TimeRange::default()).is_err());
		assert!(Query::from_json(br#"{"format": "table"}"#, TimeRange::default()).is_err());
		assert!(Query::from_json(br#"{"format": 7}"#, TimeRange::default()).is_err());
	}

	#[test]
	fn format_code_test() {
		fn decode(body: &[u8]) -> Format {
			Query::from_json(body, TimeRange::default()).unwrap().format
		}
		assert_eq!(decode(br#"{"rawSql": "select 1", "format": 0}"#), Format::TimeSeries);
		assert_eq!(decode(br#"{"rawSql": "select 1", "format": 1}"#), Format::Table);
		assert_eq!(decode(br#"{"rawSql": "select 1", "format": 2}"#), Format::Logs);
		assert_eq!(decode(br#"{"rawSql": "select 1"}"#), Format::TimeSeries);
	}

	#[test]
	fn with_sql_test() {
		let query = Query::new("a").with_table("t").with_column("c");
		let copy = query.with_sql("b");
		assert_eq!(copy.raw_sql, "b");
		assert_eq!(copy.table, "t");
		assert_eq!(query.raw_sql, "a");
	}
}
