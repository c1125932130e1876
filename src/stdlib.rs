//! Contains the default macros.
//!
//! Every driver gets these unless it overrides them by name.

use crate::execution::{Macro, MacroErrorKind};
use crate::query::{format_instant, Query};
use crate::registry::Macros;
use itertools::Itertools;

macro_rules! count {
	($tt: tt $($tts: tt)*) => {
		1 + count!($($tts)*)
	};
	() => {0}
}

macro_rules! builtin_macros {
	($($(#[$attr: meta])* macro $id: ident as $name: literal {$inner: item})*) => {$(
		#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
		$(#[$attr])*
		pub struct $id;

		impl Macro for $id {
			$inner
		}
	)*

		/// The names of the default macros, in the order they are applied.
		pub const DEFAULT_NAMES: &[&str] = &[$($name),*];

		/// Adds the default macros to a registry, replacing any with the same name.
		pub fn add_defaults(macros: &mut Macros) {
			$(
				macros.insert($name, $id);
			)*
		}
	}
}

/// Takes exactly the named arguments, or errors with the amount actually supplied.
macro_rules! get_args {
	($arguments: ident; $($ids: ident),+) => {
		match *$arguments {
			[$($ids),+] if supplied($arguments) == count!($($ids)*) => ($($ids,)+),
			_ => return Err(MacroErrorKind::bad_argument_count(count!($($ids)*), supplied($arguments)))
		}
	}
}

/// The amount of arguments actually given. A lone empty argument means none were.
fn supplied(arguments: &[&str]) -> usize {
	match arguments {
		[only] if only.is_empty() => 0,
		_ => arguments.len()
	}
}

/// Granularities understood by `timeGroup`, finest first.
const GRANULARITIES: [&str; 5] = ["minute", "hour", "day", "month", "year"];

/// Creates a registry holding only the default macros.
#[must_use]
pub fn default_macros() -> Macros {
	let mut macros = Macros::new();
	add_defaults(&mut macros);
	macros
}

builtin_macros! {
	/// The query's table name. Arguments are ignored.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     select * from $__table -> select * from my_table
	///     select * from $__table() -> select * from my_table
	/// ").unwrap();
	/// ```
	macro DefaultTable as "table" {
		fn apply(&self, query: &Query, _arguments: &[&str]) -> Result<String, MacroErrorKind> {
			Ok(query.table.clone())
		}
	}

	/// The query's column name. Arguments are ignored.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     select $__column from t -> select my_col from t
	/// ").unwrap();
	/// ```
	macro DefaultColumn as "column" {
		fn apply(&self, query: &Query, _arguments: &[&str]) -> Result<String, MacroErrorKind> {
			Ok(query.column.clone())
		}
	}

	/// Filters a time expression to at or after the start of the query's time range.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     $__timeFrom(time) -> time >= '0001-01-01T00:00:00Z'
	///     $__timeFrom() -> error: expected 1 arguments, found 0
	/// ").unwrap();
	/// ```
	macro DefaultTimeFrom as "timeFrom" {
		fn apply(&self, query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
			let (column, ) = get_args!(arguments; column);
			Ok(format!("{column} >= '{}'", format_instant(&query.time_range.from)))
		}
	}

	/// Filters a time expression to at or before the end of the query's time range.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     $__timeTo(time) -> time <= '0001-01-01T00:00:00Z'
	///     $__timeTo(a, b) -> error: expected 1 arguments, found 2
	/// ").unwrap();
	/// ```
	macro DefaultTimeTo as "timeTo" {
		fn apply(&self, query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
			let (column, ) = get_args!(arguments; column);
			Ok(format!("{column} <= '{}'", format_instant(&query.time_range.to)))
		}
	}

	/// Filters a time expression to the query's time range, inclusive on both ends.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     $__timeFilter(time) -> time >= '0001-01-01T00:00:00Z' AND time <= '0001-01-01T00:00:00Z'
	/// ").unwrap();
	/// ```
	macro DefaultTimeFilter as "timeFilter" {
		fn apply(&self, query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
			let (column, ) = get_args!(arguments; column);
			Ok(format!(
				"{column} >= '{}' AND {column} <= '{}'",
				format_instant(&query.time_range.from),
				format_instant(&query.time_range.to)
			))
		}
	}

	/// Groups a time expression by a granularity, using `datepart` for every part from that
	/// granularity up to the year. Most drivers will want to override this.
	/// # Examples
	/// ```
	/// sqlmacro::test::test_output(r"
	///     $__timeGroup(t, month) -> datepart(month, t),datepart(year, t)
	///     $__timeGroup(t, 'year') -> datepart(year, t)
	///     $__timeGroup(t, week) -> error: unsupported time group granularity week
	/// ").unwrap();
	/// ```
	macro DefaultTimeGroup as "timeGroup" {
		fn apply(&self, _query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
			let (column, granularity) = get_args!(arguments; column, granularity);
			let granularity = granularity.trim_matches('\'');
			let Some(start) = GRANULARITIES.iter().position(|part| *part == granularity) else {
				return Err(MacroErrorKind::user(format!("unsupported time group granularity {granularity}")));
			};
			Ok(GRANULARITIES[start ..].iter().map(|part| format!("datepart({part}, {column})")).join(","))
		}
	}
}
