use crate::driver::MacroProvider;
use crate::parsing;
use crate::query::Query;
use crate::registry::Macros;
use crate::stdlib;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("error in macro {name} at `{invocation}`: {kind}")]
/// An error that arose from a macro.
pub struct MacroError {
	/// The name of the macro that failed.
	pub name: String,
	/// The invocation text the macro was applied to.
	pub invocation: String,
	/// The type of error that occurred.
	pub kind: MacroErrorKind,
}

impl MacroError {
	/// Creates an error.
	#[must_use]
	pub fn new(name: impl Into<String>, invocation: impl Into<String>, kind: MacroErrorKind) -> Self {
		MacroError { name: name.into(), invocation: invocation.into(), kind }
	}
}

impl MacroErrorKind {
	/// Creates a user error.
	#[must_use]
	pub fn user(message: impl Into<String>) -> Self {
		MacroErrorKind::User { message: message.into() }
	}

	/// Creates an error about receiving the wrong amount of arguments.
	#[must_use]
	pub fn bad_argument_count(expected: usize, found: usize) -> Self {
		MacroErrorKind::BadArgumentCount { expected, found }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[allow(missing_docs)]
/// A kind of error that can occur when a macro is applied.
pub enum MacroErrorKind {
	/// The wrong amount of arguments was supplied.
	#[error("expected {expected} arguments, found {found}")]
	BadArgumentCount { expected: usize, found: usize },
	/// An error was raised by the macro itself.
	#[error("{message}")]
	User { message: String },
}

/// An error that aborts interpolation. No partially expanded text is returned alongside it.
#[derive(Debug, Error)]
pub enum InterpolationError {
	/// A macro name could not be turned into a pattern.
	#[error("invalid macro name {name}: {source}")]
	Pattern {
		/// The offending name.
		name: String,
		/// Why the pattern was rejected.
		#[source]
		source: regex::Error,
	},
	/// A macro failed to expand.
	#[error(transparent)]
	Macro(#[from] MacroError),
}

/// A trait dictating an object as usable as a macro.
///
/// Macros are shared between concurrent interpolations, so they must not hold mutable state.
/// Any `Fn(&Query, &[&str]) -> Result<String, MacroErrorKind>` is a macro.
pub trait Macro: Send + Sync {
	/// Expands one invocation.
	///
	/// `arguments` always holds at least one element. A macro invoked without parentheses,
	/// or with empty ones, receives a single empty argument.
	///
	/// # Errors
	/// If the macro fails to apply, an error will be raised, aborting interpolation.
	fn apply(&self, query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind>;
}

impl<F> Macro for F
where
	F: Fn(&Query, &[&str]) -> Result<String, MacroErrorKind> + Send + Sync,
{
	fn apply(&self, query: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
		self(query, arguments)
	}
}

/// Expands macros in queries using a fixed set of macros.
///
/// ```
/// use sqlmacro::{Interpolator, Macros, MacroErrorKind, Query};
///
/// let mut macros = Macros::new();
/// macros.insert_fn("schema", |_: &Query, _: &[&str]| Ok::<_, MacroErrorKind>("public".to_string()));
/// let interpolator = Interpolator::with_macros(macros);
/// let query = Query::new("select * from $__schema.events").with_table("events");
/// assert_eq!(interpolator.interpolate(&query).unwrap(), "select * from public.events");
/// ```
#[derive(Debug, Default)]
pub struct Interpolator {
	macros: Macros,
}

impl Interpolator {
	/// Creates an interpolator with the default macros, overridden and extended by the driver's.
	#[must_use]
	pub fn new(driver: &(impl MacroProvider + ?Sized)) -> Self {
		Self::with_macros(Macros::merged(stdlib::default_macros(), driver.macros()))
	}

	/// Creates an interpolator that uses exactly the given macros.
	#[must_use]
	pub fn with_macros(macros: Macros) -> Self {
		Self { macros }
	}

	/// The macros this interpolator expands, in the order they are applied.
	#[must_use]
	pub fn macros(&self) -> &Macros {
		&self.macros
	}

	/// Expands every macro invocation in the query's template text.
	///
	/// Macros are applied one name at a time, in registry order, each across the whole of the
	/// current text. Text produced by one macro is never rescanned for that same macro,
	/// but macros later in the order will see it.
	///
	/// # Errors
	/// Errors on the first macro that fails, or if a macro name does not form a valid pattern.
	pub fn interpolate(&self, query: &Query) -> Result<String, InterpolationError> {
		let mut working = query.clone();
		for (name, mac) in self.macros.iter() {
			let current = working.raw_sql.clone();
			let invocations = parsing::find_invocations(name, &current)
				.map_err(|source| {
					debug!(macro_name = name, error = %source, "Macro name is not a valid pattern");
					InterpolationError::Pattern { name: name.to_string(), source }
				})?;
			if invocations.is_empty() { continue }
			debug!(macro_name = name, count = invocations.len(), "Expanding macro");
			for invocation in invocations {
				let arguments = invocation.split_arguments();
				let replacement = mac.apply(&working, &arguments).map_err(|kind| {
					let err = MacroError::new(name, invocation.text, kind);
					debug!(error = %err, "Interpolation aborted");
					err
				})?;
				trace!(invocation = invocation.text, replacement = %replacement, "Substituting");
				working.raw_sql = working.raw_sql.replace(invocation.text, &replacement);
			}
		}
		Ok(working.raw_sql)
	}
}

/// Expands all macros in the query, using the default macros overridden by the driver's.
///
/// Pass `&()` to use only the defaults.
///
/// # Errors
/// Errors if any macro fails to expand. See [`Interpolator::interpolate`].
pub fn interpolate(driver: &(impl MacroProvider + ?Sized), query: &Query) -> Result<String, InterpolationError> {
	Interpolator::new(driver).interpolate(query)
}

#[cfg(test)]
mod test {
	use crate::execution::*;
	use pretty_assertions::assert_eq;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	fn echo(_: &Query, arguments: &[&str]) -> Result<String, MacroErrorKind> {
		Ok(arguments.join("|"))
	}

	#[test]
	fn empty_registry_test() {
		let query = Query::new("select $__anything(1) from t");
		assert_eq!(Interpolator::default().interpolate(&query).unwrap(), "select $__anything(1) from t");
	}

	#[test]
	fn arguments_test() {
		let interpolator = Interpolator::with_macros(Macros::new().with_fn("echo", echo));
		let query = Query::new("$__echo() / $__echo( a , b ) / $__echo(f(x, y)) / $__echo");
		assert_eq!(interpolator.interpolate(&query).unwrap(), " / a|b / f(x, y) / ");
	}

	#[test]
	fn invoked_per_match_test() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let interpolator = Interpolator::with_macros(Macros::new().with_fn("n", move |_: &Query, _: &[&str]| {
			Ok::<_, MacroErrorKind>(counter.fetch_add(1, Ordering::SeqCst).to_string())
		}));
		// The second match has already been replaced by the first call.
		let out = interpolator.interpolate(&Query::new("$__n(a) $__n(a) $__n(b)")).unwrap();
		assert_eq!(out, "0 0 2");
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn no_self_rescan_test() {
		let interpolator = Interpolator::with_macros(Macros::new().with_fn("again", |_: &Query, _: &[&str]| {
			Ok::<_, MacroErrorKind>("$__again".to_string())
		}));
		assert_eq!(interpolator.interpolate(&Query::new("x $__again")).unwrap(), "x $__again");
	}

	#[test]
	fn later_macro_sees_output_test() {
		let macros = Macros::new()
			.with_fn("outer", |_: &Query, _: &[&str]| Ok::<_, MacroErrorKind>("$__inner(1)".to_string()))
			.with_fn("inner", |_: &Query, args: &[&str]| Ok::<_, MacroErrorKind>(format!("<{}>", args[0])));
		let interpolator = Interpolator::with_macros(macros);
		assert_eq!(interpolator.interpolate(&Query::new("$__outer")).unwrap(), "<1>");

		let reversed = Macros::new()
			.with_fn("inner", |_: &Query, args: &[&str]| Ok::<_, MacroErrorKind>(format!("<{}>", args[0])))
			.with_fn("outer", |_: &Query, _: &[&str]| Ok::<_, MacroErrorKind>("$__inner(1)".to_string()));
		assert_eq!(Interpolator::with_macros(reversed).interpolate(&Query::new("$__outer")).unwrap(), "$__inner(1)");
	}

	#[test]
	fn working_text_test() {
		let macros = Macros::new()
			.with_fn("a", |_: &Query, _: &[&str]| Ok::<_, MacroErrorKind>("A".to_string()))
			.with_fn("sql", |query: &Query, _: &[&str]| Ok::<_, MacroErrorKind>(query.raw_sql.len().to_string()));
		let out = Interpolator::with_macros(macros).interpolate(&Query::new("$__a $__sql")).unwrap();
		assert_eq!(out, "A 8");
	}

	#[test]
	fn error_test() {
		let macros = Macros::new()
			.with_fn("ok", |_: &Query, _: &[&str]| Ok::<_, MacroErrorKind>("fine".to_string()))
			.with_fn("fail", |_: &Query, args: &[&str]| Err(MacroErrorKind::user(format!("bad {}", args[0]))));
		let err = Interpolator::with_macros(macros).interpolate(&Query::new("$__ok $__fail(x)")).unwrap_err();
		let err = match err {
			InterpolationError::Macro(err) => err,
			other => panic!("expected a macro error, got {other:?}"),
		};
		assert_eq!(err, MacroError::new("fail", "$__fail(x)", MacroErrorKind::user("bad x")));
		assert_eq!(err.to_string(), "error in macro fail at `$__fail(x)`: bad x");
	}

	#[test]
	fn pattern_error_test() {
		let interpolator = Interpolator::with_macros(Macros::new().with_fn("bad(", echo));
		let err = interpolator.interpolate(&Query::new("$__bad(")).unwrap_err();
		assert!(matches!(err, InterpolationError::Pattern { ref name, .. } if name == "bad("));
	}
}
