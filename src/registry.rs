//! The ordered set of macros an interpolation draws from.

use crate::execution::{Macro, MacroErrorKind};
use crate::query::Query;
use indexmap::IndexMap;
use std::fmt;

/// A mapping from macro name to macro, kept in insertion order.
///
/// Names are case-sensitive and written without the `$__` prefix.
/// Replacing a macro keeps the position of the name it replaces.
#[derive(Default)]
pub struct Macros {
	inner: IndexMap<String, Box<dyn Macro>>,
}

impl Macros {
	/// Creates an empty registry.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Merges two registries. Every entry of `defaults` is kept,
	/// except where `overrides` has the same name, in which case the override wins.
	/// Names only in `overrides` are appended after the defaults.
	#[must_use]
	pub fn merged(defaults: Macros, overrides: Macros) -> Self {
		let mut merged = defaults;
		merged.inner.extend(overrides.inner);
		merged
	}

	/// Adds a macro, returning the one it replaced.
	pub fn insert(&mut self, name: impl Into<String>, mac: impl Macro + 'static) -> Option<Box<dyn Macro>> {
		self.inner.insert(name.into(), Box::new(mac))
	}

	/// Adds a closure as a macro, returning the one it replaced.
	pub fn insert_fn<F>(&mut self, name: impl Into<String>, mac: F) -> Option<Box<dyn Macro>>
	where
		F: Fn(&Query, &[&str]) -> Result<String, MacroErrorKind> + Send + Sync + 'static,
	{
		self.insert(name, mac)
	}

	/// Builder form of [`Macros::insert`].
	#[must_use]
	pub fn with(mut self, name: impl Into<String>, mac: impl Macro + 'static) -> Self {
		self.insert(name, mac);
		self
	}

	/// Builder form of [`Macros::insert_fn`].
	#[must_use]
	pub fn with_fn<F>(mut self, name: impl Into<String>, mac: F) -> Self
	where
		F: Fn(&Query, &[&str]) -> Result<String, MacroErrorKind> + Send + Sync + 'static,
	{
		self.insert_fn(name, mac);
		self
	}

	/// Gets a macro by name.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&dyn Macro> {
		self.inner.get(name).map(|mac| &**mac)
	}

	/// Whether a macro with this name exists.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.inner.contains_key(name)
	}

	/// The macro names, in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.inner.keys().map(String::as_str)
	}

	/// The macros and their names, in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Macro)> {
		self.inner.iter().map(|(name, mac)| (name.as_str(), &**mac))
	}

	/// The amount of macros.
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Whether there are no macros.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl fmt::Debug for Macros {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.names()).finish()
	}
}
