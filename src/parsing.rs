//! Handles finding macro invocations in a template and splitting their arguments.

use regex::Regex;

/// A single occurrence of a macro in a template.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Default)]
pub struct Invocation<'source> {
	/// The whole matched text, from `$__` up to and including the closing parenthesis, if any.
	pub text: &'source str,
	/// The text between the parentheses. Empty if the macro was invoked without them.
	pub arguments: &'source str,
}

impl<'source> Invocation<'source> {
	/// Splits the argument text of this invocation. See [`split_arguments`].
	#[must_use]
	pub fn split_arguments(&self) -> Vec<&'source str> {
		split_arguments(self.arguments)
	}
}

/// Builds the pattern source that matches invocations of the macro `name`.
///
/// The name must be followed by a word boundary, so `timeFilter` never matches
/// inside `$__timeFilterEpoch`. Arguments are captured non-greedily up to the first `)`,
/// allowing one nested call that closes right before the invocation does.
///
/// `\b` is Unicode-aware, so a name followed by a non-ASCII letter (`$__tableé`)
/// is not an invocation of that name.
///
/// The name is not escaped.
#[must_use]
pub fn macro_pattern(name: &str) -> String {
	format!(r"\$__{name}\b(?:\((.*?\)?)\))?")
}

/// Finds every invocation of the macro `name` in `source`, from left to right.
///
/// # Errors
/// Errors if `name` does not produce a valid pattern.
pub fn find_invocations<'source>(name: &str, source: &'source str) -> Result<Vec<Invocation<'source>>, regex::Error> {
	let regex = Regex::new(&macro_pattern(name))?;
	Ok(regex.captures_iter(source).map(|captures| Invocation {
		text: captures.get(0).map_or("", |whole| whole.as_str()),
		arguments: captures.get(1).map_or("", |inner| inner.as_str()),
	}).collect())
}

/// Splits raw argument text on top-level commas and trims each piece.
///
/// Commas nested inside parentheses do not split. Quotes are not special, so a comma
/// inside a string literal still splits.
/// An empty input gives a single empty argument.
#[must_use]
pub fn split_arguments(raw: &str) -> Vec<&str> {
	let mut arguments = Vec::new();
	let mut depth = 0usize;
	let mut old_start = 0usize;
	for (idx, chr) in raw.char_indices() {
		match chr {
			'(' => depth += 1,
			')' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				arguments.push(raw[old_start .. idx].trim());
				old_start = idx + 1;
			},
			_ => {}
		}
	}
	arguments.push(raw[old_start ..].trim());
	arguments
}
