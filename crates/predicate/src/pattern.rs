// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use std::fmt::{Display, Formatter};

use regex::{Regex, RegexBuilder};

/// Errors raised while compiling a tag pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	#[error("the regular expression /{pattern}/ is invalid")]
	Invalid { pattern: String },

	#[error("invalid regular expression flags: {flags:?}")]
	InvalidFlags { flags: String },
}

/// A compiled regular expression together with the source text and modifier
/// string it was built from.
///
/// Modifier letters follow the query grammar: `c` makes the match
/// case-sensitive, `i` forces it back to case-insensitive, `s` lets `.` match
/// newlines and `l` requests locale-aware case folding. Matching is
/// case-insensitive and multi-line unless modifiers say otherwise.
///
/// Known deviation: the `regex` crate has no locale-dependent case folding,
/// so `l` is accepted and ignored; Unicode simple case folding is always
/// used instead.
#[derive(Debug, Clone)]
pub struct Pattern {
	source: String,
	mods: String,
	regex: Regex,
}

impl Pattern {
	/// Compile `source` with the given modifier string.
	///
	/// Any modifier letter outside `cisl` is rejected.
	pub fn compile(source: &str, mods: &str) -> Result<Pattern, PatternError> {
		let mods = mods.to_ascii_lowercase();
		if mods.chars().any(|c| !"cisl".contains(c)) {
			return Err(PatternError::InvalidFlags {
				flags: mods,
			});
		}

		let mut ignore_case = true;
		if mods.contains('c') {
			ignore_case = false;
		}
		if mods.contains('i') {
			ignore_case = true;
		}

		let regex = RegexBuilder::new(source)
			.case_insensitive(ignore_case)
			.multi_line(true)
			.dot_matches_new_line(mods.contains('s'))
			.build()
			.map_err(|_| PatternError::Invalid {
				pattern: source.to_string(),
			})?;

		Ok(Pattern {
			source: source.to_string(),
			mods,
			regex,
		})
	}

	/// A case-insensitive partial match of the literal text, used for bare
	/// values (`artist=davis` matches "Miles Davis").
	pub fn literal(text: &str) -> Result<Pattern, PatternError> {
		let escaped = regex::escape(text);
		let regex = RegexBuilder::new(&escaped).case_insensitive(true).build().map_err(|_| {
			PatternError::Invalid {
				pattern: escaped.clone(),
			}
		})?;

		Ok(Pattern {
			source: escaped,
			mods: String::new(),
			regex,
		})
	}

	/// Whether the pattern matches anywhere in `value`.
	pub fn is_match(&self, value: &str) -> bool {
		self.regex.is_match(value)
	}

	/// The regex source this pattern was compiled from.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	pub fn mods(&self) -> &str {
		&self.mods
	}
}

// The compiled regex is a pure function of source and modifiers.
impl PartialEq for Pattern {
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source && self.mods == other.mods
	}
}

impl Eq for Pattern {}

impl Display for Pattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "/{}/{}", self.source, self.mods)
	}
}
