// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! The query facade: classify free-form input and compile it.
//!
//! Anything a user types in a search box becomes a predicate. Input that
//! parses as a full terse expression is used as written; a single bare value
//! is matched against the default search tags; everything else is treated as
//! free text, one conjunct per word. Only input that fits none of those and
//! still contains query machinery (`#` or `=`) is invalid, and even then the
//! lenient constructor degrades to a predicate that matches nothing.

use quaver_predicate::{Predicate, Record};

use crate::{
	error::QueryError,
	lex::{TokenKind, tokenize},
	parse::parse,
};

/// Tags searched when a query names none.
pub const DEFAULT_STAR: &[&str] = &["artist", "album", "title"];

/// How the raw input was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
	/// Free text, matched word by word against the star tags.
	Text,
	/// A single bare value, matched against the star tags.
	Value,
	/// A full query expression.
	Normal,
}

/// A compiled search query.
#[derive(Debug, Clone)]
pub struct Query {
	raw: String,
	predicate: Predicate,
	class: Classification,
	valid: bool,
}

impl Query {
	/// Compile `raw`, raising on any lex or parse failure.
	pub fn try_new(raw: &str, star: &[&str]) -> Result<Query, QueryError> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return Ok(Query {
				raw: raw.to_string(),
				predicate: Predicate::True,
				class: Classification::Text,
				valid: true,
			});
		}

		let err = match parse(trimmed) {
			Ok(predicate) => {
				return Ok(Query {
					raw: raw.to_string(),
					predicate,
					class: Classification::Normal,
					valid: true,
				});
			}
			Err(err) => err,
		};

		let stripped = trimmed.trim_start_matches('!');
		let negations = trimmed.len() - stripped.len();
		if !stripped.is_empty() && is_single_value(stripped, negations > 0) {
			let rewritten = format!("{}={}", star.join(","), stripped);
			let mut predicate = parse(&rewritten)?;
			if negations % 2 == 1 {
				predicate = Predicate::Neg(Box::new(predicate));
			}
			return Ok(Query {
				raw: raw.to_string(),
				predicate,
				class: Classification::Value,
				valid: true,
			});
		}

		if !trimmed.contains('#') && !trimmed.contains('=') {
			let predicate = parse(&rewrite_text(trimmed, star))?;
			return Ok(Query {
				raw: raw.to_string(),
				predicate,
				class: Classification::Text,
				valid: true,
			});
		}

		Err(err)
	}

	/// Compile `raw`; a failing query matches nothing instead of raising.
	pub fn new(raw: &str, star: &[&str]) -> Query {
		match Query::try_new(raw, star) {
			Ok(query) => query,
			Err(err) => {
				tracing::debug!(query = raw, error = %err, "query failed to parse, matching nothing");
				Query {
					raw: raw.to_string(),
					predicate: Predicate::False,
					class: Classification::Text,
					valid: false,
				}
			}
		}
	}

	/// Whether `raw` is accepted by the full classify-and-parse pipeline.
	/// Never raises and never panics.
	pub fn is_parsable(raw: &str, star: &[&str]) -> bool {
		Query::try_new(raw, star).is_ok()
	}

	/// Whether `raw` is empty or a full terse expression, with no value or
	/// free-text fallback. Never raises and never panics.
	pub fn is_valid_expression(raw: &str) -> bool {
		let trimmed = raw.trim();
		trimmed.is_empty() || parse(trimmed).is_ok()
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn predicate(&self) -> &Predicate {
		&self.predicate
	}

	pub fn classification(&self) -> Classification {
		self.class
	}

	pub fn is_valid(&self) -> bool {
		self.valid
	}

	pub fn matches_all(&self) -> bool {
		self.predicate.matches_all()
	}

	pub fn search(&self, record: &impl Record) -> bool {
		self.predicate.search(record)
	}

	pub fn filter<'a, R, I>(&self, records: I) -> Vec<&'a R>
	where
		R: Record + 'a,
		I: IntoIterator<Item = &'a R>,
	{
		self.predicate.filter(records)
	}
}

/// A single value is one regex literal (optionally trailed by its modifier
/// run, which lexes as a tag token) or one tag token, with nothing else
/// before the end of input. An unnegated tag token must be free of inner
/// whitespace; under a leading `!` a multi-word value is accepted.
fn is_single_value(text: &str, negated: bool) -> bool {
	let Ok(tokens) = tokenize(text) else {
		return false;
	};
	match tokens.len() {
		2 => match tokens[0].kind {
			TokenKind::Regex => true,
			TokenKind::Tag => negated || !tokens[0].text.chars().any(char::is_whitespace),
			_ => false,
		},
		3 => {
			tokens[0].kind == TokenKind::Regex
				&& tokens[1].kind == TokenKind::Tag
				&& tokens[1].text.to_ascii_lowercase().chars().all(|c| "cisl".contains(c))
		}
		_ => false,
	}
}

/// Rewrite free text into a conjunction of per-word star searches.
fn rewrite_text(text: &str, star: &[&str]) -> String {
	let names = star.join(",");
	let terms: Vec<String> = text.split_whitespace().map(|word| format!("{names}=/{}/", escape_word(word))).collect();
	format!("&({})", terms.join(","))
}

/// Escape a word so the rewritten query re-lexes: `regex::escape` leaves `/`
/// alone, which would end the regex literal early.
fn escape_word(word: &str) -> String {
	regex::escape(word).replace('/', "\\/")
}

#[cfg(test)]
mod tests {
	use quaver_predicate::MemoryRecord;

	use super::*;

	fn query(raw: &str) -> Query {
		let query = Query::new(raw, DEFAULT_STAR);
		assert!(query.is_valid(), "{raw} should parse");
		query
	}

	fn song() -> MemoryRecord {
		MemoryRecord::new()
			.with_value("artist", "Miles Davis")
			.with_value("album", "Kind of Blue")
			.with_value("title", "So What")
			.with_numeric("length", 540.0)
	}

	#[test]
	fn test_empty_matches_all() {
		for raw in ["", "   ", "\t\n"] {
			let query = query(raw);
			assert_eq!(query.classification(), Classification::Text);
			assert!(query.matches_all());
			assert!(query.search(&song()));
		}
	}

	#[test]
	fn test_full_expression_is_normal() {
		let query = query("artist=davis");
		assert_eq!(query.classification(), Classification::Normal);
		assert!(query.search(&song()));
	}

	#[test]
	fn test_single_word_is_value() {
		let query = query("davis");
		assert_eq!(query.classification(), Classification::Value);
		assert!(query.search(&song()));
		assert!(!query.search(&MemoryRecord::new().with_value("artist", "John Coltrane")));
	}

	#[test]
	fn test_value_searches_all_star_tags() {
		assert!(query("blue").search(&song()));
		assert!(query("what").search(&song()));
	}

	#[test]
	fn test_bare_regex_is_value() {
		let query = query("/^Mil.s/");
		assert_eq!(query.classification(), Classification::Value);
		assert!(query.search(&song()));
	}

	#[test]
	fn test_bare_regex_with_flags_is_value() {
		let sensitive = query("/Mil.s/c");
		assert_eq!(sensitive.classification(), Classification::Value);
		assert!(sensitive.search(&song()));
		// the case-sensitive flag is applied, not matched as text
		assert!(!query("/mil.s/c").search(&song()));
	}

	#[test]
	fn test_bare_regex_with_bad_flags_falls_back_to_text() {
		let query = query("/Mil.s/z");
		assert_eq!(query.classification(), Classification::Text);
		assert!(!query.search(&song()));
	}

	#[test]
	fn test_negated_multi_word_value() {
		let query = query("!miles davis");
		assert_eq!(query.classification(), Classification::Value);
		assert!(!query.search(&song()));
		assert!(query.search(&MemoryRecord::new().with_value("artist", "John Coltrane")));
	}

	#[test]
	fn test_negated_value() {
		let query = query("!davis");
		assert_eq!(query.classification(), Classification::Value);
		assert!(!query.search(&song()));
		assert!(query.search(&MemoryRecord::new().with_value("artist", "John Coltrane")));
	}

	#[test]
	fn test_double_negation_cancels() {
		let query = query("!!davis");
		assert_eq!(query.classification(), Classification::Value);
		assert!(query.search(&song()));
	}

	#[test]
	fn test_multiple_words_are_text() {
		let query = query("miles davis");
		assert_eq!(query.classification(), Classification::Text);
		assert!(query.search(&song()));
	}

	#[test]
	fn test_text_words_conjoin() {
		// both words must match, in any star tag
		assert!(query("davis what").search(&song()));
		assert!(!query("davis coltrane").search(&song()));
	}

	#[test]
	fn test_text_with_slash_survives_rewrite() {
		let record = MemoryRecord::new().with_value("artist", "AC/DC").with_value("title", "Thunderstruck");
		assert!(query("ac/dc thunder").search(&record));
	}

	#[test]
	fn test_broken_expression_is_invalid() {
		let query = Query::new("artist=", DEFAULT_STAR);
		assert!(!query.is_valid());
		assert!(!query.search(&song()));
	}

	#[test]
	fn test_validators_are_total() {
		for raw in ["", "!", "#(", "&(,)", ")(", "~#length=x", "a=/b", "\"", "#(x > )"] {
			// no panic, any answer
			Query::is_parsable(raw, DEFAULT_STAR);
			Query::is_valid_expression(raw);
		}
	}

	#[test]
	fn test_is_valid_expression_is_strict() {
		assert!(Query::is_valid_expression(""));
		assert!(Query::is_valid_expression("artist=davis"));
		assert!(!Query::is_valid_expression("davis"));
		assert!(Query::is_parsable("davis", DEFAULT_STAR));
	}

	#[test]
	fn test_raw_is_preserved() {
		assert_eq!(query("  davis ").raw(), "  davis ");
	}
}
