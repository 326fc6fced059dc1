// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! SQL-like query front-end.
//!
//! A friendlier surface over the same predicates: `artist = davis AND genre
//! IN [jazz, bop] LIMIT 2 hours`. Clauses chain with `AND` / `OR`
//! (right-associative) or plain adjacency, which conjoins. A trailing
//! `LIMIT` clause is carried beside the predicate, never inside it.
//!
//! Numeric comparisons need the tag to be known numeric, either through the
//! `~#` marker (`~#bpm > 120`) or by membership in the numeric-tag set given
//! to the constructor.

mod token;

use quaver_predicate::{Pattern, Predicate, Record, RelOp};

use self::token::{Keyword, MqlToken};
use crate::{
	error::{NumericError, ParseError, QueryError},
	numeric::parse_numeric,
};

/// Tags treated as numeric without an explicit `~#` marker.
pub const DEFAULT_NUMERIC_TAGS: &[&str] = &[
	"length",
	"rating",
	"playcount",
	"skipcount",
	"year",
	"track",
	"disc",
	"bitrate",
	"filesize",
	"added",
	"mtime",
	"lastplayed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitUnit {
	Songs,
	Kilobytes,
	Megabytes,
	Gigabytes,
	Minutes,
	Hours,
}

/// A cap on the result aggregate, carried beside the predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
	pub amount: f64,
	pub unit: LimitUnit,
}

impl Limit {
	/// The amount in the aggregate's native unit: a count for songs,
	/// bytes for sizes, seconds for durations.
	pub fn native(&self) -> f64 {
		match self.unit {
			LimitUnit::Songs => self.amount,
			LimitUnit::Kilobytes => self.amount * 1024.0,
			LimitUnit::Megabytes => self.amount * 1024.0 * 1024.0,
			LimitUnit::Gigabytes => self.amount * 1024.0 * 1024.0 * 1024.0,
			LimitUnit::Minutes => self.amount * 60.0,
			LimitUnit::Hours => self.amount * 3600.0,
		}
	}
}

/// A compiled SQL-like query.
#[derive(Debug, Clone)]
pub struct Mql {
	raw: String,
	predicate: Predicate,
	limit: Option<Limit>,
	valid: bool,
}

impl Mql {
	/// Compile `raw`, raising on any lex or parse failure. Bare search
	/// terms match against the tags in `star`.
	pub fn try_new(raw: &str, star: &[&str], numeric_tags: &[&str]) -> Result<Mql, QueryError> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return Ok(Mql {
				raw: raw.to_string(),
				predicate: Predicate::True,
				limit: None,
				valid: true,
			});
		}

		let tokens = token::tokenize(trimmed)?;
		let mut parser = MqlParser::new(tokens, star, numeric_tags);
		let (predicate, limit) = parser.parse()?;
		Ok(Mql {
			raw: raw.to_string(),
			predicate,
			limit,
			valid: true,
		})
	}

	/// Compile `raw`; a failing query matches nothing instead of raising.
	pub fn new(raw: &str, star: &[&str], numeric_tags: &[&str]) -> Mql {
		match Mql::try_new(raw, star, numeric_tags) {
			Ok(query) => query,
			Err(err) => {
				tracing::debug!(query = raw, error = %err, "mql query failed to parse, matching nothing");
				Mql {
					raw: raw.to_string(),
					predicate: Predicate::False,
					limit: None,
					valid: false,
				}
			}
		}
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn predicate(&self) -> &Predicate {
		&self.predicate
	}

	pub fn limit(&self) -> Option<Limit> {
		self.limit
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

struct MqlParser<'a> {
	tokens: Vec<MqlToken>,
	position: usize,
	star: &'a [&'a str],
	numeric_tags: &'a [&'a str],
}

impl<'a> MqlParser<'a> {
	fn new(mut tokens: Vec<MqlToken>, star: &'a [&'a str], numeric_tags: &'a [&'a str]) -> Self {
		if tokens.last() != Some(&MqlToken::Eof) {
			tokens.push(MqlToken::Eof);
		}
		Self {
			tokens,
			position: 0,
			star,
			numeric_tags,
		}
	}

	fn current(&self) -> &MqlToken {
		// new() guarantees a trailing Eof token
		&self.tokens[self.position.min(self.tokens.len() - 1)]
	}

	fn advance(&mut self) -> MqlToken {
		let token = self.current().clone();
		if token != MqlToken::Eof {
			self.position += 1;
		}
		token
	}

	fn consume(&mut self, expected: MqlToken) -> Result<(), ParseError> {
		if *self.current() == expected {
			self.advance();
			return Ok(());
		}
		if *self.current() == MqlToken::Eof {
			return Err(ParseError::UnexpectedEof);
		}
		Err(ParseError::UnexpectedToken {
			expected: expected.describe(),
			found: self.current().describe(),
		})
	}

	fn eat_keyword(&mut self, keyword: Keyword) -> bool {
		if *self.current() == MqlToken::Keyword(keyword) {
			self.advance();
			return true;
		}
		false
	}

	fn parse(&mut self) -> Result<(Predicate, Option<Limit>), ParseError> {
		// the predicate part may be empty, leaving only a limit
		let predicate = if *self.current() == MqlToken::Keyword(Keyword::Limit) {
			Predicate::True
		} else {
			self.parse_expr()?
		};
		let limit = if self.eat_keyword(Keyword::Limit) {
			Some(self.parse_limit()?)
		} else {
			None
		};
		match self.current() {
			MqlToken::Eof => Ok((predicate, limit)),
			other => Err(ParseError::UnexpectedToken {
				expected: "end of query".to_string(),
				found: other.describe(),
			}),
		}
	}

	fn parse_expr(&mut self) -> Result<Predicate, ParseError> {
		let left = self.parse_clause()?;
		if self.eat_keyword(Keyword::And) {
			return Ok(Predicate::Inter(vec![left, self.parse_expr()?]));
		}
		if self.eat_keyword(Keyword::Or) {
			return Ok(Predicate::Union(vec![left, self.parse_expr()?]));
		}
		// adjacent clauses without a connective conjoin
		if self.starts_clause() {
			return Ok(Predicate::Inter(vec![left, self.parse_expr()?]));
		}
		Ok(left)
	}

	fn starts_clause(&self) -> bool {
		matches!(
			self.current(),
			MqlToken::Word(_)
				| MqlToken::Number(_)
				| MqlToken::Quoted(_)
				| MqlToken::Regex { .. }
				| MqlToken::Bang
				| MqlToken::OpenParen
		)
	}

	fn parse_clause(&mut self) -> Result<Predicate, ParseError> {
		match self.current().clone() {
			MqlToken::OpenParen => {
				self.advance();
				let inner = self.parse_expr()?;
				self.consume(MqlToken::CloseParen)?;
				Ok(inner)
			}
			MqlToken::Bang => {
				self.advance();
				let tag = match self.advance() {
					MqlToken::Word(word) => word.to_ascii_lowercase(),
					MqlToken::Eof => return Err(ParseError::UnexpectedEof),
					other => {
						return Err(ParseError::UnexpectedToken {
							expected: "a tag name".to_string(),
							found: other.describe(),
						});
					}
				};
				// matches records with no non-empty value for the tag
				Ok(Predicate::Neg(Box::new(Predicate::Tag {
					names: vec![tag],
					pattern: Pattern::compile(".", "")?,
				})))
			}
			MqlToken::Quoted(body) => {
				self.advance();
				Ok(self.star_tag(anchored(&body)?))
			}
			MqlToken::Regex {
				body,
				mods,
			} => {
				self.advance();
				Ok(self.star_tag(Pattern::compile(&body, &mods)?))
			}
			MqlToken::Number(text) => {
				self.advance();
				Ok(self.star_tag(Pattern::literal(&text)?))
			}
			MqlToken::Word(word) => {
				self.advance();
				self.parse_tagged(word)
			}
			other => Err(ParseError::UnexpectedToken {
				expected: "a search clause".to_string(),
				found: other.describe(),
			}),
		}
	}

	fn parse_tagged(&mut self, word: String) -> Result<Predicate, ParseError> {
		// tag names are caseless; search terms keep their spelling
		let lowered = word.to_ascii_lowercase();
		let tag = lowered.strip_prefix("~#").unwrap_or(&lowered).to_string();
		let numeric = lowered.starts_with("~#") || self.numeric_tags.iter().any(|t| t.eq_ignore_ascii_case(&tag));

		match self.current().clone() {
			MqlToken::Relop(op) => {
				self.advance();
				if !numeric {
					return Err(ParseError::NotNumeric {
						tag,
					});
				}
				let value = self.parse_numeric_value()?;
				Ok(Predicate::Numcmp {
					tag,
					op,
					value,
				})
			}
			MqlToken::Equals => {
				self.advance();
				if numeric {
					let value = self.parse_numeric_value()?;
					return Ok(Predicate::Numcmp {
						tag,
						op: RelOp::Eq,
						value,
					});
				}
				let matched = Predicate::Tag {
					names: vec![tag.clone()],
					pattern: self.parse_match_value()?,
				};
				if self.eat_keyword(Keyword::But) {
					self.consume(MqlToken::Keyword(Keyword::Not))?;
					let excluded = self.parse_match_value()?;
					return Ok(Predicate::Inter(vec![
						matched,
						Predicate::Neg(Box::new(Predicate::Tag {
							names: vec![tag],
							pattern: excluded,
						})),
					]));
				}
				Ok(matched)
			}
			MqlToken::NotEquals => {
				self.advance();
				if numeric {
					let value = self.parse_numeric_value()?;
					return Ok(Predicate::Numcmp {
						tag,
						op: RelOp::Ne,
						value,
					});
				}
				Ok(Predicate::Neg(Box::new(Predicate::Tag {
					names: vec![tag],
					pattern: self.parse_match_value()?,
				})))
			}
			MqlToken::Keyword(Keyword::In) => {
				self.advance();
				self.parse_in_list(tag)
			}
			// bare search term over the star set
			_ => Ok(self.star_tag(Pattern::literal(&word)?)),
		}
	}

	fn star_tag(&self, pattern: Pattern) -> Predicate {
		Predicate::Tag {
			names: self.star.iter().map(|name| name.to_string()).collect(),
			pattern,
		}
	}

	fn parse_in_list(&mut self, tag: String) -> Result<Predicate, ParseError> {
		self.consume(MqlToken::OpenBracket)?;
		let mut children = Vec::new();
		if *self.current() != MqlToken::CloseBracket {
			loop {
				children.push(Predicate::Tag {
					names: vec![tag.clone()],
					pattern: self.parse_match_value()?,
				});
				if *self.current() == MqlToken::Comma {
					self.advance();
					continue;
				}
				break;
			}
		}
		self.consume(MqlToken::CloseBracket)?;

		if children.is_empty() {
			return Ok(Predicate::False);
		}
		if children.len() == 1 {
			if let Some(only) = children.pop() {
				return Ok(only);
			}
		}
		Ok(Predicate::Union(children))
	}

	fn parse_match_value(&mut self) -> Result<Pattern, ParseError> {
		match self.advance() {
			MqlToken::Word(word) => Ok(Pattern::literal(&word)?),
			MqlToken::Number(text) => Ok(Pattern::literal(&text)?),
			MqlToken::Quoted(body) => anchored(&body),
			MqlToken::Regex {
				body,
				mods,
			} => Ok(Pattern::compile(&body, &mods)?),
			MqlToken::Eof => Err(ParseError::UnexpectedEof),
			other => Err(ParseError::UnexpectedToken {
				expected: "a match value".to_string(),
				found: other.describe(),
			}),
		}
	}

	fn parse_numeric_value(&mut self) -> Result<f64, ParseError> {
		let text = match self.advance() {
			MqlToken::Number(text) => text,
			MqlToken::Word(word) => word,
			MqlToken::Quoted(body) => body,
			MqlToken::Eof => return Err(ParseError::UnexpectedEof),
			other => {
				return Err(ParseError::UnexpectedToken {
					expected: "a numeric value".to_string(),
					found: other.describe(),
				});
			}
		};
		Ok(parse_numeric(&text)?)
	}

	fn parse_limit(&mut self) -> Result<Limit, ParseError> {
		let (amount, fused_unit) = match self.advance() {
			MqlToken::Number(text) => {
				let amount = text.parse::<f64>().map_err(|_| {
					ParseError::Numeric(NumericError::Malformed {
						text: text.clone(),
					})
				})?;
				(amount, None)
			}
			// unit fused to the number, e.g. `80mb`
			MqlToken::Word(word) => {
				let split = word.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(word.len());
				let (number, unit) = word.split_at(split);
				let amount = number.parse::<f64>().map_err(|_| {
					ParseError::Numeric(NumericError::Malformed {
						text: word.clone(),
					})
				})?;
				(amount, Some(limit_unit(unit)?))
			}
			MqlToken::Eof => return Err(ParseError::UnexpectedEof),
			other => {
				return Err(ParseError::UnexpectedToken {
					expected: "a limit amount".to_string(),
					found: other.describe(),
				});
			}
		};

		let unit = match fused_unit {
			Some(unit) => unit,
			None => match self.current().clone() {
				MqlToken::Word(word) => {
					let unit = limit_unit(&word)?;
					self.advance();
					unit
				}
				_ => LimitUnit::Songs,
			},
		};

		Ok(Limit {
			amount,
			unit,
		})
	}
}

fn limit_unit(text: &str) -> Result<LimitUnit, ParseError> {
	match text.to_ascii_lowercase().as_str() {
		"song" | "songs" => Ok(LimitUnit::Songs),
		"kb" => Ok(LimitUnit::Kilobytes),
		"mb" => Ok(LimitUnit::Megabytes),
		"gb" => Ok(LimitUnit::Gigabytes),
		"min" | "mins" | "minute" | "minutes" => Ok(LimitUnit::Minutes),
		"hr" | "hrs" | "hour" | "hours" => Ok(LimitUnit::Hours),
		_ => Err(ParseError::UnexpectedToken {
			expected: "a limit unit".to_string(),
			found: format!("{text:?}"),
		}),
	}
}

/// Exact match of a quoted value.
fn anchored(text: &str) -> Result<Pattern, ParseError> {
	Ok(Pattern::compile(&format!("^{}$", regex::escape(text)), "")?)
}
