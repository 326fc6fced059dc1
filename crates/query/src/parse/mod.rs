// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! Recursive-descent parser for the terse query grammar.
//!
//! One token of lookahead decides every production:
//!
//! ```text
//! query      := '&' '(' query (',' query)* ')'
//!             | '|' '(' query (',' query)* ')'
//!             | '!' query
//!             | '#' '(' numcmp (',' numcmp)* ')'
//!             | names '=' value
//! names      := tag (',' tag)*
//! value      := regex | word | '!' value
//!             | '&' '(' value (',' value)* ')'
//!             | '|' '(' value (',' value)* ')'
//! numcmp     := operand relop operand (relop operand)?
//! ```
//!
//! A boolean value expression distributes its tag names over every pattern
//! leaf, so `artist=|(davis,evans)` and `|(artist=davis,artist=evans)` build
//! the same predicate. Single-element groups collapse to their only child.

use quaver_predicate::{Pattern, Predicate, RelOp};

use crate::{
	error::{ParseError, QueryError},
	lex::{Token, TokenKind, tokenize},
	numeric::parse_numeric,
};

/// Single-letter tag shorthand, expanded wherever a tag name is read.
const ABBRS: &[(&str, &str)] = &[
	("a", "artist"),
	("b", "album"),
	("v", "version"),
	("t", "title"),
	("n", "tracknumber"),
	("d", "date"),
];

/// Parse a complete terse query expression.
pub fn parse(input: &str) -> Result<Predicate, QueryError> {
	let tokens = tokenize(input)?;
	let mut parser = Parser::new(tokens);
	let predicate = parser.parse_query()?;
	parser.expect_eof()?;
	Ok(predicate)
}

/// A match value before tag names are known.
enum ValueExpr {
	Pattern(Pattern),
	Neg(Box<ValueExpr>),
	Union(Vec<ValueExpr>),
	Inter(Vec<ValueExpr>),
}

impl ValueExpr {
	/// Distribute `names` over every pattern leaf.
	fn apply_names(self, names: &[String]) -> Predicate {
		match self {
			ValueExpr::Pattern(pattern) => Predicate::Tag {
				names: names.to_vec(),
				pattern,
			},
			ValueExpr::Neg(inner) => Predicate::Neg(Box::new(inner.apply_names(names))),
			ValueExpr::Union(children) => {
				collapse(children.into_iter().map(|c| c.apply_names(names)).collect(), Predicate::Union)
			}
			ValueExpr::Inter(children) => {
				collapse(children.into_iter().map(|c| c.apply_names(names)).collect(), Predicate::Inter)
			}
		}
	}
}

fn collapse(mut children: Vec<Predicate>, wrap: fn(Vec<Predicate>) -> Predicate) -> Predicate {
	if children.len() == 1 {
		if let Some(only) = children.pop() {
			return only;
		}
	}
	wrap(children)
}

/// Tag names are caseless; shorthand lookup happens on the lowered name.
fn expand_abbreviation(name: &str) -> String {
	let name = name.to_ascii_lowercase();
	for (short, long) in ABBRS {
		if name == *short {
			return (*long).to_string();
		}
	}
	name
}

pub(crate) struct Parser {
	tokens: Vec<Token>,
	position: usize,
}

impl Parser {
	pub(crate) fn new(mut tokens: Vec<Token>) -> Self {
		if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
			tokens.push(Token::eof());
		}
		Self {
			tokens,
			position: 0,
		}
	}

	fn current(&self) -> &Token {
		// new() guarantees a trailing Eof token
		&self.tokens[self.position.min(self.tokens.len() - 1)]
	}

	fn advance(&mut self) -> Token {
		let token = self.current().clone();
		if token.kind != TokenKind::Eof {
			self.position += 1;
		}
		token
	}

	fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
		let current = self.current();
		if current.kind == kind {
			return Ok(self.advance());
		}
		if current.kind == TokenKind::Eof {
			return Err(ParseError::UnexpectedEof);
		}
		Err(ParseError::UnexpectedToken {
			expected: kind.as_str().to_string(),
			found: current.describe(),
		})
	}

	fn consume_if(&mut self, kind: TokenKind) -> Option<Token> {
		if self.current().kind == kind {
			return Some(self.advance());
		}
		None
	}

	pub(crate) fn expect_eof(&mut self) -> Result<(), ParseError> {
		let current = self.current();
		if current.kind == TokenKind::Eof {
			return Ok(());
		}
		Err(ParseError::UnexpectedToken {
			expected: TokenKind::Eof.as_str().to_string(),
			found: current.describe(),
		})
	}

	pub(crate) fn parse_query(&mut self) -> Result<Predicate, ParseError> {
		match self.current().kind {
			TokenKind::Intersect => {
				self.advance();
				Ok(collapse(self.parse_query_list()?, Predicate::Inter))
			}
			TokenKind::Union => {
				self.advance();
				Ok(collapse(self.parse_query_list()?, Predicate::Union))
			}
			TokenKind::Negation => {
				self.advance();
				Ok(Predicate::Neg(Box::new(self.parse_query()?)))
			}
			TokenKind::Numcmp => {
				self.advance();
				self.parse_numcmp_group()
			}
			TokenKind::Tag => self.parse_equals(),
			TokenKind::Eof => Err(ParseError::UnexpectedEof),
			_ => Err(ParseError::UnexpectedToken {
				expected: "a query expression".to_string(),
				found: self.current().describe(),
			}),
		}
	}

	fn parse_query_list(&mut self) -> Result<Vec<Predicate>, ParseError> {
		self.consume(TokenKind::OpenParen)?;
		let mut children = vec![self.parse_query()?];
		while self.consume_if(TokenKind::Comma).is_some() {
			children.push(self.parse_query()?);
		}
		self.consume(TokenKind::CloseParen)?;
		Ok(children)
	}

	fn parse_equals(&mut self) -> Result<Predicate, ParseError> {
		let names = self.parse_tag_names()?;
		self.consume(TokenKind::Equals)?;
		let value = self.parse_value()?;
		Ok(value.apply_names(&names))
	}

	fn parse_tag_names(&mut self) -> Result<Vec<String>, ParseError> {
		let mut names = vec![self.parse_tag_name()?];
		while self.consume_if(TokenKind::Comma).is_some() {
			names.push(self.parse_tag_name()?);
		}
		Ok(names)
	}

	fn parse_tag_name(&mut self) -> Result<String, ParseError> {
		let token = self.consume(TokenKind::Tag)?;
		let name = token.text.trim().to_string();

		// `~#` splits into a `~` tag and a `#` token; a numeric tag has
		// no string values to match against.
		if name == "~" && self.current().kind == TokenKind::Numcmp {
			self.advance();
			let tag = match self.current().kind {
				TokenKind::Tag => format!("~#{}", self.advance().text.trim()),
				_ => "~#".to_string(),
			};
			return Err(ParseError::NumericTag {
				tag,
			});
		}

		if !name.is_ascii() {
			return Err(ParseError::NonAsciiTag {
				tag: name,
			});
		}
		Ok(expand_abbreviation(&name))
	}

	fn parse_value(&mut self) -> Result<ValueExpr, ParseError> {
		match self.current().kind {
			TokenKind::Regex => {
				let token = self.advance();
				let mods = self.parse_regex_mods();
				Ok(ValueExpr::Pattern(Pattern::compile(&token.text, &mods)?))
			}
			TokenKind::Tag => {
				let token = self.advance();
				Ok(ValueExpr::Pattern(Pattern::literal(token.text.trim())?))
			}
			TokenKind::Negation => {
				self.advance();
				Ok(ValueExpr::Neg(Box::new(self.parse_value()?)))
			}
			TokenKind::Union => {
				self.advance();
				Ok(ValueExpr::Union(self.parse_value_list()?))
			}
			TokenKind::Intersect => {
				self.advance();
				Ok(ValueExpr::Inter(self.parse_value_list()?))
			}
			TokenKind::Eof => Err(ParseError::UnexpectedEof),
			_ => Err(ParseError::UnexpectedToken {
				expected: "a match value".to_string(),
				found: self.current().describe(),
			}),
		}
	}

	fn parse_value_list(&mut self) -> Result<Vec<ValueExpr>, ParseError> {
		self.consume(TokenKind::OpenParen)?;
		let mut values = vec![self.parse_value()?];
		while self.consume_if(TokenKind::Comma).is_some() {
			values.push(self.parse_value()?);
		}
		self.consume(TokenKind::CloseParen)?;
		Ok(values)
	}

	/// A modifier run directly after a regex literal lexes as a tag token.
	fn parse_regex_mods(&mut self) -> String {
		match self.consume_if(TokenKind::Tag) {
			Some(token) => token.text,
			None => String::new(),
		}
	}

	fn parse_numcmp_group(&mut self) -> Result<Predicate, ParseError> {
		self.consume(TokenKind::OpenParen)?;
		let mut parts = vec![self.parse_numcmp()?];
		while self.consume_if(TokenKind::Comma).is_some() {
			parts.push(self.parse_numcmp()?);
		}
		self.consume(TokenKind::CloseParen)?;
		Ok(collapse(parts, Predicate::Inter))
	}

	fn parse_numcmp(&mut self) -> Result<Predicate, ParseError> {
		let first = self.parse_operand()?;
		let op = self.parse_relop()?;
		let second = self.parse_operand()?;

		if matches!(self.current().kind, TokenKind::Relop | TokenKind::Equals) {
			// two-sided range: value op tag op value
			let second_op = self.parse_relop()?;
			let third = self.parse_operand()?;
			let low = parse_numeric(&first)?;
			let high = parse_numeric(&third)?;
			let tag = expand_abbreviation(&second);
			return Ok(Predicate::Inter(vec![
				Predicate::Numcmp {
					tag: tag.clone(),
					op: op.reversed(),
					value: low,
				},
				Predicate::Numcmp {
					tag,
					op: second_op,
					value: high,
				},
			]));
		}

		// tag op value, or flipped when the value is written first
		match parse_numeric(&second) {
			Ok(value) => Ok(Predicate::Numcmp {
				tag: expand_abbreviation(&first),
				op,
				value,
			}),
			Err(err) => match parse_numeric(&first) {
				Ok(value) => Ok(Predicate::Numcmp {
					tag: expand_abbreviation(&second),
					op: op.reversed(),
					value,
				}),
				Err(_) => Err(err.into()),
			},
		}
	}

	/// One side of a numeric comparison: a tag name (the `~#` marker is
	/// accepted and dropped) or a numeric value, undecided until both
	/// sides are seen.
	fn parse_operand(&mut self) -> Result<String, ParseError> {
		let token = self.consume(TokenKind::Tag)?;
		let text = token.text.trim().to_string();
		if text == "~" && self.current().kind == TokenKind::Numcmp {
			self.advance();
			let name = self.consume(TokenKind::Tag)?;
			return Ok(name.text.trim().to_string());
		}
		Ok(text)
	}

	fn parse_relop(&mut self) -> Result<RelOp, ParseError> {
		let token = match self.current().kind {
			TokenKind::Relop | TokenKind::Equals => self.advance(),
			TokenKind::Eof => return Err(ParseError::UnexpectedEof),
			_ => {
				return Err(ParseError::UnexpectedToken {
					expected: "a comparison operator".to_string(),
					found: self.current().describe(),
				});
			}
		};
		RelOp::parse(&token.text).ok_or_else(|| ParseError::UnexpectedToken {
			expected: "a comparison operator".to_string(),
			found: token.describe(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tag(names: &[&str], pattern: Pattern) -> Predicate {
		Predicate::Tag {
			names: names.iter().map(|n| n.to_string()).collect(),
			pattern,
		}
	}

	fn literal(names: &[&str], text: &str) -> Predicate {
		tag(names, Pattern::literal(text).unwrap())
	}

	#[test]
	fn test_simple_equals() {
		assert_eq!(parse("artist=davis").unwrap(), literal(&["artist"], "davis"));
	}

	#[test]
	fn test_abbreviated_tag() {
		assert_eq!(parse("a=davis").unwrap(), literal(&["artist"], "davis"));
		assert_eq!(parse("t=what").unwrap(), literal(&["title"], "what"));
	}

	#[test]
	fn test_tag_names_are_caseless() {
		assert_eq!(parse("ARTIST=davis").unwrap(), parse("artist=davis").unwrap());
		assert_eq!(parse("A=davis").unwrap(), parse("artist=davis").unwrap());
		assert_eq!(parse("#(LENGTH > 360)").unwrap(), parse("#(length > 360)").unwrap());
	}

	#[test]
	fn test_multiple_tag_names() {
		assert_eq!(parse("artist,performer=davis").unwrap(), literal(&["artist", "performer"], "davis"));
	}

	#[test]
	fn test_quoted_value_is_anchored() {
		let expected = tag(&["artist"], Pattern::compile("^Miles Davis$", "").unwrap());
		assert_eq!(parse("artist=\"Miles Davis\"").unwrap(), expected);
	}

	#[test]
	fn test_regex_value_with_mods() {
		let expected = tag(&["artist"], Pattern::compile("Davis", "c").unwrap());
		assert_eq!(parse("artist=/Davis/c").unwrap(), expected);
	}

	#[test]
	fn test_invalid_regex_mods() {
		assert!(matches!(
			parse("artist=/davis/z"),
			Err(QueryError::Parse(ParseError::Pattern(_)))
		));
	}

	#[test]
	fn test_invalid_regex_body() {
		assert!(matches!(parse("artist=/(unclosed/"), Err(QueryError::Parse(ParseError::Pattern(_)))));
	}

	#[test]
	fn test_intersection_and_union() {
		let expected = Predicate::Inter(vec![literal(&["artist"], "davis"), literal(&["title"], "what")]);
		assert_eq!(parse("&(artist=davis,title=what)").unwrap(), expected);

		let expected = Predicate::Union(vec![literal(&["artist"], "davis"), literal(&["artist"], "evans")]);
		assert_eq!(parse("|(artist=davis,artist=evans)").unwrap(), expected);
	}

	#[test]
	fn test_single_element_group_collapses() {
		assert_eq!(parse("&(artist=davis)").unwrap(), parse("artist=davis").unwrap());
		assert_eq!(parse("|(artist=davis)").unwrap(), parse("artist=davis").unwrap());
	}

	#[test]
	fn test_negation() {
		let expected = Predicate::Neg(Box::new(literal(&["artist"], "davis")));
		assert_eq!(parse("!artist=davis").unwrap(), expected);
	}

	#[test]
	fn test_negated_value() {
		let expected = Predicate::Neg(Box::new(literal(&["artist"], "davis")));
		assert_eq!(parse("artist=!davis").unwrap(), expected);
	}

	#[test]
	fn test_value_union_distributes_names() {
		assert_eq!(parse("artist=|(davis,evans)").unwrap(), parse("|(artist=davis,artist=evans)").unwrap());
	}

	#[test]
	fn test_value_inter_distributes_names() {
		assert_eq!(parse("artist=&(miles,davis)").unwrap(), parse("&(artist=miles,artist=davis)").unwrap());
	}

	#[test]
	fn test_numcmp() {
		let expected = Predicate::Numcmp {
			tag: "length".to_string(),
			op: RelOp::Gt,
			value: 360.0,
		};
		assert_eq!(parse("#(length > 360)").unwrap(), expected);
	}

	#[test]
	fn test_numcmp_equals_sign() {
		let expected = Predicate::Numcmp {
			tag: "year".to_string(),
			op: RelOp::Eq,
			value: 1959.0,
		};
		assert_eq!(parse("#(year = 1959)").unwrap(), expected);
	}

	#[test]
	fn test_numcmp_value_first_is_flipped() {
		assert_eq!(parse("#(5 < length)").unwrap(), parse("#(length > 5)").unwrap());
		assert_eq!(parse("#(5 <= length)").unwrap(), parse("#(length >= 5)").unwrap());
	}

	#[test]
	fn test_numcmp_two_sided_range() {
		let expected = Predicate::Inter(vec![
			Predicate::Numcmp {
				tag: "length".to_string(),
				op: RelOp::Gt,
				value: 120.0,
			},
			Predicate::Numcmp {
				tag: "length".to_string(),
				op: RelOp::Lt,
				value: 300.0,
			},
		]);
		assert_eq!(parse("#(120 < length < 300)").unwrap(), expected);
	}

	#[test]
	fn test_numcmp_group_intersects() {
		let expected = Predicate::Inter(vec![
			Predicate::Numcmp {
				tag: "length".to_string(),
				op: RelOp::Gt,
				value: 120.0,
			},
			Predicate::Numcmp {
				tag: "rating".to_string(),
				op: RelOp::Ge,
				value: 0.5,
			},
		]);
		assert_eq!(parse("#(length > 120, rating >= 0.5)").unwrap(), expected);
	}

	#[test]
	fn test_numcmp_unit_values() {
		let expected = Predicate::Numcmp {
			tag: "length".to_string(),
			op: RelOp::Lt,
			value: 270.0,
		};
		assert_eq!(parse("#(length < 4:30)").unwrap(), expected);

		let expected = Predicate::Numcmp {
			tag: "added".to_string(),
			op: RelOp::Lt,
			value: 259200.0,
		};
		assert_eq!(parse("#(added < 3 days)").unwrap(), expected);
	}

	#[test]
	fn test_numcmp_marker_accepted() {
		assert_eq!(parse("#(~#length > 5)").unwrap(), parse("#(length > 5)").unwrap());
	}

	#[test]
	fn test_numeric_tag_in_string_match_is_rejected() {
		assert_eq!(
			parse("~#length=davis"),
			Err(QueryError::Parse(ParseError::NumericTag {
				tag: "~#length".to_string()
			}))
		);
	}

	#[test]
	fn test_non_ascii_tag_is_rejected() {
		assert!(matches!(parse("ärtist=davis"), Err(QueryError::Parse(ParseError::NonAsciiTag { .. }))));
	}

	#[test]
	fn test_trailing_garbage() {
		assert!(matches!(parse("artist=davis)"), Err(QueryError::Parse(ParseError::UnexpectedToken { .. }))));
	}

	#[test]
	fn test_truncated_query() {
		assert_eq!(parse("artist="), Err(QueryError::Parse(ParseError::UnexpectedEof)));
		assert_eq!(parse("&(artist=davis"), Err(QueryError::Parse(ParseError::UnexpectedEof)));
	}

	#[test]
	fn test_nested_boolean_structure() {
		let expected = Predicate::Union(vec![
			Predicate::Inter(vec![literal(&["artist"], "davis"), literal(&["title"], "what")]),
			Predicate::Neg(Box::new(literal(&["genre"], "rock"))),
		]);
		assert_eq!(parse("|(&(artist=davis,title=what),!genre=rock)").unwrap(), expected);
	}
}
