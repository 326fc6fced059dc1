// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use std::fmt::{Display, Formatter};

/// Token kinds of the terse query grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// `!`
	Negation,
	/// `&`
	Intersect,
	/// `|`
	Union,
	/// `(`
	OpenParen,
	/// `)`
	CloseParen,
	/// `=`
	Equals,
	/// `,`
	Comma,
	/// `<`, `<=`, `>`, `>=` or `!=`; the text carries which one.
	Relop,
	/// `#`, opening a numeric comparison group.
	Numcmp,
	/// A run of tag or value characters. Also carries the modifier
	/// letters that may trail a regex literal.
	Tag,
	/// A regular expression body, either written `/…/` or produced from
	/// a quoted string by escaping and anchoring it.
	Regex,
	Eof,
}

impl TokenKind {
	pub fn as_str(self) -> &'static str {
		match self {
			TokenKind::Negation => "negation",
			TokenKind::Intersect => "intersection",
			TokenKind::Union => "union",
			TokenKind::OpenParen => "opening parenthesis",
			TokenKind::CloseParen => "closing parenthesis",
			TokenKind::Equals => "equals sign",
			TokenKind::Comma => "comma",
			TokenKind::Relop => "comparison operator",
			TokenKind::Numcmp => "numeric comparison",
			TokenKind::Tag => "tag",
			TokenKind::Regex => "regular expression",
			TokenKind::Eof => "end of query",
		}
	}
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One lexed token; immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub text: String,
}

impl Token {
	pub(crate) fn new(kind: TokenKind, text: impl Into<String>) -> Token {
		Token {
			kind,
			text: text.into(),
		}
	}

	pub(crate) fn eof() -> Token {
		Token::new(TokenKind::Eof, "")
	}

	/// Human-readable rendering for error messages.
	pub fn describe(&self) -> String {
		match self.kind {
			TokenKind::Eof => self.kind.as_str().to_string(),
			_ => format!("{} {:?}", self.kind, self.text),
		}
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.describe())
	}
}
