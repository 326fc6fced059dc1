// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use quaver_predicate::PatternError;

/// Errors raised while splitting a query into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
	#[error("unrecognized input at {remainder:?}")]
	TrailingInput { remainder: String },

	#[error("unterminated literal at {remainder:?}")]
	Unterminated { remainder: String },
}

/// Errors raised while reading a numeric comparison value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
	#[error("malformed numeric value {text:?}")]
	Malformed { text: String },

	#[error("unknown numeric unit {unit:?}")]
	UnknownUnit { unit: String },
}

/// Errors raised while parsing a token stream into a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
	#[error("expected {expected}, found {found}")]
	UnexpectedToken { expected: String, found: String },

	#[error("unexpected end of query")]
	UnexpectedEof,

	#[error("tag names must be ascii, got {tag:?}")]
	NonAsciiTag { tag: String },

	#[error("numeric tag {tag:?} cannot be matched as text")]
	NumericTag { tag: String },

	#[error("tag {tag:?} is not numeric; prefix it with `~#` to compare")]
	NotNumeric { tag: String },

	#[error(transparent)]
	Pattern(#[from] PatternError),

	#[error(transparent)]
	Numeric(#[from] NumericError),
}

/// Any failure while turning query text into a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
	#[error(transparent)]
	Lex(#[from] LexError),

	#[error(transparent)]
	Parse(#[from] ParseError),
}
