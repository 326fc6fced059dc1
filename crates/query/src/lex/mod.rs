// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! Tokenizer for the terse query grammar.
//!
//! The lexer is an ordered rule table walked in a fixed loop: at every
//! position the rules are tried top to bottom and the first one that matches
//! consumes input and (usually) emits a token. All rule patterns are anchored
//! at the start of the remaining input. If no rule matches, the remainder is
//! reported as unrecognized.

mod token;

use std::sync::LazyLock;

use regex::Regex;

pub use self::token::{Token, TokenKind};
use crate::error::LexError;

enum Action {
	/// `/…/` literal; the body is taken verbatim.
	Regexp,
	/// Quoted string; unescaped, regex-escaped and anchored `^…$`.
	Quoted,
	Relop,
	Emit(TokenKind),
	Skip,
	/// Anything that is not structural; trimmed.
	Tag,
}

static RULES: LazyLock<Vec<(Regex, Action)>> = LazyLock::new(|| {
	// The patterns are fixed strings; a failure here is a programming
	// error caught by the lexer tests.
	let rule = |pattern: &str, action: Action| {
		let anchored = format!("\\A(?:{pattern})");
		(Regex::new(&anchored).expect("lexer rules are valid patterns"), action)
	};

	vec![
		rule(r"/([^/\\]*(?:\\.[^/\\]*)*)/", Action::Regexp),
		rule(r#""([^"\\]*(?:\\.[^"\\]*)*)""#, Action::Quoted),
		rule(r"'([^'\\]*(?:\\.[^'\\]*)*)'", Action::Quoted),
		rule(r"[<>]=?|!=", Action::Relop),
		rule(r"=", Action::Emit(TokenKind::Equals)),
		rule(r"\|", Action::Emit(TokenKind::Union)),
		rule(r"&", Action::Emit(TokenKind::Intersect)),
		rule(r"!", Action::Emit(TokenKind::Negation)),
		rule(r"\(", Action::Emit(TokenKind::OpenParen)),
		rule(r"\)", Action::Emit(TokenKind::CloseParen)),
		rule(r",", Action::Emit(TokenKind::Comma)),
		rule(r"#", Action::Emit(TokenKind::Numcmp)),
		rule(r"\s+", Action::Skip),
		rule(r"[^=)|&#/<>!,]+", Action::Tag),
	]
});

/// Split `input` into tokens, always ending with [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
	let mut rest = input.trim();
	let mut tokens = Vec::new();

	'scan: while !rest.is_empty() {
		for (pattern, action) in RULES.iter() {
			let Some(caps) = pattern.captures(rest) else {
				continue;
			};
			let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
			let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

			match action {
				Action::Regexp => tokens.push(Token::new(TokenKind::Regex, body)),
				Action::Quoted => {
					let escaped = regex::escape(&unescape(body));
					tokens.push(Token::new(TokenKind::Regex, format!("^{escaped}$")));
				}
				Action::Relop => tokens.push(Token::new(TokenKind::Relop, matched)),
				Action::Emit(kind) => tokens.push(Token::new(*kind, matched)),
				Action::Skip => {}
				Action::Tag => tokens.push(Token::new(TokenKind::Tag, matched.trim())),
			}

			rest = &rest[matched.len()..];
			continue 'scan;
		}

		return Err(LexError::TrailingInput {
			remainder: rest.to_string(),
		});
	}

	tokens.push(Token::eof());
	Ok(tokens)
}

/// Resolve backslash escapes in a quoted string body. Unknown escapes are
/// kept as written.
pub(crate) fn unescape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('t') => out.push('\t'),
			Some('r') => out.push('\r'),
			Some('0') => out.push('\0'),
			Some('\\') => out.push('\\'),
			Some('\'') => out.push('\''),
			Some('"') => out.push('"'),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}
