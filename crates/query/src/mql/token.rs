// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use std::{collections::HashMap, sync::LazyLock};

use quaver_predicate::RelOp;

use crate::{error::LexError, lex::unescape};

macro_rules! keyword {
	($($variant:ident => $text:literal),+ $(,)?) => {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub(crate) enum Keyword {
			$($variant,)+
		}

		impl Keyword {
			pub(crate) fn as_str(self) -> &'static str {
				match self {
					$(Keyword::$variant => $text,)+
				}
			}

			/// Case-insensitive lookup.
			pub(crate) fn lookup(word: &str) -> Option<Keyword> {
				static KEYWORDS: LazyLock<HashMap<&'static str, Keyword>> =
					LazyLock::new(|| {
						let mut map = HashMap::new();
						$(map.insert($text, Keyword::$variant);)+
						map
					});
				KEYWORDS.get(word.to_ascii_uppercase().as_str()).copied()
			}
		}
	};
}

keyword! {
	And => "AND",
	Or => "OR",
	In => "IN",
	But => "BUT",
	Not => "NOT",
	Limit => "LIMIT",
}

/// Tokens of the SQL-like grammar.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MqlToken {
	Keyword(Keyword),
	Word(String),
	Number(String),
	/// Quoted string, escapes already resolved.
	Quoted(String),
	Regex { body: String, mods: String },
	Bang,
	Equals,
	/// `!=` or `<>`.
	NotEquals,
	Relop(RelOp),
	OpenParen,
	CloseParen,
	OpenBracket,
	CloseBracket,
	Comma,
	Eof,
}

impl MqlToken {
	pub(crate) fn describe(&self) -> String {
		match self {
			MqlToken::Keyword(keyword) => format!("keyword {}", keyword.as_str()),
			MqlToken::Word(word) => format!("word {word:?}"),
			MqlToken::Number(number) => format!("number {number:?}"),
			MqlToken::Quoted(body) => format!("string {body:?}"),
			MqlToken::Regex {
				body,
				..
			} => format!("regular expression /{body}/"),
			MqlToken::Bang => "`!`".to_string(),
			MqlToken::Equals => "`=`".to_string(),
			MqlToken::NotEquals => "`!=`".to_string(),
			MqlToken::Relop(op) => format!("`{op}`"),
			MqlToken::OpenParen => "`(`".to_string(),
			MqlToken::CloseParen => "`)`".to_string(),
			MqlToken::OpenBracket => "`[`".to_string(),
			MqlToken::CloseBracket => "`]`".to_string(),
			MqlToken::Comma => "`,`".to_string(),
			MqlToken::Eof => "end of query".to_string(),
		}
	}
}

/// Split `input` into tokens, always ending with [`MqlToken::Eof`].
pub(crate) fn tokenize(input: &str) -> Result<Vec<MqlToken>, LexError> {
	let mut cursor = Cursor::new(input);
	let mut tokens = Vec::new();
	while let Some(token) = cursor.next_token()? {
		tokens.push(token);
	}
	tokens.push(MqlToken::Eof);
	Ok(tokens)
}

fn is_word_char(c: char) -> bool {
	!c.is_whitespace() && !"()[],=<>!\"'/".contains(c)
}

struct Cursor<'a> {
	rest: &'a str,
}

impl<'a> Cursor<'a> {
	fn new(input: &'a str) -> Cursor<'a> {
		Cursor {
			rest: input,
		}
	}

	fn peek(&self) -> Option<char> {
		self.rest.chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let c = self.peek()?;
		self.rest = &self.rest[c.len_utf8()..];
		Some(c)
	}

	fn eat(&mut self, prefix: &str) -> bool {
		match self.rest.strip_prefix(prefix) {
			Some(rest) => {
				self.rest = rest;
				true
			}
			None => false,
		}
	}

	fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
		let end = self.rest.find(|c| !pred(c)).unwrap_or(self.rest.len());
		let (taken, rest) = self.rest.split_at(end);
		self.rest = rest;
		taken
	}

	fn next_token(&mut self) -> Result<Option<MqlToken>, LexError> {
		self.take_while(char::is_whitespace);
		let Some(c) = self.peek() else {
			return Ok(None);
		};

		let token = match c {
			'(' => {
				self.bump();
				MqlToken::OpenParen
			}
			')' => {
				self.bump();
				MqlToken::CloseParen
			}
			'[' => {
				self.bump();
				MqlToken::OpenBracket
			}
			']' => {
				self.bump();
				MqlToken::CloseBracket
			}
			',' => {
				self.bump();
				MqlToken::Comma
			}
			'"' | '\'' => self.scan_quoted(c)?,
			'/' => self.scan_regex()?,
			'<' | '>' | '=' | '!' => self.scan_operator(),
			c if c.is_ascii_digit() => self.scan_number(),
			_ => self.scan_word(),
		};
		Ok(Some(token))
	}

	fn scan_operator(&mut self) -> MqlToken {
		if self.eat("<=") {
			MqlToken::Relop(RelOp::Le)
		} else if self.eat(">=") {
			MqlToken::Relop(RelOp::Ge)
		} else if self.eat("<>") || self.eat("!=") {
			MqlToken::NotEquals
		} else if self.eat("<") {
			MqlToken::Relop(RelOp::Lt)
		} else if self.eat(">") {
			MqlToken::Relop(RelOp::Gt)
		} else if self.eat("=") {
			MqlToken::Equals
		} else {
			self.eat("!");
			MqlToken::Bang
		}
	}

	fn scan_quoted(&mut self, quote: char) -> Result<MqlToken, LexError> {
		let start = self.rest;
		self.bump();
		let mut body = String::new();
		loop {
			match self.bump() {
				None => {
					return Err(LexError::Unterminated {
						remainder: start.to_string(),
					});
				}
				Some('\\') => {
					body.push('\\');
					match self.bump() {
						Some(escaped) => body.push(escaped),
						None => {
							return Err(LexError::Unterminated {
								remainder: start.to_string(),
							});
						}
					}
				}
				Some(c) if c == quote => break,
				Some(c) => body.push(c),
			}
		}
		Ok(MqlToken::Quoted(unescape(&body)))
	}

	fn scan_regex(&mut self) -> Result<MqlToken, LexError> {
		let start = self.rest;
		self.bump();
		let mut body = String::new();
		loop {
			match self.bump() {
				None => {
					return Err(LexError::Unterminated {
						remainder: start.to_string(),
					});
				}
				Some('\\') => {
					body.push('\\');
					match self.bump() {
						Some(escaped) => body.push(escaped),
						None => {
							return Err(LexError::Unterminated {
								remainder: start.to_string(),
							});
						}
					}
				}
				Some('/') => break,
				Some(c) => body.push(c),
			}
		}
		let mods = self.take_while(|c| c.is_ascii_alphabetic()).to_string();
		Ok(MqlToken::Regex {
			body,
			mods,
		})
	}

	/// A digit run is a number only when nothing word-like follows;
	/// `720` is a number but `80s` and `720MB` stay words.
	fn scan_number(&mut self) -> MqlToken {
		let end = self.rest.find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ':')).unwrap_or(self.rest.len());
		let follows_word = self.rest[end..].chars().next().map(is_word_char).unwrap_or(false);
		if follows_word {
			return self.scan_word();
		}
		let (number, rest) = self.rest.split_at(end);
		self.rest = rest;
		MqlToken::Number(number.to_string())
	}

	fn scan_word(&mut self) -> MqlToken {
		let word = self.take_while(is_word_char).to_string();
		match Keyword::lookup(&word) {
			Some(keyword) => MqlToken::Keyword(keyword),
			None => MqlToken::Word(word),
		}
	}
}
