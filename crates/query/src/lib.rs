// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! Query language front-ends for searching tagged song records.
//!
//! Two surface syntaxes compile to the same [`quaver_predicate::Predicate`]
//! trees:
//!
//! - the terse grammar (`&(artist=davis,#(length > 360))`), reached through
//!   the [`Query`] facade which also accepts bare values and free text, and
//! - the SQL-like grammar (`artist = davis AND genre IN [jazz, bop] LIMIT
//!   2 hours`), reached through [`Mql`].
//!
//! Both facades are total: malformed input degrades to a predicate that
//! matches nothing and an invalid flag, never a panic.

mod error;
mod lex;
mod mql;
mod numeric;
mod parse;
mod query;

pub use error::{LexError, NumericError, ParseError, QueryError};
pub use lex::{Token, TokenKind, tokenize};
pub use mql::{DEFAULT_NUMERIC_TAGS, Limit, LimitUnit, Mql};
pub use numeric::parse_numeric;
pub use parse::parse;
pub use query::{Classification, DEFAULT_STAR, Query};
