// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

//! Immutable predicate trees ("match trees") evaluated against tagged records.
//!
//! A [`Predicate`] is a pure tree of boolean combinators over two kinds of
//! leaves: [`Pattern`] matches against the string values of one or more tags,
//! and numeric comparisons against a record's numeric facets. Once built, a
//! predicate never changes and holds no external resources, so a compiled
//! query can be shared across reader threads and evaluated against different
//! records without synchronization.
//!
//! The engine sees records only through the narrow [`Record`] interface;
//! it never assumes a concrete storage representation and never mutates
//! anything it is given.

mod node;
mod pattern;
mod record;
mod relop;

pub use node::Predicate;
pub use pattern::{Pattern, PatternError};
pub use record::{MemoryRecord, Record};
pub use relop::RelOp;
