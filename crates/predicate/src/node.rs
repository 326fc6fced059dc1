// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use crate::{Pattern, Record, RelOp};

/// The match tree: an immutable predicate over tagged records.
///
/// Every variant is a pure value; evaluating a predicate twice against the
/// same record gives the same answer, and constructing one never touches a
/// record.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	/// Matches every record.
	True,
	/// Matches no record.
	False,
	/// Logical NOT.
	Neg(Box<Predicate>),
	/// Logical AND; the empty intersection is always true.
	Inter(Vec<Predicate>),
	/// Logical OR; the empty union is always false.
	Union(Vec<Predicate>),
	/// True if any value of any named tag matches the pattern.
	/// Multi-valued tags are tested value by value.
	Tag { names: Vec<String>, pattern: Pattern },
	/// True if the record's numeric facet satisfies the comparison.
	/// An absent facet compares as zero.
	Numcmp { tag: String, op: RelOp, value: f64 },
}

impl Predicate {
	/// Evaluate against one record.
	pub fn search(&self, record: &impl Record) -> bool {
		match self {
			Predicate::True => true,
			Predicate::False => false,
			Predicate::Neg(inner) => !inner.search(record),
			Predicate::Inter(children) => children.iter().all(|child| child.search(record)),
			Predicate::Union(children) => children.iter().any(|child| child.search(record)),
			Predicate::Tag {
				names,
				pattern,
			} => names.iter().any(|name| record.get(name).iter().any(|value| pattern.is_match(value))),
			Predicate::Numcmp {
				tag,
				op,
				value,
			} => op.apply(record.get_numeric(tag), *value),
		}
	}

	/// Keep the records the predicate matches.
	pub fn filter<'a, R, I>(&self, records: I) -> Vec<&'a R>
	where
		R: Record + 'a,
		I: IntoIterator<Item = &'a R>,
	{
		records.into_iter().filter(|record| self.search(record)).collect()
	}

	/// Whether the predicate trivially matches every record.
	pub fn matches_all(&self) -> bool {
		match self {
			Predicate::True => true,
			Predicate::Inter(children) => children.is_empty(),
			_ => false,
		}
	}
}
