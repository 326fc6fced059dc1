// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use std::fmt::{Display, Formatter};

/// Relational operators usable in numeric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl RelOp {
	/// Parse an operator from its surface syntax. `==` and `=` both mean
	/// equality, `<>` is accepted as an alias for `!=`.
	pub fn parse(text: &str) -> Option<RelOp> {
		match text {
			"=" | "==" => Some(RelOp::Eq),
			"!=" | "<>" => Some(RelOp::Ne),
			"<" => Some(RelOp::Lt),
			"<=" => Some(RelOp::Le),
			">" => Some(RelOp::Gt),
			">=" => Some(RelOp::Ge),
			_ => None,
		}
	}

	/// Apply the comparison with the record's value on the left.
	pub fn apply(self, lhs: f64, rhs: f64) -> bool {
		match self {
			RelOp::Eq => lhs == rhs,
			RelOp::Ne => lhs != rhs,
			RelOp::Lt => lhs < rhs,
			RelOp::Le => lhs <= rhs,
			RelOp::Gt => lhs > rhs,
			RelOp::Ge => lhs >= rhs,
		}
	}

	/// The operator that holds when both sides of a comparison are swapped,
	/// used when a query writes the value on the left (`5 < length`).
	/// Equality and inequality are their own mirror images.
	pub fn reversed(self) -> RelOp {
		match self {
			RelOp::Lt => RelOp::Gt,
			RelOp::Le => RelOp::Ge,
			RelOp::Gt => RelOp::Lt,
			RelOp::Ge => RelOp::Le,
			RelOp::Eq => RelOp::Eq,
			RelOp::Ne => RelOp::Ne,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RelOp::Eq => "=",
			RelOp::Ne => "!=",
			RelOp::Lt => "<",
			RelOp::Le => "<=",
			RelOp::Gt => ">",
			RelOp::Ge => ">=",
		}
	}
}

impl Display for RelOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
