// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use std::collections::HashMap;

/// The narrow capability interface the query engine consumes.
///
/// A record is an opaque mapping from tag name to zero or more string values,
/// plus a numeric facet lookup for things like duration, rating or play
/// count. Numeric facets are addressed by their bare name (`length`, not
/// `~#length`); how an implementation stores them is its own business.
pub trait Record {
	/// All values stored under `tag`, empty when the tag is absent.
	fn get(&self, tag: &str) -> Vec<String>;

	/// The numeric facet for `tag`, `0.0` when absent.
	fn get_numeric(&self, tag: &str) -> f64;
}

impl<R: Record + ?Sized> Record for &R {
	fn get(&self, tag: &str) -> Vec<String> {
		(**self).get(tag)
	}

	fn get_numeric(&self, tag: &str) -> f64 {
		(**self).get_numeric(tag)
	}
}

/// A simple in-memory [`Record`] backed by hash maps.
///
/// Handy for tests and small collections; real song libraries live behind
/// their own storage engine and only need to implement [`Record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRecord {
	values: HashMap<String, Vec<String>>,
	numeric: HashMap<String, f64>,
}

impl MemoryRecord {
	pub fn new() -> MemoryRecord {
		MemoryRecord::default()
	}

	/// Add one value under `tag`, keeping any existing ones.
	pub fn with_value(mut self, tag: &str, value: &str) -> MemoryRecord {
		self.values.entry(tag.to_string()).or_default().push(value.to_string());
		self
	}

	pub fn with_numeric(mut self, tag: &str, value: f64) -> MemoryRecord {
		self.numeric.insert(tag.to_string(), value);
		self
	}
}

impl Record for MemoryRecord {
	fn get(&self, tag: &str) -> Vec<String> {
		self.values.get(tag).cloned().unwrap_or_default()
	}

	fn get_numeric(&self, tag: &str) -> f64 {
		self.numeric.get(tag).copied().unwrap_or(0.0)
	}
}
