// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use quaver_predicate::{MemoryRecord, Predicate, Record};
use quaver_query::{Classification, DEFAULT_NUMERIC_TAGS, DEFAULT_STAR, LimitUnit, Mql, Query, parse};

fn library() -> Vec<MemoryRecord> {
	vec![
		MemoryRecord::new()
			.with_value("artist", "Miles Davis")
			.with_value("album", "Kind of Blue")
			.with_value("title", "So What")
			.with_value("genre", "jazz")
			.with_numeric("length", 540.0)
			.with_numeric("year", 1959.0),
		MemoryRecord::new()
			.with_value("artist", "John Coltrane")
			.with_value("album", "Giant Steps")
			.with_value("title", "Naima")
			.with_value("genre", "jazz")
			.with_numeric("length", 263.0)
			.with_numeric("year", 1960.0),
		MemoryRecord::new()
			.with_value("artist", "AC/DC")
			.with_value("album", "Back in Black")
			.with_value("title", "Thunderstruck")
			.with_value("genre", "rock")
			.with_numeric("length", 292.0)
			.with_numeric("year", 1990.0),
	]
}

fn matches(raw: &str) -> Vec<String> {
	let query = Query::new(raw, DEFAULT_STAR);
	let records = library();
	query.filter(&records).into_iter().flat_map(|r| r.get("title")).collect()
}

#[test]
fn test_search_scenario() {
	let records = library();
	let miles = &records[0];

	assert!(Query::new("davis", DEFAULT_STAR).search(miles));
	assert!(!Query::new("artist=Coltrane", DEFAULT_STAR).search(miles));
	assert!(Query::new("#(length > 500)", DEFAULT_STAR).search(miles));
	assert!(!Query::new("#(length > 600)", DEFAULT_STAR).search(miles));
}

#[test]
fn test_tag_names_are_caseless_in_both_front_ends() {
	let records = library();
	let miles = &records[0];

	assert!(Query::new("ARTIST=davis", DEFAULT_STAR).search(miles));
	assert!(Query::new("A=davis", DEFAULT_STAR).search(miles));
	assert!(Mql::new("LENGTH > 500", DEFAULT_STAR, DEFAULT_NUMERIC_TAGS).search(miles));
}

#[test]
fn test_empty_query_matches_every_record() {
	let query = Query::new("", DEFAULT_STAR);
	assert!(query.matches_all());
	assert_eq!(query.filter(&library()).len(), 3);
}

#[test]
fn test_conjunction_composes() {
	// records matching &(a,b) are exactly those matching both a and b
	let records = library();
	let a = Query::new("genre=jazz", DEFAULT_STAR);
	let b = Query::new("#(year < 1960)", DEFAULT_STAR);
	let both = Query::new("&(genre=jazz,#(year < 1960))", DEFAULT_STAR);
	for record in &records {
		assert_eq!(both.search(record), a.search(record) && b.search(record));
	}
}

#[test]
fn test_de_morgan() {
	let records = library();
	let negated_union = Query::new("!|(genre=jazz,#(year > 1980))", DEFAULT_STAR);
	let inter_of_negs = Query::new("&(!genre=jazz,!#(year > 1980))", DEFAULT_STAR);
	for record in &records {
		assert_eq!(negated_union.search(record), inter_of_negs.search(record));
	}
}

#[test]
fn test_quoted_exact_vs_bare_partial() {
	assert_eq!(matches("artist=davis"), vec!["So What"]);
	assert_eq!(matches("artist=\"Davis\""), Vec::<String>::new());
	assert_eq!(matches("artist=\"Miles Davis\""), vec!["So What"]);
}

#[test]
fn test_value_first_comparison_reads_the_same() {
	assert_eq!(parse("#(300 < length)").unwrap(), parse("#(length > 300)").unwrap());
	assert_eq!(matches("#(300 < length)"), vec!["So What"]);
}

#[test]
fn test_free_text_searches_all_star_tags() {
	assert_eq!(matches("blue"), vec!["So What"]);
	assert_eq!(matches("giant steps"), vec!["Naima"]);
	assert_eq!(matches("ac/dc"), vec!["Thunderstruck"]);
}

#[test]
fn test_reparsing_raw_gives_the_same_predicate() {
	for raw in ["davis", "!davis", "miles davis", "artist=davis", "&(genre=jazz,#(length > 300))"] {
		let first = Query::new(raw, DEFAULT_STAR);
		let second = Query::new(first.raw(), DEFAULT_STAR);
		assert!(first.is_valid());
		assert_eq!(first.predicate(), second.predicate());
		assert_eq!(first.classification(), second.classification());
	}
}

#[test]
fn test_validators_never_raise_on_pathological_input() {
	let inputs = ["#", "=", "#(((((", "&(", "|(,,,)", "!!!!!!", "~#=", "a=/", "\"unclosed", "🎵=note"];
	for raw in inputs {
		let query = Query::new(raw, DEFAULT_STAR);
		assert!(!query.search(&library()[0]) || query.is_valid());
		Query::is_parsable(raw, DEFAULT_STAR);
		Query::is_valid_expression(raw);
	}
}

#[test]
fn test_classification_is_stable() {
	assert_eq!(Query::new("davis", DEFAULT_STAR).classification(), Classification::Value);
	assert_eq!(Query::new("miles davis", DEFAULT_STAR).classification(), Classification::Text);
	assert_eq!(Query::new("artist=davis", DEFAULT_STAR).classification(), Classification::Normal);
}

#[test]
fn test_queries_are_shareable_across_threads() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<Query>();
	assert_send_sync::<Mql>();
	assert_send_sync::<Predicate>();

	let query = Query::new("genre=jazz", DEFAULT_STAR);
	let records = library();
	std::thread::scope(|scope| {
		for record in &records {
			let query = &query;
			scope.spawn(move || {
				query.search(record);
			});
		}
	});
}

#[test]
fn test_mql_end_to_end() {
	let records = library();
	let query = Mql::new("artist = davis AND genre IN [jazz, bop] LIMIT 2 hours", DEFAULT_STAR, DEFAULT_NUMERIC_TAGS);
	assert!(query.is_valid());
	let kept = query.filter(&records);
	assert_eq!(kept.len(), 1);
	assert_eq!(kept[0].get("title"), vec!["So What".to_string()]);

	let limit = query.limit().unwrap();
	assert_eq!(limit.unit, LimitUnit::Hours);
	assert_eq!(limit.native(), 7200.0);
}

#[test]
fn test_mql_exclusion() {
	let query = Mql::new("genre = jazz BUT NOT coltrane", DEFAULT_STAR, DEFAULT_NUMERIC_TAGS);
	let records = library();
	let kept = query.filter(&records);
	// the exclusion applies to the same tag, so both jazz records stay
	assert_eq!(kept.len(), 2);

	let query = Mql::new("artist = coltrane BUT NOT john", DEFAULT_STAR, DEFAULT_NUMERIC_TAGS);
	assert!(query.filter(&records).is_empty());
}

#[test]
fn test_both_front_ends_agree() {
	let records = library();
	let terse = Query::new("&(genre=jazz,#(year < 1960))", DEFAULT_STAR);
	let mql = Mql::new("genre = jazz AND year < 1960", DEFAULT_STAR, DEFAULT_NUMERIC_TAGS);
	for record in &records {
		assert_eq!(terse.search(record), mql.search(record));
	}
}
