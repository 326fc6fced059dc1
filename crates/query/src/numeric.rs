// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 Quaver

use crate::error::NumericError;

/// Parse a numeric comparison value as written in a query.
///
/// Accepts plain integers and floats, `h:mm:ss` / `m:ss` colon times
/// (seconds), size suffixes `k`/`kb`, `m`/`mb`, `g`/`gb` (powers of 1024,
/// bytes) and duration suffixes `second(s)`, `minute(s)`, `hour(s)`,
/// `day(s)`, `week(s)` (seconds). Matching is case-insensitive.
pub fn parse_numeric(text: &str) -> Result<f64, NumericError> {
	let text = text.trim().to_ascii_lowercase();
	if text.is_empty() {
		return Err(NumericError::Malformed {
			text,
		});
	}

	if let Ok(value) = text.parse::<f64>() {
		return Ok(value);
	}

	if text.contains(':') {
		return parse_colon_time(&text);
	}

	let split = text.find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-')).unwrap_or(text.len());
	let (number, unit) = text.split_at(split);
	let value = number.parse::<f64>().map_err(|_| NumericError::Malformed {
		text: text.clone(),
	})?;

	Ok(value * unit_scale(unit.trim())?)
}

fn parse_colon_time(text: &str) -> Result<f64, NumericError> {
	let parts: Vec<&str> = text.split(':').collect();
	if parts.len() > 3 {
		return Err(NumericError::Malformed {
			text: text.to_string(),
		});
	}

	let mut total = 0.0;
	for part in parts {
		let value = part.parse::<f64>().map_err(|_| NumericError::Malformed {
			text: text.to_string(),
		})?;
		total = total * 60.0 + value;
	}
	Ok(total)
}

fn unit_scale(unit: &str) -> Result<f64, NumericError> {
	match unit {
		"k" | "kb" => return Ok(1024.0),
		"m" | "mb" => return Ok(1024.0 * 1024.0),
		"g" | "gb" => return Ok(1024.0 * 1024.0 * 1024.0),
		_ => {}
	}

	match unit.strip_suffix('s').unwrap_or(unit) {
		"second" => Ok(1.0),
		"minute" => Ok(60.0),
		"hour" => Ok(3600.0),
		"day" => Ok(86400.0),
		"week" => Ok(604800.0),
		_ => Err(NumericError::UnknownUnit {
			unit: unit.to_string(),
		}),
	}
}
