//! Human-readable schedule formatting.
//!
//! Consecutive hours are merged into half-open ranges and rendered as
//! `"start:00–end:00"`, comma-joined in ascending order:
//!
//! ```
//! use u_energy::format::format_hours;
//!
//! assert_eq!(format_hours(&[2, 0]), "0:00\u{2013}1:00, 2:00\u{2013}3:00");
//! assert_eq!(format_hours(&[5, 6, 7]), "5:00\u{2013}8:00");
//! assert_eq!(format_hours(&[]), "Not scheduled");
//! ```
//!
//! [`parse_ranges`] is the inverse, so formatted output can be turned back
//! into hour lists.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{merge_ranges, Schedule};

/// Marker for appliances without any scheduled hour.
pub const NOT_SCHEDULED: &str = "Not scheduled";

/// Formats one appliance's hours.
///
/// Input need not be sorted; duplicates are ignored.
pub fn format_hours(hours: &[usize]) -> String {
    if hours.is_empty() {
        return NOT_SCHEDULED.to_string();
    }
    merge_ranges(hours)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats every appliance of a raw appliance → hours map.
pub fn format_schedule(raw: &BTreeMap<String, Vec<usize>>) -> BTreeMap<String, String> {
    raw.iter()
        .map(|(name, hours)| (name.clone(), format_hours(hours)))
        .collect()
}

impl Schedule {
    /// Formatted appliance → ranges map.
    pub fn formatted(&self) -> BTreeMap<String, String> {
        format_schedule(&self.to_hour_map())
    }
}

/// Parses a formatted range list back into ascending hours.
///
/// Accepts an en dash or a plain hyphen between the bounds, and the
/// [`NOT_SCHEDULED`] marker (empty result).
pub fn parse_ranges(text: &str) -> Result<Vec<usize>> {
    let text = text.trim();
    if text == NOT_SCHEDULED || text.is_empty() {
        return Ok(Vec::new());
    }

    let mut hours = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        let (start, end) = part
            .split_once('\u{2013}')
            .or_else(|| part.split_once('-'))
            .ok_or_else(|| Error::InvalidRange(part.to_string()))?;
        let start = parse_clock(start, part)?;
        let end = parse_clock(end, part)?;
        if end <= start {
            return Err(Error::InvalidRange(part.to_string()));
        }
        hours.extend(start..end);
    }

    hours.sort_unstable();
    hours.dedup();
    Ok(hours)
}

fn parse_clock(clock: &str, context: &str) -> Result<usize> {
    clock
        .trim()
        .strip_suffix(":00")
        .and_then(|h| h.parse().ok())
        .ok_or_else(|| Error::InvalidRange(context.to_string()))
}
