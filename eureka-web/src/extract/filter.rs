use super::date::{CanonicalDate, normalize};
use super::record::ResultRecord;

/// Parse a caller-supplied `date_from`. Blank or unparseable input yields
/// `None`, which disables the floor.
pub fn parse_floor(date_from: Option<&str>) -> Option<CanonicalDate> {
    let raw = date_from?.trim();
    if raw.is_empty() {
        return None;
    }
    normalize(raw)
}

/// Keep only records dated on or after `date_from`, preserving order.
///
/// Records without a date are dropped while the floor is active. An absent
/// or malformed `date_from` leaves the list untouched.
pub fn apply_date_floor(records: Vec<ResultRecord>, date_from: Option<&str>) -> Vec<ResultRecord> {
    retain_from(records, parse_floor(date_from))
}

pub(crate) fn retain_from(
    mut records: Vec<ResultRecord>,
    floor: Option<CanonicalDate>,
) -> Vec<ResultRecord> {
    if let Some(floor) = floor {
        records.retain(|r| r.date.is_some_and(|d| d >= floor));
    }
    records
}
