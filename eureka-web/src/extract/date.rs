use chrono::NaiveDate;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

// ISO first, then the loose D.M.Y form with any of `.`, `/`, `-`.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<iy>\d{4})-(?P<im>\d{2})-(?P<id>\d{2})\b|\b(?P<d>\d{1,2})[./-](?P<m>\d{1,2})[./-](?P<y>\d{2,4})\b",
    )
    .expect("date pattern is valid")
});

/// A calendar date rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(CanonicalDate)
            .map_err(serde::de::Error::custom)
    }
}

/// Find the first date-looking fragment in `text` and turn it into a
/// [`CanonicalDate`].
///
/// Loose numeric dates are read day-first (`05.03.2023` is 5 March); when
/// that is not a real date but the month-first reading is, the latter wins.
/// Two-digit years are taken as 20YY. Only the first fragment is considered:
/// if it is not a valid calendar date the result is `None`.
///
/// ```
/// use eureka_web::extract::normalize;
///
/// let d = normalize("Interpretacja z dnia 05.03.2023 dotyczy...").unwrap();
/// assert_eq!(d.to_string(), "2023-03-05");
/// assert!(normalize("spotkanie 2024-13-40 w urzędzie").is_none());
/// ```
pub fn normalize(text: &str) -> Option<CanonicalDate> {
    let caps = DATE_RE.captures(text)?;
    if caps.name("iy").is_some() {
        let y = number(&caps, "iy")?;
        let m = number(&caps, "im")?;
        let d = number(&caps, "id")?;
        return NaiveDate::from_ymd_opt(y, m as u32, d as u32).map(CanonicalDate);
    }

    let year_raw = caps.name("y")?.as_str();
    let mut y = year_raw.parse::<i32>().ok()?;
    if year_raw.len() == 2 {
        y += 2000;
    }
    let first = number(&caps, "d")? as u32;
    let second = number(&caps, "m")? as u32;

    NaiveDate::from_ymd_opt(y, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(y, first, second))
        .map(CanonicalDate)
}

fn number(caps: &Captures<'_>, name: &str) -> Option<i32> {
    caps.name(name)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> Option<String> {
        normalize(s).map(|d| d.to_string())
    }

    #[test]
    fn iso_dates() {
        assert_eq!(norm("2024-02-01"), Some("2024-02-01".into()));
        assert_eq!(norm("wydano 2019-11-30, sygn. 0111-KDIB"), Some("2019-11-30".into()));
    }

    #[test]
    fn loose_dates_are_day_first() {
        assert_eq!(norm("05.03.2023"), Some("2023-03-05".into()));
        assert_eq!(norm("5/3/2023"), Some("2023-03-05".into()));
        assert_eq!(norm("1-2-2022"), Some("2022-02-01".into()));
    }

    #[test]
    fn month_first_when_day_first_is_impossible() {
        assert_eq!(norm("12/31/2023"), Some("2023-12-31".into()));
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(norm("z dnia 7.4.21 r."), Some("2021-04-07".into()));
    }

    #[test]
    fn invalid_calendar_dates_are_absent() {
        assert_eq!(norm("spotkanie 2024-13-40 w urzędzie"), None);
        assert_eq!(norm("32.13.2023"), None);
        assert_eq!(norm("2023-02-29"), None);
    }

    #[test]
    fn no_match_is_absent() {
        assert_eq!(norm(""), None);
        assert_eq!(norm("brak daty"), None);
        assert_eq!(norm("numer 123456789"), None);
    }

    #[test]
    fn first_fragment_wins() {
        assert_eq!(norm("od 01.02.2020 do 2021-05-06"), Some("2020-02-01".into()));
    }

    #[test]
    fn zero_padded_output() {
        assert_eq!(norm("1.2.2024"), Some("2024-02-01".into()));
    }

    #[test]
    fn serde_uses_canonical_form() {
        let d = normalize("09.10.2024").unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2024-10-09\"");
        let back: CanonicalDate = serde_json::from_str("\"2024-10-09\"").unwrap();
        assert_eq!(back, d);
    }
}
