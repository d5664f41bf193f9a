use chrono::NaiveDate;

use crate::error::RecordError;

/// Normalizes a raw `PY` value.
///
/// A full `YYYY-MM-DD` date is kept; a bare four-digit year becomes
/// January 1st of that year. Anything else, including an empty value, is
/// rejected.
pub fn normalize_publication_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let raw = raw.trim();

    let year = raw.split_once('-').map_or(raw, |(year, _)| year);
    if !is_four_digit_year(year) {
        return Err(invalid(raw));
    }

    if year.len() < raw.len() {
        return NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid(raw));
    }

    let year: i32 = year.parse().map_err(|_| invalid(raw))?;
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| invalid(raw))
}

/// Exactly four ASCII digits, and not year zero.
fn is_four_digit_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) && year != "0000"
}

fn invalid(raw: &str) -> RecordError {
    RecordError::InvalidDate {
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_iso_date_is_kept() {
        let date = normalize_publication_date("2020-05-01").unwrap();
        assert_eq!(date, ymd(2020, 5, 1));
        assert_eq!(date.to_string(), "2020-05-01");
    }

    #[test]
    fn bare_year_defaults_to_january_first() {
        let date = normalize_publication_date("2020").unwrap();
        assert_eq!(date.to_string(), "2020-01-01");
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            normalize_publication_date("not-a-date"),
            Err(RecordError::InvalidDate {
                raw: "not-a-date".to_string()
            })
        );
    }

    #[test]
    fn empty_value_is_rejected() {
        assert!(normalize_publication_date("").is_err());
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        assert!(normalize_publication_date("2021-02-29").is_err());
        assert!(normalize_publication_date("2020-13-01").is_err());
        assert_eq!(normalize_publication_date("2020-02-29").unwrap(), ymd(2020, 2, 29));
    }

    #[test]
    fn partial_and_padded_years_are_rejected() {
        assert!(normalize_publication_date("0000").is_err());
        assert!(normalize_publication_date("202").is_err());
        assert!(normalize_publication_date("20201").is_err());
        assert!(normalize_publication_date("2020-05").is_err());
        assert!(normalize_publication_date("MAY 2020").is_err());
        assert!(normalize_publication_date("0000-05-01").is_err());
    }

    #[test]
    fn full_dates_need_a_four_digit_unsigned_year() {
        for raw in ["99-01-01", "+2020-05-01", "-0001-01-01", "12020-01-01", "020-05-01"] {
            assert_eq!(
                normalize_publication_date(raw),
                Err(RecordError::InvalidDate { raw: raw.to_string() }),
                "{raw}"
            );
        }
        assert_eq!(normalize_publication_date("0001-01-01").unwrap(), ymd(1, 1, 1));
    }
}
