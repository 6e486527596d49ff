use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

fn bad(msg: impl Into<String>) -> AppError {
    AppError::InvalidInput(msg.into())
}

fn last_day_of_month(y: i32, m: u32) -> Option<NaiveDate> {
    let (ny, nm) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1).and_then(|d| d.pred_opt())
}

/// First and last day covered by one `YYYY`, `YYYY-MM` or `YYYY-MM-DD` token.
fn token_bounds(t: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let t = t.trim();
    match t.len() {
        4 => {
            let y: i32 = t.parse().map_err(|_| bad(format!("invalid year '{t}'")))?;
            let start = NaiveDate::from_ymd_opt(y, 1, 1)
                .ok_or_else(|| bad(format!("invalid year '{t}'")))?;
            let end = NaiveDate::from_ymd_opt(y, 12, 31)
                .ok_or_else(|| bad(format!("invalid year '{t}'")))?;
            Ok((start, end))
        }
        7 => {
            let start = NaiveDate::parse_from_str(&format!("{t}-01"), "%Y-%m-%d")
                .map_err(|_| bad(format!("invalid month '{t}'")))?;
            let end = last_day_of_month(start.year(), start.month())
                .ok_or_else(|| bad(format!("invalid month '{t}'")))?;
            Ok((start, end))
        }
        10 => {
            let d = NaiveDate::parse_from_str(t, "%Y-%m-%d")
                .map_err(|_| bad(format!("invalid date '{t}'")))?;
            Ok((d, d))
        }
        _ => Err(bad(format!("unsupported --range format '{t}'"))),
    }
}

/// Parse `--range` into inclusive local calendar bounds.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or `A:B` where both sides share
/// one of those granularities.
pub(crate) fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let Some((a, b)) = r.split_once(':') else {
        return token_bounds(r);
    };

    if a.trim().len() != b.trim().len() {
        return Err(bad("start and end of --range must have the same format"));
    }

    let (start, _) = token_bounds(a)?;
    let (_, end) = token_bounds(b)?;

    if start > end {
        return Err(bad(format!("--range start {a} is after end {b}")));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_tokens() {
        assert_eq!(parse_range("2024").unwrap(), (d(2024, 1, 1), d(2024, 12, 31)));
        assert_eq!(parse_range("2024-02").unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(parse_range("2023-12").unwrap(), (d(2023, 12, 1), d(2023, 12, 31)));
        assert_eq!(parse_range("2024-01-05").unwrap(), (d(2024, 1, 5), d(2024, 1, 5)));
    }

    #[test]
    fn intervals() {
        assert_eq!(
            parse_range("2024-01:2024-03").unwrap(),
            (d(2024, 1, 1), d(2024, 3, 31))
        );
        assert_eq!(
            parse_range("2023:2024").unwrap(),
            (d(2023, 1, 1), d(2024, 12, 31))
        );
    }

    #[test]
    fn rejects_malformed_ranges() {
        assert!(parse_range("2024-13").is_err());
        assert!(parse_range("2024:2024-02").is_err());
        assert!(parse_range("2024-03:2024-01").is_err());
        assert!(parse_range("last week").is_err());
    }
}
