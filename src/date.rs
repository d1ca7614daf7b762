//! Russian-locale dates as the portal prints them:
//! `17 декабря 2018 г.` and `17 декабря 2018 г. 18:09`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::DateParseError;

/// Genitive month names, January first.
const MONTHS: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<day>\d{1,2})\s+(?P<month>\p{L}+)\s+(?P<year>\d{1,4})\s*г\.?(?:\s*,?\s*(?P<hour>\d{1,2}):(?P<minute>\d{2}))?\s*$",
    )
    .expect("date pattern is valid")
});

/// Resolves a genitive month name to its number (1 = January).
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Parses a portal date. A missing time part means midnight.
pub fn parse(text: &str) -> Result<NaiveDateTime, DateParseError> {
    let caps = DATE_RE
        .captures(text)
        .ok_or_else(|| DateParseError::Malformed(text.trim().to_string()))?;

    let month = month_number(&caps["month"])
        .ok_or_else(|| DateParseError::UnknownMonth(caps["month"].to_string()))?;
    let out_of_range = || DateParseError::OutOfRange(text.trim().to_string());

    let day: u32 = caps["day"].parse().map_err(|_| out_of_range())?;
    let year: i32 = caps["year"].parse().map_err(|_| out_of_range())?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)?;

    let time = match (caps.name("hour"), caps.name("minute")) {
        (Some(h), Some(m)) => {
            let hour = h.as_str().parse().map_err(|_| out_of_range())?;
            let minute = m.as_str().parse().map_err(|_| out_of_range())?;
            NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(out_of_range)?
        }
        _ => NaiveTime::MIN,
    };

    Ok(date.and_time(time))
}

/// Lenient variant for list extraction: unknown dates become `None`.
pub fn parse_opt(text: &str) -> Option<NaiveDateTime> {
    match parse(text) {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("Date unknown: {}", e);
            None
        }
    }
}

/// Renders a date the way the portal prints it, without the time part.
pub fn render(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{} {} {} г.",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_date_only() {
        let parsed = parse("17 декабря 2018 г.").unwrap();
        assert_eq!(parsed, ymd(2018, 12, 17).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn parses_date_with_time() {
        let parsed = parse("  17 декабря 2018 г. 18:09\n").unwrap();
        assert_eq!(parsed, ymd(2018, 12, 17).and_hms_opt(18, 9, 0).unwrap());
    }

    #[test]
    fn month_lookup_ignores_case() {
        assert_eq!(month_number("Мая"), Some(5));
        assert_eq!(month_number("май"), None);
    }

    #[test]
    fn rejects_unknown_month() {
        assert_eq!(
            parse("3 брюмера 2018 г."),
            Err(DateParseError::UnknownMonth("брюмера".to_string()))
        );
    }

    #[test]
    fn rejects_non_numeric_parts() {
        assert!(matches!(
            parse("десятое декабря 2018 г."),
            Err(DateParseError::Malformed(_))
        ));
        assert!(matches!(
            parse("10 декабря две тысячи г."),
            Err(DateParseError::Malformed(_))
        ));
        assert!(matches!(parse(""), Err(DateParseError::Malformed(_))));
    }

    #[test]
    fn rejects_impossible_day() {
        assert!(matches!(
            parse("31 февраля 2019 г."),
            Err(DateParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn render_then_parse_recovers_the_day() {
        for year in [1, 99, 1970, 2018, 2024, 9999] {
            for month in 1..=12 {
                for day in 1..=31 {
                    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                        continue;
                    };
                    let parsed = parse(&render(date)).unwrap();
                    assert_eq!(
                        (parsed.year(), parsed.month(), parsed.day()),
                        (year, month, day)
                    );
                }
            }
        }
    }
}
