use crate::record::{DatePrecision, IncidentDate};
use crate::sheet::Cell;
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted full-date layouts, tried in order. The order is the tie-break for
/// ambiguous day/month strings: `01/02/2020` is read day-first.
///
/// Each layout is gated by a shape pattern so that, for example, a two-digit
/// year never satisfies `%Y`.
static FULL_DATE_FORMATS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
        (r"^\d{1,2}/\d{1,2}/\d{4}$", "%d/%m/%Y"),
        (r"^\d{1,2}/\d{1,2}/\d{4}$", "%m/%d/%Y"),
        (r"^\d{4}/\d{1,2}/\d{1,2}$", "%Y/%m/%d"),
    ]
    .into_iter()
    .map(|(re, fmt)| (Regex::new(re).expect("static regex"), fmt))
    .collect()
});

static YEAR_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("static regex"));
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("static regex"));
static COMPACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("static regex"));

/// Outcome of standardizing one raw date value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandardizedDate {
    Known(IncidentDate),
    /// The source cell was empty.
    Missing,
    /// The cell held something that is not a recognisable date.
    Unparseable(String),
}

impl StandardizedDate {
    /// `(date_or_absent, precision_or_absent)`.
    pub fn into_parts(self) -> (Option<NaiveDate>, Option<DatePrecision>) {
        match self {
            StandardizedDate::Known(d) => (Some(d.date), Some(d.precision)),
            _ => (None, None),
        }
    }

    pub fn known(&self) -> Option<IncidentDate> {
        match self {
            StandardizedDate::Known(d) => Some(*d),
            _ => None,
        }
    }
}

/// Converts heterogeneous date cells into a calendar date plus precision.
/// Never fails: anything unrecognised comes back as `Unparseable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateStandardizer;

impl DateStandardizer {
    pub fn standardize(&self, raw: &Cell) -> StandardizedDate {
        match raw {
            c if c.is_missing() => StandardizedDate::Missing,
            Cell::DateTime(dt) => StandardizedDate::Known(IncidentDate::full(dt.date())),
            Cell::Text(s) => parse_str(s.trim()),
            // a year typed into a spreadsheet arrives as a number
            Cell::Int(_) | Cell::Float(_) => match raw.text() {
                Some(t) if YEAR_ONLY.is_match(&t) => parse_str(&t),
                t => StandardizedDate::Unparseable(t.unwrap_or_default()),
            },
            other => StandardizedDate::Unparseable(other.text().unwrap_or_default()),
        }
    }

    /// `YYYYMMDD` held as an integer or text, falling back to [`standardize`].
    ///
    /// [`standardize`]: DateStandardizer::standardize
    pub fn standardize_compact(&self, raw: &Cell) -> StandardizedDate {
        let compact = match raw {
            Cell::Int(_) | Cell::Float(_) | Cell::Text(_) => raw.text(),
            _ => None,
        };
        if let Some(caps) = compact.as_deref().and_then(|s| COMPACT.captures(s)) {
            let ymd = (caps[1].parse(), caps[2].parse(), caps[3].parse());
            if let (Ok(y), Ok(m), Ok(d)) = ymd {
                if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                    return StandardizedDate::Known(IncidentDate::full(date));
                }
            }
            return StandardizedDate::Unparseable(caps[0].to_string());
        }
        self.standardize(raw)
    }

    /// Spreadsheet serial day number (epoch 1899-12-30), falling back to
    /// [`standardize`](DateStandardizer::standardize) for non-numeric cells.
    pub fn standardize_serial(&self, raw: &Cell) -> StandardizedDate {
        let serial = match raw {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        };
        match serial {
            Some(days) => excel_serial_to_date(days)
                .map(|d| StandardizedDate::Known(IncidentDate::full(d)))
                .unwrap_or_else(|| StandardizedDate::Unparseable(days.to_string())),
            None => self.standardize(raw),
        }
    }
}

fn parse_str(s: &str) -> StandardizedDate {
    for (shape, fmt) in FULL_DATE_FORMATS.iter() {
        if !shape.is_match(s) {
            continue;
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return StandardizedDate::Known(IncidentDate::full(date));
        }
    }

    if YEAR_ONLY.is_match(s) {
        if let Some(date) = s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
            return StandardizedDate::Known(IncidentDate::new(date, DatePrecision::YearOnly));
        }
    }

    if let Some(caps) = YEAR_MONTH.captures(s) {
        if let (Ok(y), Ok(m)) = (caps[1].parse(), caps[2].parse()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, 1) {
                return StandardizedDate::Known(IncidentDate::new(date, DatePrecision::YearMonth));
            }
        }
    }

    StandardizedDate::Unparseable(s.to_string())
}

/// Whole days after 1899-12-30; the fractional time-of-day part is dropped.
pub fn excel_serial_to_date(days: f64) -> Option<NaiveDate> {
    if !(0.0..=2_958_465.0).contains(&days) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(days.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn std_text(s: &str) -> (Option<NaiveDate>, Option<DatePrecision>) {
        DateStandardizer.standardize(&Cell::Text(s.into())).into_parts()
    }

    #[test]
    fn full_date_formats() {
        let full = Some(DatePrecision::FullDate);
        assert_eq!(std_text("2019-03-05"), (Some(ymd(2019, 3, 5)), full));
        assert_eq!(std_text("25/12/2018"), (Some(ymd(2018, 12, 25)), full));
        assert_eq!(std_text("12/25/2018"), (Some(ymd(2018, 12, 25)), full));
        assert_eq!(std_text("2018/12/25"), (Some(ymd(2018, 12, 25)), full));
    }

    #[test]
    fn ambiguous_day_month_resolves_day_first() {
        assert_eq!(
            std_text("01/02/2020"),
            (Some(ymd(2020, 2, 1)), Some(DatePrecision::FullDate))
        );
    }

    #[test]
    fn partial_dates_carry_precision() {
        assert_eq!(
            std_text("2020"),
            (Some(ymd(2020, 1, 1)), Some(DatePrecision::YearOnly))
        );
        assert_eq!(
            std_text("2020-05"),
            (Some(ymd(2020, 5, 1)), Some(DatePrecision::YearMonth))
        );
    }

    #[test]
    fn unparseable_and_missing_are_absent() {
        assert_eq!(
            DateStandardizer.standardize(&Cell::Text("not-a-date".into())),
            StandardizedDate::Unparseable("not-a-date".into())
        );
        assert_eq!(std_text("not-a-date"), (None, None));
        assert_eq!(std_text("2020-13"), (None, None));
        assert_eq!(std_text("01/02/20"), (None, None));
        assert_eq!(
            DateStandardizer.standardize(&Cell::Empty),
            StandardizedDate::Missing
        );
        assert_eq!(
            DateStandardizer.standardize(&Cell::Text("   ".into())),
            StandardizedDate::Missing
        );
    }

    #[test]
    fn native_datetime_is_full_date() {
        let dt = NaiveDateTime::parse_from_str("2021-07-09 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            DateStandardizer.standardize(&Cell::DateTime(dt)).into_parts(),
            (Some(ymd(2021, 7, 9)), Some(DatePrecision::FullDate))
        );
    }

    #[test]
    fn numbers_are_only_years_for_plain_standardize() {
        assert_eq!(
            DateStandardizer.standardize(&Cell::Float(2019.0)).into_parts(),
            (Some(ymd(2019, 1, 1)), Some(DatePrecision::YearOnly))
        );
        assert!(matches!(
            DateStandardizer.standardize(&Cell::Int(44197)),
            StandardizedDate::Unparseable(_)
        ));
    }

    #[test]
    fn compact_dates() {
        let s = DateStandardizer;
        assert_eq!(
            s.standardize_compact(&Cell::Int(20230105)).known(),
            Some(IncidentDate::full(ymd(2023, 1, 5)))
        );
        assert_eq!(
            s.standardize_compact(&Cell::Text("20231231".into())).known(),
            Some(IncidentDate::full(ymd(2023, 12, 31)))
        );
        assert!(matches!(
            s.standardize_compact(&Cell::Int(20231340)),
            StandardizedDate::Unparseable(_)
        ));
        // falls back to the general formats
        assert_eq!(
            s.standardize_compact(&Cell::Text("2023-02-01".into())).known(),
            Some(IncidentDate::full(ymd(2023, 2, 1)))
        );
    }

    #[test]
    fn serial_dates() {
        let s = DateStandardizer;
        assert_eq!(
            s.standardize_serial(&Cell::Float(44197.0)).known(),
            Some(IncidentDate::full(ymd(2021, 1, 1)))
        );
        assert_eq!(
            s.standardize_serial(&Cell::Int(1)).known(),
            Some(IncidentDate::full(ymd(1899, 12, 31)))
        );
        assert_eq!(
            s.standardize_serial(&Cell::Float(44197.75)).known(),
            Some(IncidentDate::full(ymd(2021, 1, 1)))
        );
        assert!(matches!(
            s.standardize_serial(&Cell::Float(-3.0)),
            StandardizedDate::Unparseable(_)
        ));
        assert_eq!(s.standardize_serial(&Cell::Empty), StandardizedDate::Missing);
    }
}
