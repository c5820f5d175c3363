// src/record/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How much of an incident date the source actually knew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    FullDate,
    YearMonth,
    YearOnly,
}

impl DatePrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePrecision::FullDate => "full_date",
            DatePrecision::YearMonth => "year_month",
            DatePrecision::YearOnly => "year_only",
        }
    }
}

impl FromStr for DatePrecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_date" => Ok(DatePrecision::FullDate),
            "year_month" => Ok(DatePrecision::YearMonth),
            "year_only" => Ok(DatePrecision::YearOnly),
            other => Err(format!("unknown date precision `{}`", other)),
        }
    }
}

impl fmt::Display for DatePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar date paired with its precision tag; a record carries both or
/// neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDate {
    pub date: NaiveDate,
    pub precision: DatePrecision,
}

impl IncidentDate {
    pub fn new(date: NaiveDate, precision: DatePrecision) -> Self {
        Self { date, precision }
    }

    pub fn full(date: NaiveDate) -> Self {
        Self::new(date, DatePrecision::FullDate)
    }
}

/// Either a single descriptive string or a flat, ordered bag of named
/// sub-fields (cause, category, flooding sub-type, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncidentType {
    Text(String),
    Fields(Vec<(String, String)>),
}

impl IncidentType {
    pub fn text(s: impl Into<String>) -> Self {
        IncidentType::Text(s.into())
    }

    /// Build a structured type, dropping sub-fields whose value is absent.
    /// Returns `None` when no sub-field survives.
    pub fn fields<K: Into<String>>(
        pairs: impl IntoIterator<Item = (K, Option<String>)>,
    ) -> Option<Self> {
        let kept: Vec<(String, String)> = pairs
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.into(), v)))
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(IncidentType::Fields(kept))
        }
    }

    /// Look up a named sub-field. A text type has no sub-fields.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            IncidentType::Text(_) => None,
            IncidentType::Fields(pairs) => pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Single-string rendering used for the flat `incident_type` column.
    /// Structured types join their values in insertion order with `" - "`.
    pub fn label(&self) -> String {
        match self {
            IncidentType::Text(s) => s.clone(),
            IncidentType::Fields(pairs) => pairs
                .iter()
                .map(|(_, v)| v.as_str())
                .collect::<Vec<_>>()
                .join(" - "),
        }
    }
}

/// Location with a fixed optional vocabulary. Unknown parts stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

impl Location {
    pub const KEYS: [&'static str; 4] = ["postcode", "town", "district", "county"];

    pub fn postcode(mut self, v: Option<String>) -> Self {
        self.postcode = v;
        self
    }

    pub fn town(mut self, v: Option<String>) -> Self {
        self.town = v;
        self
    }

    pub fn district(mut self, v: Option<String>) -> Self {
        self.district = v;
        self
    }

    pub fn county(mut self, v: Option<String>) -> Self {
        self.county = v;
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "postcode" => self.postcode.as_deref(),
            "town" => self.town.as_deref(),
            "district" => self.district.as_deref(),
            "county" => self.county.as_deref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Self::KEYS.iter().all(|k| self.get(k).is_none())
    }
}

/// The unified incident representation every source is mapped into.
///
/// Fields are private: a record is built once by an adapter and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    source_name: String,
    incident_date: Option<IncidentDate>,
    incident_type: Option<IncidentType>,
    location: Location,
}

impl CanonicalRecord {
    pub fn new(
        source_name: impl Into<String>,
        incident_date: Option<IncidentDate>,
        incident_type: Option<IncidentType>,
        location: Location,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            incident_date,
            incident_type,
            location,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn incident_date(&self) -> Option<NaiveDate> {
        self.incident_date.map(|d| d.date)
    }

    pub fn date_precision(&self) -> Option<DatePrecision> {
        self.incident_date.map(|d| d.precision)
    }

    pub fn incident_type(&self) -> Option<&IncidentType> {
        self.incident_type.as_ref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_present_iff_date_present() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let with = CanonicalRecord::new(
            "A",
            Some(IncidentDate::new(d, DatePrecision::YearOnly)),
            None,
            Location::default(),
        );
        assert_eq!(with.incident_date(), Some(d));
        assert_eq!(with.date_precision(), Some(DatePrecision::YearOnly));

        let without = CanonicalRecord::new("A", None, None, Location::default());
        assert!(without.incident_date().is_none());
        assert!(without.date_precision().is_none());
    }

    #[test]
    fn fields_drop_absent_values_and_render_in_order() {
        let t = IncidentType::fields([
            ("cause", Some("Blockage".to_string())),
            ("flooding_type", None),
            ("flooding_sub_type", Some("Sub-type 2".to_string())),
        ])
        .unwrap();
        assert_eq!(t.field("cause"), Some("Blockage"));
        assert_eq!(t.field("flooding_type"), None);
        assert_eq!(t.label(), "Blockage - Sub-type 2");

        assert!(IncidentType::fields([("cause", None::<String>)]).is_none());
    }

    #[test]
    fn location_omits_absent_keys_when_serialized() {
        let loc = Location::default()
            .postcode(Some("AB1".into()))
            .county(None);
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json, serde_json::json!({ "postcode": "AB1" }));
        assert!(!loc.is_empty());
        assert!(Location::default().is_empty());
    }

    #[test]
    fn precision_parses_from_its_stored_tag() {
        for p in [
            DatePrecision::FullDate,
            DatePrecision::YearMonth,
            DatePrecision::YearOnly,
        ] {
            assert_eq!(p.as_str().parse::<DatePrecision>(), Ok(p));
            assert_eq!(p.to_string().parse::<DatePrecision>(), Ok(p));
        }
        let err = "day".parse::<DatePrecision>().unwrap_err();
        assert!(err.contains("`day`"));
    }
}
