//! Natural-language date parsing
//!
//! Listing pages carry dates as `"<day> <month-name> [, <year>]"` strings;
//! the parsed value is only a sort key for "most recent". Malformed input
//! yields `None`, never an error: the scanner must treat unparsable dates as
//! "exclude from ranking", not "abort the scan".

use chrono::{Datelike, Local, NaiveDate};
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in Spanish month names
static SPANISH_MONTHS: phf::Map<&'static str, u32> = phf_map! {
    "enero" => 1,
    "febrero" => 2,
    "marzo" => 3,
    "abril" => 4,
    "mayo" => 5,
    "junio" => 6,
    "julio" => 7,
    "agosto" => 8,
    "septiembre" => 9,
    "setiembre" => 9,
    "octubre" => 10,
    "noviembre" => 11,
    "diciembre" => 12,
};

/// Month-name lookup table, lowercased names to month numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthTable(HashMap<String, u32>);

impl MonthTable {
    /// Build a table from arbitrary name/number pairs
    pub fn new(map: HashMap<String, u32>) -> Self {
        MonthTable(map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect())
    }

    /// The built-in Spanish table
    pub fn spanish() -> Self {
        MonthTable(
            SPANISH_MONTHS
                .entries()
                .map(|(name, month)| (name.to_string(), *month))
                .collect(),
        )
    }

    /// Case-insensitive month lookup
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.0.get(&name.to_lowercase()).copied()
    }
}

impl Default for MonthTable {
    fn default() -> Self {
        Self::spanish()
    }
}

/// Parse a date string, assuming the current year when none is given
pub fn parse(text: &str, months: &MonthTable) -> Option<NaiveDate> {
    parse_with_year(text, months, Local::now().year())
}

/// Parse a date string against an explicit "current year"
pub fn parse_with_year(text: &str, months: &MonthTable, current_year: i32) -> Option<NaiveDate> {
    let cleaned = text.replace(',', " ");

    // "5 de marzo de 2024" carries filler words between the fields
    let tokens: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("de") && !t.eq_ignore_ascii_case("del"))
        .collect();

    let (day_token, month_token, year_token) = match tokens.as_slice() {
        [day, month] => (*day, *month, None),
        [day, month, year] => (*day, *month, Some(*year)),
        _ => return None,
    };

    let day: u32 = day_token.parse().ok()?;
    let month = months.lookup(month_token)?;
    let year: i32 = match year_token {
        Some(year) => year.parse().ok()?,
        None => current_year,
    };

    // Out-of-range days ("32 marzo") fail here
    NaiveDate::from_ymd_opt(year, month, day)
}
