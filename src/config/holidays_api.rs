//! Optional convenience for populating `calendar.json`: fetches a region's
//! public holidays from the Nager.Date public holiday service.
//!
//! Grounded in the teacher's `api::fetch_public_holidays` (which populated a
//! SQLite table via an async `reqwest::get`); generalized here to a blocking
//! client producing a `calendar.json`-shaped fragment instead, since the
//! core no longer needs an async runtime (see SPEC_FULL.md §5). This module
//! is never called from `generate` - only from the `import-holidays` CLI
//! subcommand - so it cannot affect the determinism of a solve.

use log::{error, info};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct NagerDateCountry {
    #[serde(rename = "countryCode")]
    pub country_code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NagerDateHoliday {
    pub date: chrono::NaiveDate,
    #[serde(rename = "localName")]
    pub local_name: String,
}

pub fn fetch_available_countries() -> Result<Vec<NagerDateCountry>> {
    info!("fetching available countries from Nager.Date");
    let url = "https://date.nager.at/api/v3/AvailableCountries";
    let resp = reqwest::blocking::get(url)?.json::<Vec<NagerDateCountry>>();
    match resp {
        Ok(countries) => Ok(countries),
        Err(e) => {
            error!("failed to parse available countries: {e}");
            Err(e.into())
        }
    }
}

pub fn fetch_public_holidays(country_code: &str, year: i32) -> Result<Vec<NagerDateHoliday>> {
    info!("fetching public holidays for {country_code} {year}");
    let url = format!("https://date.nager.at/api/v3/PublicHolidays/{year}/{country_code}");
    let resp = reqwest::blocking::get(&url)?.json::<Vec<NagerDateHoliday>>();
    match resp {
        Ok(holidays) => Ok(holidays),
        Err(e) => {
            error!("failed to parse public holidays for {country_code} {year}: {e}");
            Err(e.into())
        }
    }
}
