//! Output shapes of the metered handlers, serialized in camelCase.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::holiday_api::{Country, PublicHoliday};
use crate::time_api::CurrentTimeResponse;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewOutput {
    pub total_timezones: usize,
    pub total_countries: usize,
    pub sample_timezones: Vec<&'static str>,
    pub countries: Vec<CountrySummary>,
    /// Entrypoint key -> human description with price
    pub endpoints: BTreeMap<&'static str, String>,
    pub generated_at: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country_code: String,
    pub name: String,
}

impl From<Country> for CountrySummary {
    fn from(country: Country) -> Self {
        Self {
            country_code: country.country_code,
            name: country.name,
        }
    }
}

/// Wall-clock snapshot of one timezone.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTime {
    pub timezone: String,
    pub date_time: String,
    pub date: String,
    pub time: String,
    pub day_of_week: String,
    pub dst_active: bool,
}

impl From<CurrentTimeResponse> for ZoneTime {
    fn from(time: CurrentTimeResponse) -> Self {
        Self {
            timezone: time.time_zone,
            date_time: time.date_time,
            date: time.date,
            time: time.time,
            day_of_week: time.day_of_week,
            dst_active: time.dst_active,
        }
    }
}

/// Single-zone detail: the snapshot plus its broken-down fields.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTimeOutput {
    #[serde(flatten)]
    pub zone: ZoneTime,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub seconds: u32,
}

impl From<CurrentTimeResponse> for CurrentTimeOutput {
    fn from(time: CurrentTimeResponse) -> Self {
        let (year, month, day, hour, minute, seconds) = (
            time.year,
            time.month,
            time.day,
            time.hour,
            time.minute,
            time.seconds,
        );
        Self {
            zone: time.into(),
            year,
            month,
            day,
            hour,
            minute,
            seconds,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub original: OriginalTime,
    pub converted: ConvertedTime,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OriginalTime {
    pub timezone: String,
    pub date_time: String,
}

/// Everything but `timezone` is absent when the provider sent no conversion result.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedTime {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_active: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HolidaysOutput {
    pub country_code: String,
    pub year: i32,
    pub total_holidays: usize,
    pub holidays: Vec<Holiday>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub date: String,
    pub name: String,
    pub local_name: String,
    pub is_global: bool,
    pub types: Vec<String>,
}

impl From<PublicHoliday> for Holiday {
    fn from(holiday: PublicHoliday) -> Self {
        Self {
            date: holiday.date,
            name: holiday.name,
            local_name: holiday.local_name,
            is_global: holiday.global,
            types: holiday.types,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MultiZoneOutput {
    pub count: usize,
    pub results: Vec<ZoneSlot>,
    pub generated_at: String,
}

/// Result slot of one timezone in a multi-zone call.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ZoneSlot {
    Ok(ZoneTime),
    Failed { timezone: String, error: String },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FullReportOutput {
    pub timezone: ZoneTime,
    pub country: CountryReport,
    pub generated_at: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountryReport {
    pub country_code: String,
    pub total_holidays: usize,
    pub upcoming_holidays: Vec<UpcomingHoliday>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingHoliday {
    pub date: String,
    pub name: String,
    /// `None` (serialized as null) when the provider's date does not parse
    pub days_until: Option<i64>,
}
