//! The metered handlers. Each one validates its input, calls one or two upstream
//! providers and reshapes the answer; none of them keeps state between calls.

pub mod output;

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{error, info};

use crate::entrypoints::{self, ENTRYPOINTS};
use crate::error::AppError;
use crate::holiday_api::{HolidayApi, PublicHoliday};
use crate::time_api::TimeApi;
use output::*;

pub const SAMPLE_TIMEZONES: [&str; 11] = [
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Kolkata",
    "Australia/Sydney",
];

const OVERVIEW_COUNTRIES: usize = 10;
const MIN_ZONES: usize = 2;
const MAX_ZONES: usize = 10;
const UPCOMING_LIMIT: usize = 5;
const FETCH_FAILED: &str = "Failed to fetch";
const DAY_MS: i64 = 86_400_000;

#[derive(Deserialize, Debug, Default)]
pub struct OverviewInput {}

#[derive(Deserialize, Debug)]
pub struct CurrentTimeInput {
    pub timezone: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConvertInput {
    pub from_timezone: String,
    pub to_timezone: String,
    /// "YYYY-MM-DD HH:MM:SS", passed through unchecked
    pub date_time: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HolidaysInput {
    pub country_code: String,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct MultiZoneInput {
    pub timezones: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FullReportInput {
    pub timezone: String,
    pub country_code: String,
}

impl CurrentTimeInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timezone.is_empty() {
            return Err(AppError::InvalidInput("timezone must not be empty".into()));
        }
        Ok(())
    }
}

impl HolidaysInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_country_code(&self.country_code)
    }
}

impl MultiZoneInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let count = self.timezones.len();
        if !(MIN_ZONES..=MAX_ZONES).contains(&count) {
            return Err(AppError::InvalidInput(format!(
                "timezones must contain between {} and {} entries, got {}",
                MIN_ZONES, MAX_ZONES, count
            )));
        }
        Ok(())
    }
}

impl FullReportInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_country_code(&self.country_code)
    }
}

fn validate_country_code(code: &str) -> Result<(), AppError> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::InvalidInput(format!(
            "countryCode must be exactly 2 letters, got {:?}",
            code
        )));
    }
    Ok(())
}

/// Free overview: provider coverage counts, sample zones and the priced endpoint list.
pub async fn overview(
    time_api: &TimeApi,
    holiday_api: &HolidayApi,
    _input: OverviewInput,
) -> Result<OverviewOutput, AppError> {
    let (timezones, countries) = futures::try_join!(
        time_api.available_timezones(),
        holiday_api.available_countries()
    )?;

    let endpoints = ENTRYPOINTS
        .iter()
        .map(|e| {
            (
                e.key,
                format!("{} ({})", e.description, entrypoints::format_price(e.price)),
            )
        })
        .collect();

    Ok(OverviewOutput {
        total_timezones: timezones.len(),
        total_countries: countries.len(),
        sample_timezones: SAMPLE_TIMEZONES.to_vec(),
        countries: countries
            .into_iter()
            .take(OVERVIEW_COUNTRIES)
            .map(CountrySummary::from)
            .collect(),
        endpoints,
        generated_at: timestamp(Utc::now()),
    })
}

pub async fn current_time(
    time_api: &TimeApi,
    input: CurrentTimeInput,
) -> Result<CurrentTimeOutput, AppError> {
    input.validate()?;
    let time = time_api.current_time(&input.timezone).await?;
    Ok(time.into())
}

/// Converts a wall-clock time between zones. A response without a conversion
/// result is a partial answer, not an error.
pub async fn convert(time_api: &TimeApi, input: ConvertInput) -> Result<ConvertOutput, AppError> {
    let response = time_api
        .convert(&input.from_timezone, &input.to_timezone, &input.date_time)
        .await?;
    let result = response.conversion_result.unwrap_or_default();

    Ok(ConvertOutput {
        original: OriginalTime {
            timezone: input.from_timezone,
            date_time: input.date_time,
        },
        converted: ConvertedTime {
            timezone: input.to_timezone,
            date_time: result.date_time,
            date: result.date,
            time: result.time,
            day_of_week: result.day_of_week,
            dst_active: result.dst_active,
        },
    })
}

pub async fn holidays(
    holiday_api: &HolidayApi,
    input: HolidaysInput,
) -> Result<HolidaysOutput, AppError> {
    input.validate()?;
    let country_code = input.country_code.to_uppercase();
    let year = input.year.unwrap_or_else(|| Utc::now().year());

    let holidays = holiday_api.public_holidays(year, &country_code).await?;

    Ok(HolidaysOutput {
        country_code,
        year,
        total_holidays: holidays.len(),
        holidays: holidays.into_iter().map(Holiday::from).collect(),
    })
}

/// Fetches every zone concurrently. Results keep input order and a failed zone
/// only turns its own slot into an error marker.
pub async fn multi_zone(
    time_api: &TimeApi,
    input: MultiZoneInput,
) -> Result<MultiZoneOutput, AppError> {
    input.validate()?;

    let results: Vec<ZoneSlot> = stream::iter(input.timezones)
        .map(|timezone| async move {
            match time_api.current_time(&timezone).await {
                Ok(time) => ZoneSlot::Ok(time.into()),
                Err(e) => {
                    error!("Failed to fetch time for {}: {}", timezone, e);
                    ZoneSlot::Failed {
                        timezone,
                        error: FETCH_FAILED.to_string(),
                    }
                }
            }
        })
        .buffered(MAX_ZONES)
        .collect()
        .await;

    Ok(MultiZoneOutput {
        count: results.len(),
        results,
        generated_at: timestamp(Utc::now()),
    })
}

pub async fn full_report(
    time_api: &TimeApi,
    holiday_api: &HolidayApi,
    input: FullReportInput,
) -> Result<FullReportOutput, AppError> {
    input.validate()?;
    let country_code = input.country_code.to_uppercase();
    let now = Utc::now();

    let (time, holidays) = futures::try_join!(
        time_api.current_time(&input.timezone),
        holiday_api.public_holidays(now.year(), &country_code)
    )?;
    info!(
        "Building full report for {} / {} ({} holidays)",
        input.timezone,
        country_code,
        holidays.len()
    );

    Ok(FullReportOutput {
        timezone: time.into(),
        country: CountryReport {
            country_code,
            total_holidays: holidays.len(),
            upcoming_holidays: upcoming_holidays(&holidays, now),
        },
        generated_at: timestamp(now),
    })
}

/// Picks the first holidays dated today (UTC) or later, in provider order.
///
/// Dates are compared as zero-padded `YYYY-MM-DD` strings. `daysUntil` rounds
/// the distance from `now` to the holiday's UTC midnight up to whole days.
pub fn upcoming_holidays(holidays: &[PublicHoliday], now: DateTime<Utc>) -> Vec<UpcomingHoliday> {
    let today = now.format("%Y-%m-%d").to_string();
    holidays
        .iter()
        .filter(|holiday| holiday.date.as_str() >= today.as_str())
        .take(UPCOMING_LIMIT)
        .map(|holiday| UpcomingHoliday {
            date: holiday.date.clone(),
            name: holiday.name.clone(),
            days_until: days_until(&holiday.date, now),
        })
        .collect()
}

fn days_until(date: &str, now: DateTime<Utc>) -> Option<i64> {
    let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let ms = (midnight - now).num_milliseconds();
    let days = ms.div_euclid(DAY_MS);
    Some(if ms.rem_euclid(DAY_MS) > 0 { days + 1 } else { days })
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
