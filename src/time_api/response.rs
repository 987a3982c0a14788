use serde::{Deserialize, Serialize};

/// Response structure for the time provider's current-time endpoint
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTimeResponse {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub seconds: u32,
    /// Local date and time, e.g. "2026-10-16T14:03:27.5416663"
    pub date_time: String,
    /// Local date in format "MM/DD/YYYY"
    pub date: String,
    /// Local time in format "HH:MM"
    pub time: String,
    pub time_zone: String,
    /// English weekday name (e.g. "Friday")
    pub day_of_week: String,
    pub dst_active: bool,
}

/// Request body for the conversion endpoint
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest<'a> {
    pub from_time_zone: &'a str,
    /// Source wall-clock time in format "YYYY-MM-DD HH:MM:SS"
    pub date_time: &'a str,
    pub to_time_zone: &'a str,
    /// Hint for ambiguous wall-clock times around DST changes; always sent empty
    pub dst_ambiguity: &'a str,
}

/// Response structure for the conversion endpoint
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    #[serde(default)]
    pub conversion_result: Option<ConversionResult>,
}

/// The converted wall-clock time in the target timezone
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionResult {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub time_zone: Option<String>,
    pub day_of_week: Option<String>,
    pub dst_active: Option<bool>,
}
