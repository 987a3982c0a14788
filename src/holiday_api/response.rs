use serde::Deserialize;

/// One entry of the holiday provider's country list
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// ISO-3166-1 alpha-2 code, e.g. "US"
    pub country_code: String,
    pub name: String,
}

/// One public holiday as returned by the holiday provider
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicHoliday {
    /// Date in format "YYYY-MM-DD"
    pub date: String,
    /// Name in the country's own language
    pub local_name: String,
    /// English name
    pub name: String,
    /// Whether the holiday applies to the whole country rather than some subdivisions
    #[serde(default)]
    pub global: bool,
    /// Holiday classes such as "Public" or "Bank"
    #[serde(default)]
    pub types: Vec<String>,
}
