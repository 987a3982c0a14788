mod response;

pub use response::{Country, PublicHoliday};

use crate::error::AppError;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

const PROVIDER: &str = "Holiday API";

/// Client for a Nager.Date-compatible public holiday provider.
#[derive(Clone, Debug)]
pub struct HolidayApi {
    client: reqwest::Client,
    base_url: String,
}

impl HolidayApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Lists the countries the provider has holiday data for, in provider order.
    pub async fn available_countries(&self) -> Result<Vec<Country>, AppError> {
        info!("Fetching available countries");
        let url = format!("{}/api/v3/AvailableCountries", self.base_url);
        let response = self.client.get(&url).send().await?;
        let countries: Vec<Country> = decode(response).await?;
        debug!("Fetched {} countries", countries.len());
        Ok(countries)
    }

    /// Fetches the public holidays of `country_code` in `year`.
    ///
    /// The country code is sent as given, escaped as a single path segment;
    /// callers normalise casing.
    pub async fn public_holidays(
        &self,
        year: i32,
        country_code: &str,
    ) -> Result<Vec<PublicHoliday>, AppError> {
        info!("Fetching {} holidays for {}", year, country_code);
        let mut url = reqwest::Url::parse(&format!("{}/api/v3/PublicHolidays", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(&year.to_string())
            .push(country_code);
        let response = self.client.get(url).send().await?;
        let holidays: Vec<PublicHoliday> = decode(response).await?;
        debug!("Holiday data fetched successfully: {:?}", holidays);
        Ok(holidays)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json().await?)
    } else {
        error!("Failed to fetch holiday data: {}", status);
        Err(AppError::UpstreamStatus {
            provider: PROVIDER,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    pub(crate) fn holidays_body() -> Value {
        json!([
            {
                "date": "2026-01-01",
                "localName": "New Year's Day",
                "name": "New Year's Day",
                "countryCode": "US",
                "fixed": false,
                "global": true,
                "counties": null,
                "launchYear": null,
                "types": ["Public"]
            },
            {
                "date": "2026-10-12",
                "localName": "Columbus Day",
                "name": "Columbus Day",
                "countryCode": "US",
                "fixed": false,
                "global": false,
                "counties": ["US-AL", "US-AZ"],
                "launchYear": null,
                "types": ["Public"]
            },
            {
                "date": "2026-11-11",
                "localName": "Veterans Day",
                "name": "Veterans Day",
                "countryCode": "US",
                "fixed": false,
                "global": true,
                "counties": null,
                "launchYear": null,
                "types": ["Public"]
            },
            {
                "date": "2026-11-26",
                "localName": "Thanksgiving Day",
                "name": "Thanksgiving Day",
                "countryCode": "US",
                "fixed": false,
                "global": true,
                "counties": null,
                "launchYear": 1863,
                "types": ["Public"]
            },
            {
                "date": "2026-12-25",
                "localName": "Christmas Day",
                "name": "Christmas Day",
                "countryCode": "US",
                "fixed": false,
                "global": true,
                "counties": null,
                "launchYear": null,
                "types": ["Public", "Bank"]
            }
        ])
    }

    #[tokio::test]
    async fn public_holidays_are_keyed_by_year_and_country() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/v3/PublicHolidays/2026/US"))
            .respond_with(ResponseTemplate::new(200).set_body_json(holidays_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = HolidayApi::new(reqwest::Client::new(), mock_server.uri());
        let holidays = api.public_holidays(2026, "US").await.unwrap();

        assert_eq!(holidays.len(), 5);
        assert_eq!(holidays[1].name, "Columbus Day");
        assert!(!holidays[1].global);
        assert_eq!(holidays[4].types, vec!["Public", "Bank"]);
    }

    #[tokio::test]
    async fn country_code_stays_inside_its_path_segment() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/v3/PublicHolidays/2026/%3FX"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/v3/PublicHolidays/2026/%23X"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = HolidayApi::new(reqwest::Client::new(), mock_server.uri());
        assert!(api.public_holidays(2026, "?X").await.unwrap().is_empty());
        assert!(api.public_holidays(2026, "#X").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn countries_keep_provider_order() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/v3/AvailableCountries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "countryCode": "ZA", "name": "South Africa" },
                { "countryCode": "AD", "name": "Andorra" }
            ])))
            .mount(&mock_server)
            .await;

        let api = HolidayApi::new(reqwest::Client::new(), mock_server.uri());
        let countries = api.available_countries().await.unwrap();

        assert_eq!(countries[0].country_code, "ZA");
        assert_eq!(countries[1].name, "Andorra");
    }

    #[tokio::test]
    async fn missing_country_is_reported_with_code() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let api = HolidayApi::new(reqwest::Client::new(), mock_server.uri());
        let err = api.public_holidays(2026, "XX").await.unwrap_err();

        assert_eq!(err.to_string(), "Holiday API error: 404");
    }
}
