use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::NetworkConfig;
use crate::error::ScheduleError;

/// Annual calendar response from the timing provider.
///
/// `data` maps month numbers ("1".."12") to that month's day records. The
/// provider sends many more fields than listed here; everything not needed
/// downstream is ignored at deserialization.
#[derive(Debug, Deserialize)]
pub struct CalendarResponse {
    /// Provider-reported status fields, preserved for API contract completeness.
    #[allow(dead_code)]
    pub code: Option<u16>,
    #[allow(dead_code)]
    pub status: Option<String>,
    pub data: HashMap<String, Vec<DayRecord>>,
}

/// One provider day record: nested timings plus a nested date.
///
/// Fields are optional so a day with a missing section deserializes and is
/// rejected with a precise error by the normalizer instead of a generic
/// decode failure.
#[derive(Debug, Deserialize)]
pub struct DayRecord {
    pub timings: Option<DayTimings>,
    pub date: Option<DayDate>,
}

/// The five prayer timestamps we keep. Sunrise, sunset, imsak, midnight and
/// the night thirds are dropped here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayTimings {
    pub fajr: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DayDate {
    pub readable: Option<String>,
    pub gregorian: Option<GregorianDate>,
}

#[derive(Debug, Deserialize)]
pub struct GregorianDate {
    /// `DD-MM-YYYY`
    pub date: Option<String>,
}

/// HTTP client for the AlAdhan calendar-by-address endpoint.
#[derive(Clone, Debug)]
pub struct AdhanApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdhanApiClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(base_url: String, network_config: &NetworkConfig) -> Result<Self, ScheduleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Fetch the full year of adhan times for an address.
    ///
    /// `iso8601` and `annual` are fixed: the normalizer depends on ISO-8601
    /// timestamps and a month-keyed annual payload.
    pub async fn fetch_annual_timings(
        &self,
        address: &str,
        year: i32,
        method: u32,
    ) -> Result<CalendarResponse, ScheduleError> {
        let url = format!("{}/v1/calendarByAddress", self.base_url);
        let year = year.to_string();
        let method = method.to_string();

        tracing::debug!("Requesting annual calendar from {}", url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("address", address),
                ("iso8601", "true"),
                ("annual", "true"),
                ("year", &year),
                ("method", &method),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScheduleError::Provider { status });
        }

        response
            .json::<CalendarResponse>()
            .await
            .map_err(|e| ScheduleError::MalformedResponse(format!("calendar decode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Payload Deserialization Tests ====================

    #[test]
    fn test_day_record_deserializes_known_shape() {
        let json = r#"{
            "timings": {
                "Fajr": "2023-01-01T05:38:00-08:00 (PST)",
                "Sunrise": "2023-01-01T06:51:00-08:00 (PST)",
                "Dhuhr": "2023-01-01T11:52:00-08:00 (PST)",
                "Asr": "2023-01-01T14:35:00-08:00 (PST)",
                "Maghrib": "2023-01-01T16:53:00-08:00 (PST)",
                "Isha": "2023-01-01T18:06:00-08:00 (PST)",
                "Imsak": "2023-01-01T05:28:00-08:00 (PST)"
            },
            "date": {
                "readable": "01 Jan 2023",
                "timestamp": "1672592461",
                "gregorian": {
                    "date": "01-01-2023",
                    "format": "DD-MM-YYYY",
                    "weekday": {"en": "Sunday"}
                }
            }
        }"#;

        let record: DayRecord = serde_json::from_str(json).unwrap();
        let timings = record.timings.unwrap();
        assert_eq!(
            timings.fajr.as_deref(),
            Some("2023-01-01T05:38:00-08:00 (PST)")
        );
        assert_eq!(
            timings.isha.as_deref(),
            Some("2023-01-01T18:06:00-08:00 (PST)")
        );

        let date = record.date.unwrap();
        assert_eq!(date.readable.as_deref(), Some("01 Jan 2023"));
        assert_eq!(date.gregorian.unwrap().date.as_deref(), Some("01-01-2023"));
    }

    #[test]
    fn test_day_record_tolerates_missing_sections() {
        // Shape problems are the normalizer's to report, not serde's.
        let record: DayRecord = serde_json::from_str(r#"{"date": {"readable": "x"}}"#).unwrap();
        assert!(record.timings.is_none());

        let record: DayRecord = serde_json::from_str(r#"{"timings": {}}"#).unwrap();
        assert!(record.timings.unwrap().fajr.is_none());
    }

    #[test]
    fn test_calendar_response_is_month_keyed() {
        let json = r#"{
            "code": 200,
            "status": "OK",
            "data": {"1": [], "2": []}
        }"#;
        let resp: CalendarResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.len(), 2);
        assert!(resp.data.contains_key("1"));
    }

    // ==================== Client Construction Tests ====================

    #[test]
    fn test_api_client_creation() {
        let config = NetworkConfig {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        };
        let result = AdhanApiClient::new("http://api.aladhan.com".to_string(), &config);
        assert!(result.is_ok());
    }
}
