//! Time Zone API client

use super::{GoogleTransport, Host, check_envelope_status};
use crate::models::{Coordinates, TimezoneInfo};
use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Time Zone API client
pub struct TimeZoneClient {
    transport: Arc<GoogleTransport>,
}

/// Time Zone API response
#[derive(Debug, Deserialize)]
pub struct TimeZoneResponse {
    pub status: String,
    #[serde(rename = "timeZoneId")]
    pub time_zone_id: Option<String>,
    #[serde(rename = "timeZoneName")]
    pub time_zone_name: Option<String>,
    #[serde(rename = "rawOffset")]
    pub raw_offset: Option<i32>,
    #[serde(rename = "dstOffset")]
    pub dst_offset: Option<i32>,
}

impl TimeZoneResponse {
    fn into_info(self) -> Option<TimezoneInfo> {
        Some(TimezoneInfo {
            time_zone_id: self.time_zone_id?,
            time_zone_name: self.time_zone_name?,
            raw_offset: self.raw_offset.unwrap_or(0),
            dst_offset: self.dst_offset.unwrap_or(0),
        })
    }
}

impl TimeZoneClient {
    #[must_use]
    pub fn new(transport: Arc<GoogleTransport>) -> Self {
        Self { transport }
    }

    /// Get timezone information for coordinates
    ///
    /// The timestamp determines whether DST applies; it defaults to now.
    pub async fn timezone(
        &self,
        coordinates: Coordinates,
        timestamp: Option<i64>,
    ) -> Result<Option<TimezoneInfo>> {
        let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());
        debug!(
            "Timezone lookup for ({:.4}, {:.4}) at {}",
            coordinates.latitude, coordinates.longitude, timestamp
        );

        let response: TimeZoneResponse = self
            .transport
            .get_json(
                Host::Maps,
                "timezone/json",
                &[
                    ("location", coordinates.to_query_param()),
                    ("timestamp", timestamp.to_string()),
                ],
            )
            .await?;

        check_envelope_status(&response.status, "timezone")?;

        Ok(response.into_info())
    }
}
