use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fossawork_core::work_order::WorkOrder;
use fossawork_core::work_week::WorkWeekConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::ClientError;

/// Client for the FossaWork backend REST API.
pub struct FossaworkBackend {
    client: Client,
    base_url: String,
}

impl FossaworkBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("fossawork-client/0.1")
                .build()
                .expect("failed to build reqwest client"),
            base_url: base_url.into(),
        }
    }

    /// Fetch the user's work-week preferences.
    ///
    /// Callers are expected to fall back to [`WorkWeekConfig::default`]
    /// (weekends excluded, no holidays) when this fails; the week resolver
    /// itself never sees a fetch error.
    pub async fn fetch_work_week_config(&self) -> Result<WorkWeekConfig, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/preferences/work-week", self.base_url))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ClientError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: body,
            });
        }

        let body: WorkWeekPreferences = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse preferences: {e}")))?;

        WorkWeekConfig::from_preferences(body.work_on_weekends, &body.holiday_dates)
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Fetch all work orders.
    ///
    /// An order with a missing or unparseable `scheduled_date` comes back as
    /// unscheduled rather than failing the whole listing.
    pub async fn fetch_work_orders(&self) -> Result<Vec<WorkOrder>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/work-orders", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status,
                message: body,
            });
        }

        let body: Vec<WorkOrderDto> = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("failed to parse work orders: {e}")))?;

        Ok(body.into_iter().map(WorkOrderDto::into_order).collect())
    }
}

#[derive(Debug, Deserialize)]
struct WorkWeekPreferences {
    work_on_weekends: bool,
    #[serde(default)]
    holiday_dates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WorkOrderDto {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    scheduled_date: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

impl WorkOrderDto {
    fn into_order(self) -> WorkOrder {
        let scheduled_date = match self.scheduled_date.as_deref() {
            Some(raw) => {
                let parsed = parse_scheduled_date(raw);
                if parsed.is_none() {
                    warn!(
                        "work order {}: unparseable scheduled_date '{raw}', treating as unscheduled",
                        self.id
                    );
                }
                parsed
            }
            None => None,
        };

        WorkOrder {
            id: self.id,
            description: self.description,
            scheduled_date,
            address: self.address,
        }
    }
}

/// Parse the backend's scheduled-date strings: RFC 3339 with offset, naive
/// ISO datetime, or bare date (midnight).
fn parse_scheduled_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parse_preferences_json() {
        let json = r#"{
            "work_on_weekends": true,
            "holiday_dates": ["2024-12-25", "2024-01-01"]
        }"#;
        let prefs: WorkWeekPreferences = serde_json::from_str(json).unwrap();
        assert!(prefs.work_on_weekends);
        assert_eq!(prefs.holiday_dates.len(), 2);

        let config =
            WorkWeekConfig::from_preferences(prefs.work_on_weekends, &prefs.holiday_dates).unwrap();
        assert!(
            config
                .holiday_dates
                .contains(&NaiveDate::from_ymd_opt(2024, 12, 25).unwrap())
        );
    }

    #[test]
    fn parse_preferences_missing_holidays() {
        let json = r#"{"work_on_weekends": false}"#;
        let prefs: WorkWeekPreferences = serde_json::from_str(json).unwrap();
        assert!(!prefs.work_on_weekends);
        assert!(prefs.holiday_dates.is_empty());
    }

    #[test]
    fn parse_work_order_listing() {
        let json = r#"[
            {"id": "wo-1", "description": "Pump 4 leak check",
             "scheduled_date": "2024-01-16T08:30:00", "address": "114 Main St"},
            {"id": "wo-2", "scheduled_date": null}
        ]"#;
        let dtos: Vec<WorkOrderDto> = serde_json::from_str(json).unwrap();
        let orders: Vec<WorkOrder> = dtos.into_iter().map(WorkOrderDto::into_order).collect();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].scheduled_date, Some(dt(2024, 1, 16, 8, 30)));
        assert!(orders[1].scheduled_date.is_none());
    }

    #[test]
    fn unparseable_scheduled_date_becomes_unscheduled() {
        let dto = WorkOrderDto {
            id: "wo-3".into(),
            description: None,
            scheduled_date: Some("next tuesday".into()),
            address: None,
        };
        let order = dto.into_order();
        assert!(order.scheduled_date.is_none());
    }

    #[test]
    fn parse_scheduled_date_formats() {
        assert_eq!(
            parse_scheduled_date("2024-01-16T08:30:00"),
            Some(dt(2024, 1, 16, 8, 30))
        );
        assert_eq!(
            parse_scheduled_date("2024-01-16T08:30:00Z"),
            Some(dt(2024, 1, 16, 8, 30))
        );
        assert_eq!(
            parse_scheduled_date("2024-01-16"),
            Some(dt(2024, 1, 16, 0, 0))
        );
        assert_eq!(parse_scheduled_date("not a date"), None);
    }
}
