use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A work order as owned by the FossaWork backend.
///
/// Consumed, not owned: the resolver only reads `scheduled_date` to decide
/// week membership. An order with no scheduled date is "unscheduled" and is
/// never passed to the week-membership check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub address: Option<String>,
}

impl WorkOrder {
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn deserialize_with_optional_fields_absent() {
        let json = r#"{"id": "wo-17"}"#;
        let order: WorkOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, "wo-17");
        assert!(order.description.is_none());
        assert!(!order.is_scheduled());
        assert!(order.address.is_none());
    }

    #[test]
    fn deserialize_scheduled_order() {
        let json = r#"{
            "id": "wo-42",
            "description": "Dispenser 3 calibration",
            "scheduled_date": "2024-01-16T08:30:00",
            "address": "114 Main St, Tacoma WA"
        }"#;
        let order: WorkOrder = serde_json::from_str(json).unwrap();
        assert_eq!(
            order.scheduled_date,
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 16)
                    .unwrap()
                    .and_hms_opt(8, 30, 0)
                    .unwrap()
            )
        );
        assert!(order.is_scheduled());
    }
}
