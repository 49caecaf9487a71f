//! Backend row shapes and their mapping to the local model.
//!
//! The backend stores profiles and logs under snake_case column names keyed
//! by `user_id`. Mapping is lossless in both directions: every local field
//! has exactly one column, and `updated_at` is backend bookkeeping only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::{DailyLog, LogCategory, ThemeOption, UserProfile};

/// Row of the `profiles` collection (one per user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub theme: ThemeOption,
    pub is_child_mode: bool,
    pub height: f64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row of the `logs` collection (appended, keyed by log id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub category: LogCategory,
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub sub_data: Option<Map<String, Value>>,
}

pub struct ProfileMapper;

impl ProfileMapper {
    /// Convert a local profile into the row upserted for `user_id`
    pub fn to_row(user_id: &str, profile: &UserProfile, updated_at: DateTime<Utc>) -> ProfileRow {
        ProfileRow {
            user_id: user_id.to_string(),
            name: profile.name.clone(),
            birth_date: profile.birth_date,
            theme: profile.theme,
            is_child_mode: profile.is_child_mode,
            height: profile.height,
            weight: profile.weight,
            updated_at: Some(updated_at),
        }
    }

    /// Convert a fetched row back into the local profile
    pub fn to_domain(row: ProfileRow) -> UserProfile {
        UserProfile {
            name: row.name,
            birth_date: row.birth_date,
            theme: row.theme,
            is_child_mode: row.is_child_mode,
            height: row.height,
            weight: row.weight,
        }
    }
}

pub struct LogMapper;

impl LogMapper {
    pub fn to_row(user_id: &str, log: &DailyLog) -> LogRow {
        LogRow {
            id: log.id.clone(),
            user_id: user_id.to_string(),
            date: log.date,
            category: log.category,
            value: log.value,
            note: log.note.clone(),
            sub_data: log.sub_data.clone(),
        }
    }

    pub fn to_domain(row: LogRow) -> DailyLog {
        DailyLog {
            id: row.id,
            date: row.date,
            category: row.category,
            value: row.value,
            note: row.note,
            sub_data: row.sub_data,
        }
    }

    pub fn to_domain_list(rows: Vec<LogRow>) -> Vec<DailyLog> {
        rows.into_iter().map(Self::to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::body_sub_data;

    #[test]
    fn test_profile_row_round_trip() {
        let profile = UserProfile {
            name: "Sora".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2016, 8, 20).unwrap(),
            theme: ThemeOption::Light,
            is_child_mode: true,
            height: 118.4,
            weight: 21.9,
        };

        let row = ProfileMapper::to_row("user-1", &profile, Utc::now());
        assert_eq!(row.user_id, "user-1");
        assert_eq!(ProfileMapper::to_domain(row), profile);
    }

    #[test]
    fn test_profile_row_uses_backend_column_names() {
        let profile = UserProfile::new("Sora", NaiveDate::from_ymd_opt(2016, 8, 20).unwrap(), true);
        let row = ProfileMapper::to_row("user-1", &profile, Utc::now());
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["birth_date"], json!("2016-08-20"));
        assert_eq!(value["is_child_mode"], json!(true));
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn test_log_row_round_trip_keeps_sub_data_and_note() {
        let log = DailyLog {
            id: "log-9".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            category: LogCategory::Body,
            value: 0.0,
            note: Some("after breakfast".to_string()),
            sub_data: Some(body_sub_data(Some(171.0), Some(64.5))),
        };

        let row = LogMapper::to_row("user-1", &log);
        let encoded = serde_json::to_value(&row).unwrap();
        assert_eq!(encoded["sub_data"]["weight"], json!(64.5));

        let decoded: LogRow = serde_json::from_value(encoded).unwrap();
        assert_eq!(LogMapper::to_domain(decoded), log);
    }
}
