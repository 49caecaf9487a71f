use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// UI theme preference. Stored and synced, never interpreted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeOption {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeOption::Light => "light",
            ThemeOption::Dark => "dark",
            ThemeOption::System => "system",
        }
    }
}

impl FromStr for ThemeOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeOption::Light),
            "dark" => Ok(ThemeOption::Dark),
            "system" => Ok(ThemeOption::System),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

impl fmt::Display for ThemeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single profile owned by an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name (non-empty)
    pub name: String,
    /// Birth date, only used for age derivation
    pub birth_date: NaiveDate,
    pub theme: ThemeOption,
    pub is_child_mode: bool,
    /// Height in cm, 0 = unset
    pub height: f64,
    /// Weight in kg, 0 = unset
    pub weight: f64,
}

impl UserProfile {
    /// Profile as produced by onboarding: system theme and no body measures yet.
    pub fn new(name: impl Into<String>, birth_date: NaiveDate, is_child_mode: bool) -> Self {
        Self {
            name: name.into(),
            birth_date,
            theme: ThemeOption::System,
            is_child_mode,
            height: 0.0,
            weight: 0.0,
        }
    }
}

/// Journal category of a daily log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Sleep,
    Mental,
    Exercise,
    Food,
    Mood,
    Stress,
    Body,
}

impl LogCategory {
    pub const ALL: [LogCategory; 7] = [
        LogCategory::Sleep,
        LogCategory::Mental,
        LogCategory::Exercise,
        LogCategory::Food,
        LogCategory::Mood,
        LogCategory::Stress,
        LogCategory::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Sleep => "sleep",
            LogCategory::Mental => "mental",
            LogCategory::Exercise => "exercise",
            LogCategory::Food => "food",
            LogCategory::Mood => "mood",
            LogCategory::Stress => "stress",
            LogCategory::Body => "body",
        }
    }
}

impl FromStr for LogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        LogCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("Unknown log category: {}", s))
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Journal entry. Immutable once saved; `id` never changes after assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    pub date: NaiveDate,
    pub category: LogCategory,
    /// 0-10 for sleep/stress/exercise, 1-5 for mood, 0 for body
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
    /// Category specific fields; body logs carry `height` and `weight`
    #[serde(default)]
    pub sub_data: Option<Map<String, Value>>,
}

impl DailyLog {
    /// Height (cm) recorded in the sub-data, if present and non-zero
    pub fn body_height(&self) -> Option<f64> {
        self.sub_number("height")
    }

    /// Weight (kg) recorded in the sub-data, if present and non-zero
    pub fn body_weight(&self) -> Option<f64> {
        self.sub_number("weight")
    }

    fn sub_number(&self, key: &str) -> Option<f64> {
        self.sub_data
            .as_ref()
            .and_then(|data| data.get(key))
            .and_then(Value::as_f64)
            .filter(|v| *v > 0.0)
    }
}

/// Build the sub-data mapping for a body measurement entry.
pub fn body_sub_data(height: Option<f64>, weight: Option<f64>) -> Map<String, Value> {
    let mut data = Map::new();
    if let Some(h) = height {
        data.insert("height".to_string(), Value::from(h));
    }
    if let Some(w) = weight {
        data.insert("weight".to_string(), Value::from(w));
    }
    data
}

/// Portable snapshot used to move data between installs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub user: Option<UserProfile>,
    pub logs: Vec<DailyLog>,
    pub export_date: DateTime<Utc>,
}

/// Entry of the bundled growth reference curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthReferencePoint {
    pub age_months: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
}

/// Height and weight currently in effect (latest body log, else profile)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BodyMeasures {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
}

/// BMI classification band; `Unknown` when BMI cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Unknown,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiReading {
    pub value: Option<f64>,
    pub category: BmiCategory,
}

/// Approximate deviation band against the reference curve (not a clinical percentile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthLabel {
    #[serde(rename = "+1 SD")]
    PlusOneSd,
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "-1 SD")]
    MinusOneSd,
}

impl fmt::Display for GrowthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GrowthLabel::PlusOneSd => "+1 SD",
            GrowthLabel::Standard => "standard",
            GrowthLabel::MinusOneSd => "-1 SD",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthDeviation {
    pub age_months: i32,
    pub reference: GrowthReferencePoint,
    pub percent_difference: f64,
    pub label: GrowthLabel,
}

/// One day of the weekly mood/stress chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mood: Option<f64>,
    pub stress: Option<f64>,
}

/// Everything the dashboard renders from raw logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub measures: BodyMeasures,
    pub bmi: BmiReading,
    pub growth: Option<GrowthDeviation>,
    pub weekly_trend: Vec<TrendPoint>,
    pub is_birthday: bool,
    pub age_years: i32,
    pub child_mode_mismatch: bool,
}

/// Result of importing a backup bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDataResponse {
    pub success: bool,
    pub message: String,
    /// True when the bundle carried a well-formed log array that replaced local logs
    pub logs_replaced: bool,
    pub log_count: usize,
}

/// Result of writing a backup bundle to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub log_count: usize,
}

/// CSV rendition of the log collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvResponse {
    pub csv_content: String,
    pub filename: String,
    pub log_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_uses_camel_case_fields() {
        let profile = UserProfile::new("Aiko", NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(), false);
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["birthDate"], json!("1990-04-02"));
        assert_eq!(value["isChildMode"], json!(false));
        assert_eq!(value["theme"], json!("system"));
    }

    #[test]
    fn test_log_without_optional_fields_parses() {
        let log: DailyLog = serde_json::from_value(json!({
            "id": "a",
            "date": "2024-05-01",
            "category": "mood",
            "value": 4
        }))
        .unwrap();

        assert_eq!(log.category, LogCategory::Mood);
        assert_eq!(log.note, None);
        assert_eq!(log.sub_data, None);
    }

    #[test]
    fn test_body_measures_ignore_zero_and_missing() {
        let mut log: DailyLog = serde_json::from_value(json!({
            "id": "b",
            "date": "2024-05-01",
            "category": "body",
            "value": 0,
            "subData": { "height": 170.5, "weight": 0 }
        }))
        .unwrap();

        assert_eq!(log.body_height(), Some(170.5));
        assert_eq!(log.body_weight(), None);

        log.sub_data = Some(body_sub_data(None, Some(61.0)));
        assert_eq!(log.body_height(), None);
        assert_eq!(log.body_weight(), Some(61.0));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Stress".parse::<LogCategory>(), Ok(LogCategory::Stress));
        assert!("steps".parse::<LogCategory>().is_err());
        assert_eq!("dark".parse::<ThemeOption>(), Ok(ThemeOption::Dark));
    }

    #[test]
    fn test_growth_label_display() {
        assert_eq!(GrowthLabel::PlusOneSd.to_string(), "+1 SD");
        assert_eq!(GrowthLabel::MinusOneSd.to_string(), "-1 SD");
        assert_eq!(GrowthLabel::Standard.to_string(), "standard");
    }
}
