//! Domain-level command types used by the journal services.

pub mod logs {
    use chrono::NaiveDate;
    use serde_json::{Map, Value};
    use shared::{body_sub_data, LogCategory};

    /// Input for adding a journal entry.
    #[derive(Debug, Clone)]
    pub struct AddLogCommand {
        /// Caller supplied identifier; a fresh one is generated when absent or blank
        pub id: Option<String>,
        pub date: NaiveDate,
        pub category: LogCategory,
        pub value: f64,
        pub note: Option<String>,
        pub sub_data: Option<Map<String, Value>>,
    }

    impl AddLogCommand {
        /// Scored entry (sleep, mood, stress, ...)
        pub fn score(date: NaiveDate, category: LogCategory, value: f64) -> Self {
            Self {
                id: None,
                date,
                category,
                value,
                note: None,
                sub_data: None,
            }
        }

        /// Body measurement entry; its value is always 0
        pub fn body(date: NaiveDate, height: Option<f64>, weight: Option<f64>) -> Self {
            Self {
                id: None,
                date,
                category: LogCategory::Body,
                value: 0.0,
                note: None,
                sub_data: Some(body_sub_data(height, weight)),
            }
        }

        pub fn with_note(mut self, note: impl Into<String>) -> Self {
            let note = note.into();
            self.note = if note.trim().is_empty() { None } else { Some(note) };
            self
        }

        pub fn with_id(mut self, id: impl Into<String>) -> Self {
            self.id = Some(id.into());
            self
        }
    }
}

pub mod profile {
    use shared::ThemeOption;

    /// Settings edit; `None` leaves a field unchanged.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateProfileCommand {
        pub name: Option<String>,
        pub theme: Option<ThemeOption>,
        pub is_child_mode: Option<bool>,
        pub height: Option<f64>,
        pub weight: Option<f64>,
    }
}
