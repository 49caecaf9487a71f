//! Export and import of the journal.
//!
//! A backup bundle is a JSON object with `user`, `logs` and `exportDate`.
//! Import is deliberately not atomic: a well-formed profile is always
//! written, while the log collection is only replaced when the bundle's
//! `logs` field is a well-formed array. Anything else leaves the local logs
//! untouched.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use log::{error, info, warn};
use serde_json::Value;
use shared::{DailyLog, ExportBundle, ExportCsvResponse, ExportToPathResponse, ImportDataResponse, UserProfile};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::models::{validate_log, validate_profile};
use crate::storage::{Connection, LocalStore};

const CSV_HEADER: [&str; 7] = ["id", "date", "category", "value", "note", "height", "weight"];

pub fn backup_filename(date: NaiveDate) -> String {
    format!("healthnote_backup_{}.json", date.format("%Y-%m-%d"))
}

pub fn csv_filename(date: NaiveDate) -> String {
    format!("healthnote_logs_{}.csv", date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct ExportService<C: Connection> {
    store: LocalStore<C>,
}

impl<C: Connection> ExportService<C> {
    pub fn new(store: LocalStore<C>) -> Self {
        Self { store }
    }

    /// Snapshot of the local store
    pub fn build_bundle(&self) -> Result<ExportBundle> {
        Ok(ExportBundle {
            user: self.store.read_profile()?,
            logs: self.store.read_logs()?,
            export_date: Utc::now(),
        })
    }

    /// Serialized backup bundle (pretty-printed JSON)
    pub fn export_bundle(&self) -> Result<String> {
        let bundle = self.build_bundle()?;
        info!("Exporting bundle with {} logs", bundle.logs.len());
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Restore from a serialized bundle.
    ///
    /// Malformed input is reported through `success: false` and never
    /// touches the store. Only local storage failures are returned as errors.
    pub fn import_bundle(&self, serialized: &str) -> Result<ImportDataResponse> {
        let data: Value = match serde_json::from_str(serialized) {
            Ok(data) => data,
            Err(e) => {
                warn!("Import rejected, not valid JSON: {}", e);
                return Ok(Self::import_failure(format!("Backup is not valid JSON: {}", e)));
            }
        };

        let profile = match data.get("user") {
            Some(user) if !user.is_null() => match serde_json::from_value::<UserProfile>(user.clone()) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Import rejected, malformed profile: {}", e);
                    return Ok(Self::import_failure(format!("Backup profile is malformed: {}", e)));
                }
            },
            _ => {
                warn!("Import rejected, bundle has no profile");
                return Ok(Self::import_failure("Backup does not contain a profile".to_string()));
            }
        };

        if let Err(e) = validate_profile(&profile) {
            warn!("Import rejected, invalid profile: {}", e);
            return Ok(Self::import_failure(format!("Backup profile is invalid: {}", e)));
        }

        let logs = match data.get("logs") {
            Some(Value::Array(_)) => match serde_json::from_value::<Vec<DailyLog>>(data["logs"].clone()) {
                Ok(logs) => match check_imported_logs(&logs) {
                    Ok(()) => Some(logs),
                    Err(reason) => {
                        warn!("Import keeps existing logs, {}", reason);
                        None
                    }
                },
                Err(e) => {
                    warn!("Import keeps existing logs, log array is malformed: {}", e);
                    None
                }
            },
            Some(_) => {
                warn!("Import keeps existing logs, `logs` is not an array");
                None
            }
            None => None,
        };

        self.store.replace_snapshot(&profile, logs.as_deref())?;

        let logs_replaced = logs.is_some();
        let log_count = match logs {
            Some(logs) => logs.len(),
            None => self.store.read_logs()?.len(),
        };

        info!(
            "Imported profile for {} (logs replaced: {}, {} logs)",
            profile.name, logs_replaced, log_count
        );

        Ok(ImportDataResponse {
            success: true,
            message: if logs_replaced {
                format!("Imported profile and {} logs", log_count)
            } else {
                "Imported profile; existing logs kept".to_string()
            },
            logs_replaced,
            log_count,
        })
    }

    /// Read a backup file and import it
    pub fn import_from_path(&self, path: &Path) -> Result<ImportDataResponse> {
        match fs::read_to_string(path) {
            Ok(content) => self.import_bundle(&content),
            Err(e) => {
                error!("Failed to read backup {:?}: {}", path, e);
                Ok(Self::import_failure(format!("Failed to read backup file: {}", e)))
            }
        }
    }

    /// Write the backup bundle into `custom_dir`, or the documents directory
    pub fn export_to_path(&self, custom_dir: Option<String>) -> Result<ExportToPathResponse> {
        let bundle = self.build_bundle()?;
        let log_count = bundle.logs.len();
        let content = serde_json::to_string_pretty(&bundle)?;

        let export_dir = match custom_dir {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(sanitize_path(&dir)),
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine a default export directory");
                    return Ok(Self::export_failure("Failed to determine export directory", String::new()));
                }
            },
        };

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(Self::export_failure(
                &format!("Failed to create export directory: {}", e),
                export_dir.to_string_lossy().to_string(),
            ));
        }

        let file_path = export_dir.join(backup_filename(Utc::now().date_naive()));
        let file_path_str = file_path.to_string_lossy().to_string();

        match fs::write(&file_path, content) {
            Ok(()) => {
                info!("Exported {} logs to {}", log_count, file_path_str);
                Ok(ExportToPathResponse {
                    success: true,
                    message: format!("Backup written to {}", file_path_str),
                    file_path: file_path_str,
                    log_count,
                })
            }
            Err(e) => {
                error!("Failed to write backup to {}: {}", file_path_str, e);
                Ok(Self::export_failure(&format!("Failed to write backup: {}", e), file_path_str))
            }
        }
    }

    /// Log collection as CSV, oldest date first
    pub fn export_logs_csv(&self) -> Result<ExportCsvResponse> {
        let mut logs = self.store.read_logs()?;
        logs.sort_by(|a, b| a.date.cmp(&b.date));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        let optional = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        for log in &logs {
            writer.write_record([
                log.id.clone(),
                log.date.format("%Y-%m-%d").to_string(),
                log.category.to_string(),
                log.value.to_string(),
                log.note.clone().unwrap_or_default(),
                optional(log.body_height()),
                optional(log.body_weight()),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))?;
        let csv_content = String::from_utf8(bytes)?;
        info!("Exported {} logs as CSV ({} bytes)", logs.len(), csv_content.len());

        Ok(ExportCsvResponse {
            csv_content,
            filename: csv_filename(Utc::now().date_naive()),
            log_count: logs.len(),
        })
    }

    fn import_failure(message: String) -> ImportDataResponse {
        ImportDataResponse {
            success: false,
            message,
            logs_replaced: false,
            log_count: 0,
        }
    }

    fn export_failure(message: &str, file_path: String) -> ExportToPathResponse {
        ExportToPathResponse {
            success: false,
            message: message.to_string(),
            file_path,
            log_count: 0,
        }
    }
}

/// Imported logs must carry unique, non-blank ids and values on their scale
fn check_imported_logs(logs: &[DailyLog]) -> std::result::Result<(), String> {
    let mut seen = HashSet::with_capacity(logs.len());
    for log in logs {
        if log.id.trim().is_empty() {
            return Err("a log has a blank id".to_string());
        }
        if !seen.insert(log.id.as_str()) {
            return Err(format!("log id {} appears more than once", log.id));
        }
        validate_log(log).map_err(|e| format!("log {} is invalid: {}", log.id, e))?;
    }
    Ok(())
}

/// Clean up a user-typed directory: quotes, escaped spaces, trailing
/// separators and a leading `~`.
pub fn sanitize_path(path: &str) -> String {
    let mut cleaned = path.trim();
    for quote in ['"', '\''] {
        if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
            cleaned = cleaned[1..cleaned.len() - 1].trim();
        }
    }

    let mut cleaned = cleaned.replace("\\ ", " ");
    while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
        cleaned.pop();
    }

    if let Some(home) = dirs::home_dir() {
        if cleaned == "~" {
            return home.to_string_lossy().to_string();
        }
        if let Some(rest) = cleaned.strip_prefix("~/").or_else(|| cleaned.strip_prefix("~\\")) {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    cleaned
}
