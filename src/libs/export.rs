//! Export of entity collections to files, tracked by `ExportJob` records.
//!
//! An export first stores a `PENDING` job, marks it `PROCESSING`, writes the
//! presented records as CSV or JSON, and finally records the file and its
//! expiry on the job (`COMPLETED`) or the error message (`FAILED`).
//!
//! ```rust,no_run
//! use datamanage::db::db::Db;
//! use datamanage::libs::export::{ExportFormat, ExportRequest, Exporter};
//! use datamanage::libs::manager::DataManager;
//! use datamanage::libs::registry::SchemaRegistry;
//! use std::sync::Arc;
//!
//! let db = Db::in_memory()?;
//! let manager = DataManager::new(&db.conn, Arc::new(SchemaRegistry::with_defaults()));
//! let exporter = Exporter::new(&manager, "exports", 7);
//! let job = exporter.export(&ExportRequest::new("Phone", ExportFormat::Csv))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::condition::{Conditionals, Operator};
use super::config::Config;
use super::data_storage::DataStorage;
use super::manager::{ConditionInput, DataManager};
use super::messages::Message;
use super::record::{now_timestamp, Record};
use crate::schemas::export_job::ExportStatus;
use crate::{msg_debug, msg_error_anyhow, msg_warning};
use anyhow::Result;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const JOB_ENTITY: &str = "ExportJob";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub entity: String,
    pub format: ExportFormat,
    pub filters: Map<String, Value>,
    pub user_id: Option<String>,
    /// `(entity, id)` of the record the export belongs to.
    pub reference: Option<(String, String)>,
    /// Overrides the generated file location.
    pub output_path: Option<PathBuf>,
}

impl ExportRequest {
    pub fn new(entity: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            entity: entity.into(),
            format,
            filters: Map::new(),
            user_id: None,
            reference: None,
            output_path: None,
        }
    }

    pub fn filters(mut self, filters: Map<String, Value>) -> Self {
        self.filters = filters;
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn reference(mut self, entity: impl Into<String>, id: impl Into<String>) -> Self {
        self.reference = Some((entity.into(), id.into()));
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

pub struct Exporter<'m> {
    manager: &'m DataManager<'m>,
    output_dir: PathBuf,
    expires_after_days: u32,
}

impl<'m> Exporter<'m> {
    pub fn new(manager: &'m DataManager<'m>, output_dir: impl Into<PathBuf>, expires_after_days: u32) -> Self {
        Self {
            manager,
            output_dir: output_dir.into(),
            expires_after_days,
        }
    }

    /// Uses the configured export directory, or `exports/` in the data
    /// directory.
    pub fn from_config(manager: &'m DataManager<'m>, config: &Config) -> Self {
        let settings = config.export_settings();
        let output_dir = match settings.output_dir {
            Some(dir) => PathBuf::from(dir),
            None => DataStorage::new().base_path().join("exports"),
        };
        Self::new(manager, output_dir, settings.expires_after_days)
    }

    /// Runs one export and returns the final job record. When writing fails
    /// the job is marked `FAILED` and the error is returned.
    pub fn export(&self, request: &ExportRequest) -> Result<Record> {
        let jobs = self.manager.use_schema(JOB_ENTITY)?;

        let mut input = Map::new();
        input.insert("export_type".into(), Value::from(request.format.extension()));
        input.insert("status".into(), Value::from(ExportStatus::Pending.as_str()));
        input.insert("metadata".into(), json!({"entity": request.entity, "filters": request.filters}));
        if let Some(user_id) = &request.user_id {
            input.insert("user_id".into(), Value::from(user_id.as_str()));
        }
        if let Some((entity, id)) = &request.reference {
            input.insert("reference_type".into(), Value::from(entity.as_str()));
            input.insert("reference_id".into(), Value::from(id.as_str()));
        }
        let job = jobs.prepare_store(input)?;
        info!(job = %job.id, entity = %request.entity, format = request.format.extension(), "export job created");

        self.set_status(&job.id, ExportStatus::Processing, Map::new())?;

        match self.write(&job.id, request) {
            Ok((path, count)) => {
                let mut changes = Map::new();
                changes.insert("file_path".into(), Value::from(path.display().to_string()));
                changes.insert(
                    "file_name".into(),
                    path.file_name().map(|name| Value::from(name.to_string_lossy().into_owned())).unwrap_or(Value::Null),
                );
                changes.insert("expires_at".into(), Value::from(self.expiry()));
                changes.insert("metadata".into(), json!({"entity": request.entity, "filters": request.filters, "count": count}));
                self.set_status(&job.id, ExportStatus::Completed, changes)
            }
            Err(err) => {
                warn!(job = %job.id, error = %err, "export failed");
                let mut changes = Map::new();
                changes.insert("error_message".into(), Value::from(err.to_string()));
                self.set_status(&job.id, ExportStatus::Failed, changes)?;
                Err(msg_error_anyhow!(Message::ExportFailed(err.to_string())))
            }
        }
    }

    /// Deletes files of completed jobs past their expiry and soft-deletes the
    /// jobs. Returns how many jobs were pruned.
    pub fn prune_expired(&self) -> Result<usize> {
        let expired = Conditionals::and()
            .where_eq("status", ExportStatus::Completed.as_str())
            .where_op("expires_at", Operator::Lt, now_timestamp());
        let jobs = self.manager.use_schema(JOB_ENTITY)?;
        let records = jobs.prepare_list(Some(ConditionInput::Built(expired)))?;

        for job in &records {
            if let Some(Value::String(path)) = job.get("file_path") {
                if let Err(err) = fs::remove_file(&path) {
                    msg_warning!(Message::ExportFileNotRemoved(path, err.to_string()));
                }
            }
            jobs.delete_by_id(&job.id)?;
        }
        Ok(records.len())
    }

    fn set_status(&self, id: &str, status: ExportStatus, mut changes: Map<String, Value>) -> Result<Record> {
        changes.insert("id".into(), Value::from(id));
        changes.insert("status".into(), Value::from(status.as_str()));
        let job = self.manager.use_schema(JOB_ENTITY)?.prepare_update(changes)?;
        msg_debug!(format!("export job {} is {}", id, status));
        Ok(job)
    }

    fn expiry(&self) -> String {
        (Utc::now() + Duration::days(i64::from(self.expires_after_days))).to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn write(&self, job_id: &str, request: &ExportRequest) -> Result<(PathBuf, usize)> {
        let mut entity = self.manager.use_schema(&request.entity)?;
        if !request.filters.is_empty() {
            entity = entity.conditionals(request.filters.clone());
        }
        let records = entity.list()?;

        let path = match &request.output_path {
            Some(path) => path.clone(),
            None => self
                .output_dir
                .join(format!("{}_{}.{}", request.entity.to_lowercase(), job_id.to_lowercase(), request.format.extension())),
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        match request.format {
            ExportFormat::Csv => write_csv(&path, &records)?,
            ExportFormat::Json => serde_json::to_writer_pretty(File::create(&path)?, &records)?,
        }
        Ok((path, records.len()))
    }
}

fn write_csv(path: &Path, records: &[Value]) -> Result<()> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(fields) = record {
            for key in fields.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut wtr = csv::Writer::from_path(path)?;
    if !headers.is_empty() {
        wtr.write_record(&headers)?;
    }
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|header| match record.get(header) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
