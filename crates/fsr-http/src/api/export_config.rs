//! Configuration export: templates, export jobs and downloads.
//!
//! Every call here needs [`Operation::ConfigExport`], which API keys do not
//! have; with an API key each method fails before any request is sent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use fsr_core::models::{
    ConnectorInfo, ExportJob, ExportStatus, ExportTemplateOptions, PlaybookCollectionInfo,
    export_file_name,
};
use fsr_core::{Collection, Error, InvalidInputError, Iri, Operation, Result, SimplifiedTemplate};

use crate::client::FortiSoar;
use crate::http::ApiRequest;

const EXPORT_TEMPLATES: &str = "/api/3/export_templates";

/// Name lookups reused for the lifetime of a client.
#[derive(Debug, Default)]
pub(crate) struct ExportCache {
    picklists: Mutex<HashMap<String, String>>,
    connectors: Mutex<HashMap<String, ConnectorInfo>>,
    collections: Mutex<HashMap<String, PlaybookCollectionInfo>>,
    templates: Mutex<HashMap<String, String>>,
}

/// Configuration export workflows.
#[derive(Debug, Clone, Copy)]
pub struct ExportConfig<'a> {
    client: &'a FortiSoar,
}

impl<'a> ExportConfig<'a> {
    pub(crate) fn new(client: &'a FortiSoar) -> Self {
        Self { client }
    }

    fn check(&self) -> Result<()> {
        self.client
            .scheme()
            .check_supported(Operation::ConfigExport)?;
        Ok(())
    }

    fn cache(&self) -> &ExportCache {
        self.client.export_cache()
    }

    /// Create an export template from a full options document.
    #[instrument(skip(self, options, metadata))]
    pub async fn create_export_template(
        &self,
        name: &str,
        options: Value,
        metadata: Option<Value>,
    ) -> Result<Value> {
        self.check()?;
        let body = json!({
            "name": name,
            "options": options,
            "metadata": metadata.unwrap_or_else(ExportTemplateOptions::default_metadata),
        });
        self.client.post(EXPORT_TEMPLATES, body).await
    }

    /// Resolve the names in `template` and create the export template.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if a picklist, connector or playbook collection
    /// does not exist.
    #[instrument(skip(self, template), fields(name = %template.name))]
    pub async fn create_simplified_template(&self, template: &SimplifiedTemplate) -> Result<Value> {
        self.check()?;

        let mut options = ExportTemplateOptions {
            modules: ExportTemplateOptions::modules_from(template),
            view_templates: template.view_templates.clone(),
            ..ExportTemplateOptions::default()
        };
        for name in &template.picklists {
            options.picklist_iris.push(self.picklist_iri(name).await?);
        }
        for label in &template.connectors {
            options.connectors.push(self.connector_info(label).await?);
        }
        for name in &template.playbook_collections {
            options
                .playbook_collections
                .push(self.playbook_collection_info(name).await?);
        }

        self.create_export_template(
            &template.name,
            options.to_value(),
            Some(ExportTemplateOptions::default_metadata()),
        )
        .await
    }

    /// Start an export job. `file_name` must end in `.json`.
    #[instrument(skip(self))]
    pub async fn trigger_export(&self, template_uuid: &str, file_name: &str) -> Result<ExportJob> {
        self.check()?;
        if !file_name.ends_with(".json") {
            return Err(InvalidInputError::Other {
                message: format!("export file name must end in .json, got '{file_name}'"),
            }
            .into());
        }

        self.client
            .send(
                ApiRequest::put("/api/export")
                    .query("fileName", file_name)
                    .query("template", template_uuid),
            )
            .await?
            .parse()
    }

    /// Current status of an export job.
    #[instrument(skip(self))]
    pub async fn get_export_status(&self, job_uuid: &str) -> Result<ExportStatus> {
        self.check()?;
        self.client
            .get_json(&format!("/api/3/export_jobs/{job_uuid}"), &[])
            .await
    }

    /// Poll a job until it completes.
    ///
    /// # Errors
    ///
    /// [`Error::Export`] if the job fails or is still running after the
    /// configured number of status checks.
    #[instrument(skip(self))]
    pub async fn wait_for_export(&self, job_uuid: &str) -> Result<ExportStatus> {
        let config = self.client.config();
        let max_polls = config.max_export_polls.max(1);

        for attempt in 1..=max_polls {
            let status = self.get_export_status(job_uuid).await?;
            if status.is_complete() {
                info!(attempt, "export complete");
                return Ok(status);
            }
            if status.is_failed() {
                return Err(Error::Export(format!("job {job_uuid} failed")));
            }
            debug!(attempt, status = %status.status, "export in progress");
            if attempt < max_polls {
                tokio::time::sleep(config.poll_interval).await;
            }
        }

        Err(Error::Export(format!(
            "job {job_uuid} not complete after {max_polls} status checks"
        )))
    }

    /// Download an exported file. Defaults to the IRI's last segment in the
    /// current directory. Returns the path written.
    #[instrument(skip(self))]
    pub async fn download_export(&self, file: &Iri, path: Option<&Path>) -> Result<PathBuf> {
        self.check()?;
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?.join(file.uuid()),
        };

        let response = self.client.send(ApiRequest::get(file.as_str())).await?;
        tokio::fs::write(&target, &response.body).await?;
        info!(path = %target.display(), bytes = response.body.len(), "export downloaded");
        Ok(target)
    }

    /// Create a template from names, export it and download the result.
    #[instrument(skip(self, template), fields(name = %template.name))]
    pub async fn export(
        &self,
        template: &SimplifiedTemplate,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let created = self.create_simplified_template(template).await?;
        let template_uuid = iri_of(&created)?.uuid().to_string();
        self.run_export(&template_uuid, &template.file_name(), output)
            .await
    }

    /// Export using an existing template, looked up by name.
    #[instrument(skip(self))]
    pub async fn export_by_template_name(
        &self,
        name: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let template_uuid = self.template_uuid(name).await?;
        let file_name = trigger_file_name(output, || export_file_name(name));
        self.run_export(&template_uuid, &file_name, output).await
    }

    /// Export using an existing template UUID.
    #[instrument(skip(self))]
    pub async fn export_by_template_uuid(
        &self,
        template_uuid: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let file_name = trigger_file_name(output, || format!("{template_uuid}.json"));
        self.run_export(template_uuid, &file_name, output).await
    }

    /// UUID of the most recently created template with this exact name.
    pub async fn template_uuid(&self, name: &str) -> Result<String> {
        self.check()?;
        if let Some(uuid) = self.cache().templates.lock().await.get(name) {
            return Ok(uuid.clone());
        }

        let page: Collection = self
            .client
            .get_json(EXPORT_TEMPLATES, &[("name", name)])
            .await?;
        let newest = page
            .members
            .iter()
            .filter(|t| t.get("name").and_then(Value::as_str) == Some(name))
            .max_by(|a, b| create_date(a).total_cmp(&create_date(b)))
            .ok_or_else(|| not_found("export template", name))?;
        let uuid = iri_of(newest)?.uuid().to_string();

        self.cache()
            .templates
            .lock()
            .await
            .insert(name.to_string(), uuid.clone());
        Ok(uuid)
    }

    async fn run_export(
        &self,
        template_uuid: &str,
        file_name: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let job = self.trigger_export(template_uuid, file_name).await?;
        info!(job = %job.job_uuid, "export started");

        let status = self.wait_for_export(&job.job_uuid).await?;
        let file = status.file.ok_or_else(|| {
            Error::UnexpectedResponse(format!("job {} completed without a file", job.job_uuid))
        })?;
        self.download_export(&file.id, output).await
    }

    async fn picklist_iri(&self, name: &str) -> Result<String> {
        if let Some(iri) = self.cache().picklists.lock().await.get(name) {
            return Ok(iri.clone());
        }

        let page: Collection = self
            .client
            .get_json("/api/3/picklist_names", &[("name", name)])
            .await?;
        let first = page.into_first().ok_or_else(|| not_found("picklist", name))?;
        let iri = iri_of(&first)?.as_str().to_string();

        self.cache()
            .picklists
            .lock()
            .await
            .insert(name.to_string(), iri.clone());
        Ok(iri)
    }

    async fn connector_info(&self, label: &str) -> Result<ConnectorInfo> {
        if let Some(info) = self.cache().connectors.lock().await.get(label) {
            return Ok(info.clone());
        }

        let page: Collection = self
            .client
            .get_json("/api/integration/connectors/", &[])
            .await?;
        let connector = page
            .members
            .iter()
            .find(|c| c.get("label").and_then(Value::as_str) == Some(label))
            .ok_or_else(|| not_found("connector", label))?;
        let info = ConnectorInfo {
            label: label.to_string(),
            name: string_field(connector, "name"),
            version: string_field(connector, "version"),
        };

        self.cache()
            .connectors
            .lock()
            .await
            .insert(label.to_string(), info.clone());
        Ok(info)
    }

    async fn playbook_collection_info(&self, name: &str) -> Result<PlaybookCollectionInfo> {
        if let Some(info) = self.cache().collections.lock().await.get(name) {
            return Ok(info.clone());
        }

        let page: Collection = self
            .client
            .get_json("/api/3/workflow_collections", &[("name", name)])
            .await?;
        let first = page
            .into_first()
            .ok_or_else(|| not_found("playbook collection", name))?;
        let info = PlaybookCollectionInfo {
            label: first
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(name)
                .to_string(),
            uuid: iri_of(&first)?.uuid().to_string(),
        };

        self.cache()
            .collections
            .lock()
            .await
            .insert(name.to_string(), info.clone());
        Ok(info)
    }
}

fn not_found(kind: &'static str, name: &str) -> Error {
    Error::NotFound {
        kind,
        name: name.to_string(),
    }
}

/// The `@id` of a record.
fn iri_of(record: &Value) -> Result<Iri> {
    record
        .get("@id")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::UnexpectedResponse("record has no @id".to_string()))?
        .parse()
}

fn string_field(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn create_date(record: &Value) -> f64 {
    record
        .get("createDate")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// File name sent to the export job: the output's file name if it is a
/// `.json` name, otherwise `default`.
fn trigger_file_name(output: Option<&Path>, default: impl FnOnce() -> String) -> String {
    output
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .filter(|n| n.ends_with(".json"))
        .map(str::to_string)
        .unwrap_or_else(default)
}
