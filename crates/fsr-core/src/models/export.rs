//! Configuration export documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::Iri;

/// Job status reported once the export file is ready.
pub const EXPORT_COMPLETE: &str = "Export Complete";

/// Job status reported when the export failed.
pub const EXPORT_FAILED: &str = "Export Failed";

/// An export template described by names rather than IRIs.
///
/// Names are resolved against the server before the template is created.
#[derive(Debug, Clone, Default)]
pub struct SimplifiedTemplate {
    pub name: String,
    pub modules: Vec<String>,
    pub module_attributes: BTreeMap<String, Vec<String>>,
    pub picklists: Vec<String>,
    pub connectors: Vec<String>,
    pub playbook_collections: Vec<String>,
    pub view_templates: Vec<String>,
}

impl SimplifiedTemplate {
    /// Start a template with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Export a module, optionally restricted to some attributes.
    pub fn module(mut self, module: impl Into<String>, attributes: &[&str]) -> Self {
        let module = module.into();
        if !attributes.is_empty() {
            self.module_attributes.insert(
                module.clone(),
                attributes.iter().map(|a| (*a).to_string()).collect(),
            );
        }
        self.modules.push(module);
        self
    }

    /// Include a picklist by name.
    pub fn picklist(mut self, name: impl Into<String>) -> Self {
        self.picklists.push(name.into());
        self
    }

    /// Include a connector by label.
    pub fn connector(mut self, label: impl Into<String>) -> Self {
        self.connectors.push(label.into());
        self
    }

    /// Include a playbook collection by name.
    pub fn playbook_collection(mut self, name: impl Into<String>) -> Self {
        self.playbook_collections.push(name.into());
        self
    }

    /// Include a view template, e.g. `modules-alerts-list`.
    pub fn view_template(mut self, name: impl Into<String>) -> Self {
        self.view_templates.push(name.into());
        self
    }

    /// Default export file name: lowercase, spaces to underscores, `.json`.
    pub fn file_name(&self) -> String {
        export_file_name(&self.name)
    }
}

/// Derive an export file name from a display name.
pub fn export_file_name(name: &str) -> String {
    format!("{}.json", name.to_lowercase().replace(' ', "_"))
}

/// A connector resolved by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorInfo {
    pub label: String,
    pub name: String,
    pub version: String,
}

impl ConnectorInfo {
    /// The connector identifier used in export templates.
    pub fn value(&self) -> String {
        format!("cyops-connector-{}-{}", self.name, self.version)
    }
}

/// A playbook collection resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybookCollectionInfo {
    pub label: String,
    pub uuid: String,
}

/// Fully resolved export template options.
#[derive(Debug, Clone, Default)]
pub struct ExportTemplateOptions {
    pub modules: Vec<(String, Vec<String>)>,
    pub picklist_iris: Vec<String>,
    pub connectors: Vec<ConnectorInfo>,
    pub playbook_collections: Vec<PlaybookCollectionInfo>,
    pub view_templates: Vec<String>,
}

impl ExportTemplateOptions {
    /// Module list for a simplified template; attributes default to none.
    pub fn modules_from(template: &SimplifiedTemplate) -> Vec<(String, Vec<String>)> {
        template
            .modules
            .iter()
            .map(|m| {
                let attrs = template.module_attributes.get(m).cloned().unwrap_or_default();
                (m.clone(), attrs)
            })
            .collect()
    }

    /// Build the `options` document sent to `/api/3/export_templates`.
    pub fn to_value(&self) -> Value {
        let modules: Vec<Value> = self
            .modules
            .iter()
            .map(|(module, attrs)| json!({"value": module, "includedAttributes": attrs}))
            .collect();

        let connectors: Vec<Value> = self
            .connectors
            .iter()
            .map(|c| {
                json!({
                    "label": c.label,
                    "value": c.value(),
                    "rpm": true,
                    "configurations": true,
                    "configCount": 1,
                    "version": c.version,
                    "include": true,
                    "recordCount": 0
                })
            })
            .collect();

        let collections: Vec<Value> = self
            .playbook_collections
            .iter()
            .map(|c| {
                json!({
                    "label": c.label,
                    "value": c.uuid,
                    "includeGlobalVariables": true,
                    "includeSchedules": true,
                    "includeVersions": true,
                    "include": true,
                    "recordCount": 0
                })
            })
            .collect();

        json!({
            "modules": modules,
            "picklistNames": self.picklist_iris,
            "connectors": connectors,
            "playbooks": {"collections": collections, "globalVariables": []},
            "viewTemplates": self.view_templates,
            "recordSets": [],
            "views": [],
            "reports": [],
            "dashboards": [],
            "roles": [],
            "teams": [],
            "actors": [],
            "widgets": [],
            "appSettings": [],
            "showOnlyConfigured": [],
            "preprocessingRules": [],
            "ruleChannels": [],
            "rules": [],
            "playbookBlocks": {"blocks": [], "includeGlobalVariables": true}
        })
    }

    /// Template metadata used when none is supplied.
    pub fn default_metadata() -> Value {
        json!({"autoSelectPicklists": true})
    }
}

/// Response from triggering an export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub job_uuid: String,
}

/// The exported file reference on a finished job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    #[serde(rename = "@id")]
    pub id: Iri,
}

/// Status of an export job.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportStatus {
    pub status: String,
    #[serde(default)]
    pub file: Option<ExportFile>,
}

impl ExportStatus {
    /// Returns true once the export file can be downloaded.
    pub fn is_complete(&self) -> bool {
        self.status == EXPORT_COMPLETE
    }

    /// Returns true if the job failed.
    pub fn is_failed(&self) -> bool {
        self.status == EXPORT_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_display_name() {
        assert_eq!(export_file_name("Security Config"), "security_config.json");
        assert_eq!(SimplifiedTemplate::new("Alert Export").file_name(), "alert_export.json");
    }

    #[test]
    fn options_document_shape() {
        let template = SimplifiedTemplate::new("Alert Export")
            .module("alerts", &["name", "status"])
            .module("incidents", &[]);

        let options = ExportTemplateOptions {
            modules: ExportTemplateOptions::modules_from(&template),
            picklist_iris: vec!["/api/3/picklist_names/abc".to_string()],
            connectors: vec![ConnectorInfo {
                label: "OpenAI".to_string(),
                name: "openai".to_string(),
                version: "1.2.0".to_string(),
            }],
            playbook_collections: vec![PlaybookCollectionInfo {
                label: "Incident Response".to_string(),
                uuid: "c0ffee".to_string(),
            }],
            view_templates: vec!["modules-alerts-list".to_string()],
        }
        .to_value();

        assert_eq!(options["modules"][0]["value"], "alerts");
        assert_eq!(options["modules"][0]["includedAttributes"][1], "status");
        assert_eq!(options["modules"][1]["includedAttributes"].as_array().unwrap().len(), 0);
        assert_eq!(options["picklistNames"][0], "/api/3/picklist_names/abc");
        assert_eq!(options["connectors"][0]["value"], "cyops-connector-openai-1.2.0");
        assert_eq!(options["playbooks"]["collections"][0]["value"], "c0ffee");
        assert_eq!(options["viewTemplates"][0], "modules-alerts-list");
        assert_eq!(options["playbookBlocks"]["includeGlobalVariables"], true);
    }

    #[test]
    fn export_status_flags() {
        let status: ExportStatus = serde_json::from_value(json!({
            "status": "Export Complete",
            "file": {"@id": "/api/3/files/f1"}
        }))
        .unwrap();
        assert!(status.is_complete());
        assert_eq!(status.file.unwrap().id.uuid(), "f1");

        let pending: ExportStatus =
            serde_json::from_value(json!({"status": "Exporting"})).unwrap();
        assert!(!pending.is_complete());
        assert!(!pending.is_failed());
    }
}
