//! Solution pack search and export.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use fsr_core::models::{available_packs_query, installed_packs_query};
use fsr_core::{Collection, Error, Operation, Result};

use crate::client::FortiSoar;
use crate::http::ApiRequest;

const SOLUTION_PACKS_QUERY: &str = "/api/query/solutionpacks";

/// Default page size for pack searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 30;

/// Search installed and available solution packs and export them.
#[derive(Debug, Clone, Copy)]
pub struct SolutionPacks<'a> {
    client: &'a FortiSoar,
}

impl<'a> SolutionPacks<'a> {
    pub(crate) fn new(client: &'a FortiSoar) -> Self {
        Self { client }
    }

    /// Installed packs matching a name, label or description.
    #[instrument(skip(self))]
    pub async fn search_installed(&self, term: &str, limit: u32) -> Result<Vec<Value>> {
        self.search(term, limit, installed_packs_query(term, limit))
            .await
    }

    /// First installed pack matching `term`.
    pub async fn find_installed(&self, term: &str) -> Result<Option<Value>> {
        Ok(self.search_installed(term, 1).await?.into_iter().next())
    }

    /// Packs available from the content hub matching `term`.
    #[instrument(skip(self))]
    pub async fn search_available(&self, term: &str, limit: u32) -> Result<Vec<Value>> {
        self.search(term, limit, available_packs_query(term, limit))
            .await
    }

    /// First available pack matching `term`.
    pub async fn find_available(&self, term: &str) -> Result<Option<Value>> {
        Ok(self.search_available(term, 1).await?.into_iter().next())
    }

    /// Export a pack's configuration through its export template.
    ///
    /// `identifier` is matched exactly against pack names (installed first,
    /// then available), falling back to the first installed search hit.
    /// The default output is `<name>_<version>.json`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no pack matches or the pack has no export
    /// template; export errors otherwise.
    #[instrument(skip(self))]
    pub async fn export_pack(&self, identifier: &str, output: Option<&Path>) -> Result<PathBuf> {
        self.client
            .scheme()
            .check_supported(Operation::SolutionPack)?;

        let pack = match self.pack_by_name(identifier).await? {
            Some(pack) => pack,
            None => self
                .find_installed(identifier)
                .await?
                .ok_or_else(|| Error::NotFound {
                    kind: "installed solution pack",
                    name: identifier.to_string(),
                })?,
        };

        let template_uuid = pack
            .pointer("/template/uuid")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::NotFound {
                kind: "export template for solution pack",
                name: identifier.to_string(),
            })?;

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(format!(
                "{}_{}.json",
                field(&pack, "name"),
                field(&pack, "version")
            )),
        };
        debug!(template = template_uuid, output = %output.display(), "exporting solution pack");

        self.client
            .export_config()
            .export_by_template_uuid(template_uuid, Some(&output))
            .await
    }

    async fn pack_by_name(&self, name: &str) -> Result<Option<Value>> {
        if let Some(pack) = self.find_installed(name).await? {
            if pack.get("name").and_then(Value::as_str) == Some(name) {
                return Ok(Some(pack));
            }
        }
        if let Some(pack) = self.find_available(name).await? {
            if pack.get("name").and_then(Value::as_str) == Some(name) {
                return Ok(Some(pack));
            }
        }
        Ok(None)
    }

    async fn search(&self, term: &str, limit: u32, body: Value) -> Result<Vec<Value>> {
        let request = ApiRequest::post(SOLUTION_PACKS_QUERY)
            .query("$limit", limit.to_string())
            .query("$page", "1")
            .query("$search", term)
            .json(body);
        let page: Collection = self.client.send(request).await?.parse()?;
        Ok(page.members)
    }
}

fn field<'v>(pack: &'v Value, name: &str) -> &'v str {
    pack.get(name).and_then(Value::as_str).unwrap_or("unknown")
}
