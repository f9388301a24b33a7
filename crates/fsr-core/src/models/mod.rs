//! Request and response shapes shared by the resource APIs.
//!
//! Records themselves stay as `serde_json::Value`; only the envelopes and the
//! documents this library builds are typed.

mod collection;
mod export;
mod query;
mod solution_pack;

pub use collection::Collection;
pub use export::{
    ConnectorInfo, EXPORT_COMPLETE, EXPORT_FAILED, ExportFile, ExportJob, ExportStatus,
    ExportTemplateOptions, PlaybookCollectionInfo, SimplifiedTemplate, export_file_name,
};
pub use query::ListParams;
pub use solution_pack::{available_packs_query, installed_packs_query};
