//! Resource APIs layered on [`FortiSoar::send`](crate::FortiSoar::send).

mod alerts;
mod export_config;
mod files;
mod solution_packs;

pub use alerts::Alerts;
pub use export_config::ExportConfig;
pub(crate) use export_config::ExportCache;
pub use files::{Files, mime_for_path};
pub use solution_packs::{DEFAULT_SEARCH_LIMIT, SolutionPacks};
