pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod schema;
pub mod store;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{run, run_with_store};
pub use report::RunReport;
