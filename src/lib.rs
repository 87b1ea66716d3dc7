pub mod api;
pub mod config;
pub mod datasource;
pub mod error;
pub mod hawkular;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod time_range;

pub use error::{HawkularError, Result};
pub use hawkular::HawkularExecutor;
pub use registry::{Executor, ExecutorRegistry};
