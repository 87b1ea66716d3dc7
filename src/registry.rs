use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    datasource::{DataSourceSettings, HAWKULAR_DATASOURCE},
    hawkular::HawkularExecutor,
    models::{BatchResult, Query, QueryContext},
    HawkularError, Result,
};

/// Common trait for data source executors
#[async_trait]
pub trait Executor: Send + Sync {
    /// Data source type this executor serves
    fn name(&self) -> &'static str;

    /// Run a batch of queries over a shared time range
    async fn execute(
        &self,
        cancel: &CancellationToken,
        queries: &[Query],
        ctx: &QueryContext,
    ) -> Result<BatchResult>;

    /// Check that the remote store answers
    async fn check_health(&self, cancel: &CancellationToken) -> Result<String>;
}

pub type ExecutorFactory = fn(&DataSourceSettings) -> Result<Arc<dyn Executor>>;

/// Maps data source type names to executor constructors.
#[derive(Default, Clone)]
pub struct ExecutorRegistry {
    factories: HashMap<String, ExecutorFactory>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HAWKULAR_DATASOURCE, new_hawkular_executor);
        registry
    }

    pub fn register(&mut self, name: &str, factory: ExecutorFactory) {
        info!("Registering executor: {}", name);
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, settings: &DataSourceSettings) -> Result<Arc<dyn Executor>> {
        let factory = self
            .factories
            .get(&settings.type_name)
            .ok_or_else(|| HawkularError::UnknownDataSource(settings.type_name.clone()))?;

        factory(settings)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn new_hawkular_executor(settings: &DataSourceSettings) -> Result<Arc<dyn Executor>> {
    Ok(Arc::new(HawkularExecutor::new(settings)?))
}
