//! Client handle that owns the shared collaborators of every builder

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use keeper_common::{CommonError, LoggingTracerDriver, OperationTrace, RetryConfig, TracerDriver};
use keeper_domain::{Acl, ClientConfig, KeeperResult, RetrySettings};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::submission::BackgroundTask;
use crate::acl::{AclProvider, DefaultAclProvider};
use crate::builders::{GetAclBuilder, SetAclBuilder};
use crate::namespace::{Namespace, NamespaceTranslator};
use crate::ports::ConnectionProvider;
use crate::retry::{retry_config_from_settings, RetryLoop, SharedRetryPolicy};

/// Entry point for building operations against the coordination service
///
/// Cheap to clone; clones share the connection provider, retry loop and
/// background limit.
#[derive(Clone)]
pub struct KeeperClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    provider: Arc<dyn ConnectionProvider>,
    namespace: Arc<dyn NamespaceTranslator>,
    acl_provider: Arc<dyn AclProvider>,
    retry_loop: RetryLoop,
    tracer: Arc<dyn TracerDriver>,
    background_limit: Option<Arc<Semaphore>>,
}

impl KeeperClient {
    pub fn builder(provider: Arc<dyn ConnectionProvider>) -> KeeperClientBuilder {
        KeeperClientBuilder::new(provider)
    }

    /// Build a client from loaded configuration
    pub fn from_config(
        provider: Arc<dyn ConnectionProvider>,
        config: &ClientConfig,
    ) -> KeeperResult<Self> {
        config.validate()?;

        let mut builder = Self::builder(provider)
            .retry_config(retry_config_from_settings(&config.retry)?);
        if let Some(namespace) = &config.namespace {
            builder = builder.namespace(namespace.clone());
        }
        if !config.default_acl.is_empty() {
            builder = builder
                .acl_provider(Arc::new(DefaultAclProvider::new(config.default_acl.clone())));
        }
        if let Some(limit) = config.background.max_concurrent {
            builder = builder.max_background_operations(limit);
        }
        builder.build()
    }

    /// A client over the same connections scoped to a different namespace
    ///
    /// `None` or `"/"` removes the namespace.
    pub fn using_namespace(&self, namespace: Option<&str>) -> KeeperResult<Self> {
        let namespace = Namespace::from_option(namespace)?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                provider: Arc::clone(&self.inner.provider),
                namespace: Arc::new(namespace),
                acl_provider: Arc::clone(&self.inner.acl_provider),
                retry_loop: self.inner.retry_loop.clone(),
                tracer: Arc::clone(&self.inner.tracer),
                background_limit: self.inner.background_limit.clone(),
            }),
        })
    }

    /// Start a get-ACL operation
    pub fn get_acl(&self) -> GetAclBuilder {
        GetAclBuilder::new(self.clone())
    }

    /// Start a set-ACL operation
    pub fn set_acl(&self) -> SetAclBuilder {
        SetAclBuilder::new(self.clone())
    }

    pub fn namespace(&self) -> &dyn NamespaceTranslator {
        self.inner.namespace.as_ref()
    }

    pub fn acl_provider(&self) -> &Arc<dyn AclProvider> {
        &self.inner.acl_provider
    }

    pub fn retry_loop(&self) -> &RetryLoop {
        &self.inner.retry_loop
    }

    pub fn connection_provider(&self) -> &Arc<dyn ConnectionProvider> {
        &self.inner.provider
    }

    /// Start a diagnostic trace reported to the client's tracer driver
    pub fn start_trace(&self, label: &str) -> OperationTrace {
        OperationTrace::start(label, Arc::clone(&self.inner.tracer))
    }

    /// Run `work` on its own task, traced under `label`
    ///
    /// Returns immediately. With a background limit configured, the task
    /// waits for a permit before running.
    pub(crate) fn spawn_background<F>(&self, label: &'static str, work: F) -> BackgroundTask
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let limit = self.inner.background_limit.clone();
        let tracer = Arc::clone(&self.inner.tracer);

        let handle = tokio::spawn(async move {
            let _permit = match limit {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        warn!(operation = label, "Background limiter closed, running unbounded");
                        None
                    }
                },
                None => None,
            };

            let _trace = OperationTrace::start(label, tracer);
            work.await;
        });

        debug!(operation = label, "Dispatched background operation");
        BackgroundTask::new(label, handle)
    }
}

impl fmt::Debug for KeeperClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeeperClient")
            .field("namespace", &self.inner.namespace.namespace())
            .field("acl_provider", &self.inner.acl_provider)
            .field("retry_loop", &self.inner.retry_loop)
            .field(
                "background_permits",
                &self.inner.background_limit.as_ref().map(|limit| limit.available_permits()),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`KeeperClient`]
pub struct KeeperClientBuilder {
    provider: Arc<dyn ConnectionProvider>,
    namespace: Option<String>,
    translator: Option<Arc<dyn NamespaceTranslator>>,
    retry_config: Option<RetryConfig>,
    retry_policy: Option<SharedRetryPolicy>,
    acl_provider: Option<Arc<dyn AclProvider>>,
    tracer: Option<Arc<dyn TracerDriver>>,
    max_background_operations: Option<usize>,
}

impl KeeperClientBuilder {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            namespace: None,
            translator: None,
            retry_config: None,
            retry_policy: None,
            acl_provider: None,
            tracer: None,
            max_background_operations: None,
        }
    }

    /// Scope every path under `namespace`
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Use a custom path translator; overrides [`Self::namespace`]
    pub fn namespace_translator(mut self, translator: Arc<dyn NamespaceTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Additional policy consulted for connection faults
    pub fn retry_policy(mut self, policy: SharedRetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn acl_provider(mut self, provider: Arc<dyn AclProvider>) -> Self {
        self.acl_provider = Some(provider);
        self
    }

    /// Shorthand for a [`DefaultAclProvider`] over `acl`
    pub fn default_acl(self, acl: Vec<Acl>) -> Self {
        self.acl_provider(Arc::new(DefaultAclProvider::new(acl)))
    }

    pub fn tracer(mut self, tracer: Arc<dyn TracerDriver>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Bound how many background operations execute at once
    pub fn max_background_operations(mut self, limit: usize) -> Self {
        self.max_background_operations = Some(limit);
        self
    }

    pub fn build(self) -> KeeperResult<KeeperClient> {
        let namespace: Arc<dyn NamespaceTranslator> = match self.translator {
            Some(translator) => translator,
            None => Arc::new(Namespace::from_option(self.namespace.as_deref())?),
        };

        let retry_config = match self.retry_config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => retry_config_from_settings(&RetrySettings::default())?,
        };
        let retry_loop = match self.retry_policy {
            Some(policy) => RetryLoop::with_policy(Arc::clone(&self.provider), retry_config, policy),
            None => RetryLoop::new(Arc::clone(&self.provider), retry_config),
        };

        let background_limit = match self.max_background_operations {
            Some(0) => {
                return Err(CommonError::config_field(
                    "max_background_operations",
                    "limit must be greater than 0",
                )
                .into())
            }
            Some(limit) => Some(Arc::new(Semaphore::new(limit))),
            None => None,
        };

        let acl_provider: Arc<dyn AclProvider> = match self.acl_provider {
            Some(provider) => provider,
            None => Arc::new(DefaultAclProvider::default()),
        };
        let tracer: Arc<dyn TracerDriver> = match self.tracer {
            Some(tracer) => tracer,
            None => Arc::new(LoggingTracerDriver),
        };

        Ok(KeeperClient {
            inner: Arc::new(ClientInner {
                provider: self.provider,
                namespace,
                acl_provider,
                retry_loop,
                tracer,
                background_limit,
            }),
        })
    }
}
