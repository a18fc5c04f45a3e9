//! Application kernel wiring the container, the catalog and the factory chain.
//!
//! ```rust,ignore
//! use actus_runtime::Kernel;
//!
//! let kernel = Kernel::builder()
//!     .instance("db", Database::connect(url)?)
//!     .domain("blog.list", |c| Ok(ListPosts::new(get_as(c, "db")?)))?
//!     .responder("blog.html", |_| Ok(HtmlResponder))?
//!     .build()?;
//!
//! let response = kernel
//!     .handle(vec![json!("blog.list"), json!("blog.html")], vec![], request)
//!     .await?;
//! ```
//!
//! Handler values go through three factories, outermost first:
//!
//! ```text
//! ActionResolver ──▶ ContainerResolver ──▶ BasicDispatcherFactory
//! ```

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use actus_core::{
    BasicDispatcherFactory, BoxedContainer, BoxedMiddleware, BoxedRequestHandler, Container,
    ContainerError, ContainerResolver, Dispatcher, DispatcherFactory, HandlerValue,
    MiddlewareQueue, Request, Response, ServiceContainer,
};
use actus_framework::{ActionCatalog, ActionResolver, Domain, Responder};

use crate::config::{ActusConfig, ConfigLoader, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// The factory chain a [`Kernel`] dispatches through.
pub type KernelFactory = ActionResolver<ContainerResolver<BasicDispatcherFactory>>;

/// A configured application: services, actions and the dispatcher factory.
pub struct Kernel {
    config: ActusConfig,
    container: BoxedContainer,
    catalog: Arc<ActionCatalog>,
    factory: KernelFactory,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub fn config(&self) -> &ActusConfig {
        &self.config
    }

    pub fn container(&self) -> &BoxedContainer {
        &self.container
    }

    pub fn catalog(&self) -> &Arc<ActionCatalog> {
        &self.catalog
    }

    /// The outermost dispatcher factory.
    pub fn factory(&self) -> &KernelFactory {
        &self.factory
    }

    /// Installs the global tracing subscriber described by the configuration.
    pub fn init_logging(&self) {
        logging::init_from_config(&self.config.logging);
    }

    /// Builds a dispatcher for `handler` wrapped in `middleware`.
    pub fn dispatcher(
        &self,
        handler: impl Into<HandlerValue>,
        middleware: MiddlewareQueue,
    ) -> RuntimeResult<Dispatcher> {
        Ok(self.factory.create(handler.into(), middleware)?)
    }

    /// Builds a dispatcher and runs `request` through it.
    pub async fn handle(
        &self,
        handler: impl Into<HandlerValue>,
        middleware: MiddlewareQueue,
        request: Request,
    ) -> RuntimeResult<Response> {
        let dispatcher = self.dispatcher(handler, middleware)?;
        Ok(dispatcher.dispatch(request).await?)
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// KernelBuilder
// =============================================================================

/// Builder registering services, handlers, domains and responders.
///
/// Without an explicit [`config`](Self::config) the configuration is loaded
/// through a [`ConfigLoader`] when [`build`](Self::build) runs.
pub struct KernelBuilder {
    config: Option<ActusConfig>,
    config_loader: ConfigLoader,
    container: ServiceContainer,
    catalog: ActionCatalog,
    custom_default_responder: bool,
}

impl std::fmt::Debug for KernelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelBuilder")
            .field("config", &self.config)
            .field("container", &self.container)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            config_loader: ConfigLoader::new(),
            container: ServiceContainer::new(),
            catalog: ActionCatalog::new(),
            custom_default_responder: false,
        }
    }

    /// Uses `config` as is; nothing is loaded.
    pub fn config(mut self, config: ActusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from this file.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Ignores `ACTUS_*` environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    // -------------------------------------------------------------------------
    // Services
    // -------------------------------------------------------------------------

    /// Registers a ready-made service.
    pub fn instance<T>(mut self, id: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.container.instance(id, value);
        self
    }

    /// Registers a service built once, on first use.
    pub fn singleton<T, F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.container.singleton(id, factory);
        self
    }

    /// Registers a service built on every lookup.
    pub fn factory<T, F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn Container) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.container.factory(id, factory);
        self
    }

    /// Registers a request handler that can be referred to by `id`.
    pub fn handler(mut self, id: impl Into<String>, handler: BoxedRequestHandler) -> Self {
        self.container.instance(id, handler);
        self
    }

    /// Registers a middleware that can be referred to by `id`.
    pub fn middleware(mut self, id: impl Into<String>, middleware: BoxedMiddleware) -> Self {
        self.container.instance(id, middleware);
        self
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Registers a domain.
    pub fn domain<D, F>(mut self, id: &str, factory: F) -> RuntimeResult<Self>
    where
        D: Domain,
        F: Fn(&dyn Container) -> Result<D, ContainerError> + Send + Sync + 'static,
    {
        self.catalog.register_domain(id, factory)?;
        Ok(self)
    }

    /// Registers a responder.
    pub fn responder<R, F>(mut self, id: &str, factory: F) -> RuntimeResult<Self>
    where
        R: Responder,
        F: Fn(&dyn Container) -> Result<R, ContainerError> + Send + Sync + 'static,
    {
        self.catalog.register_responder(id, factory)?;
        Ok(self)
    }

    /// Replaces the default responder; `responder.*` settings no longer apply.
    pub fn default_responder<R, F>(mut self, factory: F) -> Self
    where
        R: Responder,
        F: Fn(&dyn Container) -> Result<R, ContainerError> + Send + Sync + 'static,
    {
        self.catalog.set_default_responder(factory);
        self.custom_default_responder = true;
        self
    }

    /// Validates the configuration and assembles the kernel.
    pub fn build(self) -> RuntimeResult<Kernel> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };
        validate_config(&config)?;

        let mut catalog = self.catalog;
        if !self.custom_default_responder {
            let responder = config.responder;
            catalog.set_default_responder(move |_| Ok(responder));
            debug!(pretty = responder.pretty, "Configured default JSON responder");
        }

        let container: BoxedContainer = Arc::new(self.container);
        let catalog = Arc::new(catalog);
        let factory = ActionResolver::new(
            Arc::clone(&container),
            Arc::clone(&catalog),
            ContainerResolver::new(Arc::clone(&container), BasicDispatcherFactory),
        )
        .with_input_sources(config.action);

        info!(
            domains = catalog.domain_count(),
            responders = catalog.responder_count(),
            "Kernel ready"
        );

        Ok(Kernel {
            config,
            container,
            catalog,
            factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use actus_core::{
        Body, FactoryError, HandlerError, Middleware, MiddlewareValue, Next, get_as, handler_fn,
    };
    use actus_framework::{CatalogError, InputSources, Input, JsonResponder, Payload};
    use async_trait::async_trait;
    use http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    struct ListPosts {
        site: Arc<String>,
    }

    #[async_trait]
    impl Domain for ListPosts {
        async fn call(&self, input: Input) -> Result<Payload, HandlerError> {
            Ok(Payload::success(json!({
                "site": self.site.as_str(),
                "page": input.get("page").cloned().unwrap_or(Value::Null),
            })))
        }
    }

    /// Records its name, then hands over to the rest of the chain.
    struct Trace {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Trace {
        async fn process(&self, request: Request, next: Next<'_>) -> Result<Response, HandlerError> {
            self.seen.lock().unwrap().push(self.name);
            next.run(request).await
        }
    }

    fn builder() -> KernelBuilder {
        Kernel::builder()
            .config(ActusConfig::default())
            .instance("site", String::from("example.org"))
            .domain("blog.list", |c| {
                Ok(ListPosts {
                    site: get_as::<String>(c, "site")?,
                })
            })
            .unwrap()
    }

    fn get(uri: &str) -> Request {
        http::Request::builder().uri(uri).body(Body::new()).unwrap()
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_action_end_to_end() {
        let kernel = builder().build().unwrap();

        let response = kernel
            .handle("blog.list", vec![], get("/posts?page=2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(&response),
            json!({"site": "example.org", "page": "2"})
        );
    }

    #[tokio::test]
    async fn test_container_handler_and_middleware_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let kernel = builder()
            .handler(
                "home",
                handler_fn(|_req| async { Ok(Response::new(Body::from_static(b"home"))) }),
            )
            .middleware(
                "first",
                Arc::new(Trace {
                    name: "first",
                    seen: Arc::clone(&seen),
                }),
            )
            .build()
            .unwrap();

        let second = MiddlewareValue::instance(Trace {
            name: "second",
            seen: Arc::clone(&seen),
        });
        let response = kernel
            .handle("home", vec!["first".into(), second], get("/"))
            .await
            .unwrap();

        assert_eq!(response.body().as_ref(), b"home");
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unknown_handler_fails_in_factory() {
        let kernel = builder().build().unwrap();

        let err = kernel.dispatcher("missing", vec![]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Factory(FactoryError::UnresolvedHandler(_))
        ));
    }

    #[test]
    fn test_invalid_definition_falls_through() {
        let kernel = builder().build().unwrap();

        let err = kernel
            .dispatcher(vec![json!("blog.list"), json!("no.such.responder")], vec![])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::Factory(_)));
    }

    #[test]
    fn test_duplicate_domain() {
        let err = builder()
            .domain("blog.list", |_| {
                Ok(ListPosts {
                    site: Arc::new(String::new()),
                })
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::Catalog(CatalogError::DuplicateDomain(_))
        ));
    }

    #[tokio::test]
    async fn test_config_drives_responder_and_sources() {
        let config = ActusConfig {
            action: InputSources::NONE,
            responder: JsonResponder::new().pretty(),
            ..Default::default()
        };
        let kernel = builder().config(config).build().unwrap();

        let response = kernel
            .handle(
                vec![json!("blog.list"), json!(actus_framework::DEFAULT_RESPONDER), json!({"page": 1})],
                vec![],
                get("/posts?page=9"),
            )
            .await
            .unwrap();

        assert!(response.body().contains(&b'\n'));
        assert_eq!(body_json(&response)["page"], 1);
    }

    #[tokio::test]
    async fn test_custom_default_responder_kept() {
        struct Plain;

        impl Responder for Plain {
            fn respond(&self, _request: &Request, _payload: Payload) -> Result<Response, HandlerError> {
                Ok(Response::new(Body::from_static(b"plain")))
            }
        }

        let config = ActusConfig {
            responder: JsonResponder::new().pretty(),
            ..Default::default()
        };
        let kernel = builder()
            .config(config)
            .default_responder(|_| Ok(Plain))
            .build()
            .unwrap();

        let response = kernel.handle("blog.list", vec![], get("/")).await.unwrap();
        assert_eq!(response.body().as_ref(), b"plain");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ActusConfig::default();
        config.logging.output = crate::config::LogOutput::File;

        let err = builder().config(config).build().unwrap_err();
        assert!(matches!(err, RuntimeError::Config(_)));
    }
}
