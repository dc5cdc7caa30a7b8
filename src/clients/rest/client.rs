//! The top-level client handle.
//!
//! [`RestClient`] owns the configuration and the [`HttpClient`] and hands out
//! resource managers. It is cheap to clone; clones share the connection pool.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{
    CancellationToken, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport,
};
use crate::config::GitlabConfig;
use crate::rest::{ResourceDefinition, ResourceError, RestManager};

/// Client for the GitLab REST API.
///
/// # Example
///
/// ```rust,ignore
/// use gitlab_api::{GitlabConfig, RestClient, ServerUrl};
/// use gitlab_api::rest::ListMixin;
///
/// let config = GitlabConfig::builder()
///     .url(ServerUrl::new("https://gitlab.example.com")?)
///     .build()?;
/// let client = RestClient::new(config)?;
///
/// let projects = client.manager(&PROJECTS)?;
/// let mut list = projects.list(Default::default())?;
/// while let Some(project) = list.next().await? {
///     println!("{}", project.get_str("name")?);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: Arc<HttpClient>,
    config: Arc<GitlabConfig>,
    cancellation: Option<CancellationToken>,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a client using the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: GitlabConfig) -> Result<Self, HttpError> {
        let http_client = HttpClient::new(&config)?;
        Ok(Self::from_parts(config, http_client))
    }

    /// Creates a client that sends requests through `transport`.
    #[must_use]
    pub fn with_transport(config: GitlabConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let http_client = HttpClient::with_transport(&config, transport);
        Self::from_parts(config, http_client)
    }

    fn from_parts(config: GitlabConfig, http_client: HttpClient) -> Self {
        tracing::debug!(api_url = %config.api_url(), "Created GitLab REST client");
        Self {
            http_client: Arc::new(http_client),
            config: Arc::new(config),
            cancellation: None,
        }
    }

    /// Returns a handle whose requests observe `token`.
    ///
    /// Managers and objects created from the returned handle inherit it.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self.clone()
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GitlabConfig {
        &self.config
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Returns the cancellation token, if any.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    /// Creates a top-level manager for `definition`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidDefinition`] for a malformed definition
    /// and [`ResourceError::UnresolvedPlaceholder`] if its path needs a scope.
    pub fn manager(
        &self,
        definition: &'static ResourceDefinition,
    ) -> Result<RestManager, ResourceError> {
        RestManager::new(self.clone(), definition, Map::new())
    }

    /// Creates a manager whose path placeholders are filled from `scope`.
    ///
    /// # Errors
    ///
    /// Same as [`manager`](Self::manager).
    pub fn manager_with_scope(
        &self,
        definition: &'static ResourceDefinition,
        scope: Map<String, Value>,
    ) -> Result<RestManager, ResourceError> {
        RestManager::new(self.clone(), definition, scope)
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn get(
        &self,
        path: &str,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpMethod::Get, path, None, query).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn post(
        &self,
        path: &str,
        body: Value,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpMethod::Post, path, Some(body), query).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn put(
        &self,
        path: &str,
        body: Value,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpMethod::Put, path, Some(body), query).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn delete(
        &self,
        path: &str,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpMethod::Delete, path, None, query).await
    }

    /// Sends a request with any method.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::request`].
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: Option<HashMap<String, String>>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(method, path).maybe_body(body);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        let request = builder.build()?;
        self.http_client
            .request(request, self.cancellation.as_ref())
            .await
    }
}
