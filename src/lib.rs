//! # GitLab API Rust client
//!
//! An async client for the GitLab REST API built around declarative
//! resource managers: each resource kind declares its path, supported
//! operations and attribute rules once, and the runtime turns it into
//! managers, stateful objects and lazy paginated listings.
//!
//! ## Overview
//!
//! This crate provides:
//! - Validated configuration via [`GitlabConfig`] and [`GitlabConfigBuilder`]
//! - An HTTP layer with retries on rate limiting and transient server errors,
//!   safe for non-idempotent requests, behind a pluggable transport
//! - Resource managers whose operations come from capability traits
//! - Objects that track local edits and save only what changed
//! - Lazy, resumable pagination following `Link` and `X-Next-Page` headers
//! - Cooperative cancellation via [`CancellationToken`]
//!
//! ## Quick Start
//!
//! ```rust
//! use gitlab_api::{AuthToken, GitlabConfig, RestClient, ServerUrl};
//!
//! let config = GitlabConfig::builder()
//!     .url(ServerUrl::new("https://gitlab.example.com").unwrap())
//!     .auth(AuthToken::private("glpat-example").unwrap())
//!     .max_attempts(3)
//!     .build()
//!     .unwrap();
//!
//! let client = RestClient::new(config).unwrap();
//! assert_eq!(client.config().api_url(), "https://gitlab.example.com/api/v4");
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use gitlab_api::rest::{CapabilitySet, GetMixin, GetOptions, ListMixin, ListOptions,
//!     ResourceDefinition};
//!
//! static PROJECTS: ResourceDefinition = ResourceDefinition::new("project", "projects")
//!     .capabilities(CapabilitySet::CRUD);
//!
//! let projects = client.manager(&PROJECTS)?;
//!
//! // Lazy listing: one request per page, only as far as you read
//! let mut owned = projects.list(&ListOptions::new().filter("owned", true))?;
//! while let Some(project) = owned.next().await? {
//!     println!("{}", project.get_str("path_with_namespace")?);
//! }
//!
//! // Fetch, edit, save only the changed attribute
//! let mut project = projects.get(42u64, GetOptions::new()).await?;
//! project.set("description", "Maintained")?;
//! project.save().await?;
//! ```
//!
//! ## Error Handling
//!
//! Every error exposes an [`ErrorKind`] through `kind()`, so callers can
//! branch on the category without matching every variant:
//!
//! ```rust,ignore
//! use gitlab_api::ErrorKind;
//!
//! match projects.get(42u64, GetOptions::new()).await {
//!     Err(e) if e.kind() == ErrorKind::NotFound => println!("no such project"),
//!     Err(e) if e.kind() == ErrorKind::RateLimited => println!("slow down"),
//!     other => { other?; }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and transport are passed explicitly
//! - **Fail-fast validation**: local mistakes never reach the network
//! - **Thread-safe**: clients, managers and objects are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ApiVersion, AuthToken, GitlabConfig, GitlabConfigBuilder, PerPage, ServerUrl};
pub use error::{ConfigError, ErrorKind};

// Re-export HTTP client types
pub use clients::{
    CancellationToken, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    HttpTransport, RestClient,
};

// Re-export the resource core
pub use rest::{ResourceDefinition, ResourceError, RestManager, RestObject};
