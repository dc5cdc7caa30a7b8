//! Lazy, single-pass traversal of paginated collections.
//!
//! An [`ObjectList`] sends nothing when created. Each call to
//! [`ObjectList::next`] drains the current page and only requests the next
//! one once the page is used up:
//!
//! ```text
//! Initial --fetch--> HasMore(cursor) --fetch--> ... --fetch--> Exhausted
//! ```
//!
//! The continuation comes from the `Link` header (`rel="next"`), falling
//! back to `X-Next-Page`. A missing or malformed continuation ends the
//! sequence after the current page, and so does a continuation that points
//! back at the page just fetched. A short page is not treated as the end on
//! its own.
//!
//! Servers behind a proxy often announce links under their own
//! `external_url`. Such links are followed as announced with a warning,
//! unless [`keep_base_url`](crate::GitlabConfigBuilder::keep_base_url) is
//! set, in which case everything before the API prefix is replaced by the
//! configured URL.

use std::collections::{HashMap, VecDeque};

use futures::stream::{self, Stream};
use serde_json::Value;
use url::{Position, Url};

use crate::clients::PaginationInfo;
use crate::rest::manager::json_type;
use crate::rest::options::to_query;
use crate::rest::{ListOptions, ResourceError, RestManager, RestObject};

/// Continuation state between two page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Page number, sent as the `page` query parameter.
    Page(u32),
    /// Absolute URL of the next page, as announced by the server.
    Link(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PagerState {
    Initial,
    HasMore(Cursor),
    Exhausted,
}

/// A lazy sequence of objects from a list operation.
///
/// # Example
///
/// ```rust,ignore
/// use gitlab_api::rest::{ListMixin, ListOptions};
///
/// let mut issues = manager.list(&ListOptions::new().filter("state", "opened"))?;
/// while let Some(issue) = issues.next().await? {
///     println!("#{} {}", issue.get_i64("iid")?, issue.get_str("title")?);
/// }
/// println!("{} requests", issues.requests_issued());
/// ```
#[derive(Debug)]
pub struct ObjectList {
    manager: RestManager,
    query: HashMap<String, String>,
    follow: bool,
    state: PagerState,
    buffer: VecDeque<Value>,
    pagination: PaginationInfo,
    requests: u32,
}

// Verify ObjectList is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ObjectList>();
};

impl ObjectList {
    pub(crate) fn new(manager: RestManager, options: &ListOptions) -> Self {
        let mut query = to_query(&options.filters);

        let per_page = options
            .per_page
            .or_else(|| manager.client().config().per_page().map(|p| p.get()));
        if let Some(per_page) = per_page {
            query.insert("per_page".to_string(), per_page.to_string());
        }
        if let Some(page) = options.page {
            query.insert("page".to_string(), page.to_string());
        }

        Self {
            manager,
            query,
            follow: options.page.is_none(),
            state: PagerState::Initial,
            buffer: VecDeque::new(),
            pagination: PaginationInfo::default(),
            requests: 0,
        }
    }

    /// Returns the next object, requesting the next page when needed.
    ///
    /// # Errors
    ///
    /// The mapped HTTP error of a page request, or
    /// [`ResourceError::UnexpectedResponse`] if a page is not a JSON array.
    /// The sequence is exhausted after an error.
    pub async fn next(&mut self) -> Result<Option<RestObject>, ResourceError> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return self.manager.object_from_value(item).map(Some);
            }

            let cursor = match std::mem::replace(&mut self.state, PagerState::Exhausted) {
                PagerState::Exhausted => return Ok(None),
                PagerState::Initial => None,
                PagerState::HasMore(cursor) => Some(cursor),
            };
            self.fetch(cursor).await?;
        }
    }

    async fn fetch(&mut self, cursor: Option<Cursor>) -> Result<(), ResourceError> {
        let response = match &cursor {
            None => {
                let query = (!self.query.is_empty()).then(|| self.query.clone());
                self.manager.client().get(self.manager.path(), query).await
            }
            Some(Cursor::Page(page)) => {
                let mut query = self.query.clone();
                query.insert("page".to_string(), page.to_string());
                self.manager.client().get(self.manager.path(), Some(query)).await
            }
            Some(Cursor::Link(url)) => self.manager.client().get(url, None).await,
        }
        .map_err(|e| self.manager.map_http_error(e, None))?;
        self.requests += 1;

        let items = match response.body {
            Value::Array(items) => items,
            other => {
                return Err(ResourceError::UnexpectedResponse {
                    resource: self.manager.name(),
                    message: format!("expected a JSON array page, got {}", json_type(&other)),
                })
            }
        };

        tracing::debug!(
            resource = self.manager.name(),
            cursor = ?cursor,
            items = items.len(),
            "Fetched page"
        );

        self.buffer.extend(items);
        self.pagination = response.pagination;

        if self.follow {
            if let Some(next) = self.continuation(cursor.as_ref()) {
                self.state = PagerState::HasMore(next);
            }
        }
        Ok(())
    }

    fn continuation(&self, current: Option<&Cursor>) -> Option<Cursor> {
        let next = if let Some(link) = &self.pagination.next_link {
            Cursor::Link(self.rebase_link(link)?)
        } else {
            let page = self.pagination.next_page?;
            if self.pagination.current_page == Some(page) {
                return None;
            }
            Cursor::Page(page)
        };

        if current == Some(&next) {
            tracing::warn!(
                resource = self.manager.name(),
                cursor = ?next,
                "Server repeated the current page as next; stopping"
            );
            return None;
        }
        Some(next)
    }

    /// Resolves `link` against the configured base URL.
    fn rebase_link(&self, link: &str) -> Option<String> {
        let config = self.manager.client().config();
        let configured = Url::parse(config.url().as_ref()).ok()?;
        let base = configured.as_str().trim_end_matches('/');
        let url = Url::parse(link)
            .or_else(|_| configured.join(link))
            .ok()?;

        let under_base = url
            .as_str()
            .strip_prefix(base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']));
        if under_base {
            return Some(url.into());
        }

        let tail = &url[Position::BeforePath..];
        let marker = format!("/{}", config.api_version().path_prefix());
        let Some(index) = tail.find(&marker) else {
            return Some(url.into());
        };

        if config.keep_base_url() {
            return Some(format!("{base}{}", &tail[index..]));
        }
        tracing::warn!(
            link = %url,
            server = base,
            "Pagination link uses a different base URL than configured; \
             set keep_base_url to rewrite it"
        );
        Some(url.into())
    }

    /// Consumes the rest of the sequence, sequentially and in server order.
    ///
    /// # Errors
    ///
    /// The first error encountered; objects gathered so far are dropped.
    pub async fn collect_all(mut self) -> Result<Vec<RestObject>, ResourceError> {
        let mut objects = Vec::new();
        while let Some(object) = self.next().await? {
            objects.push(object);
        }
        Ok(objects)
    }

    /// Converts the sequence into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<RestObject, ResourceError>> {
        stream::try_unfold(self, |mut list| async move {
            let object = list.next().await?;
            Ok(object.map(|object| (object, list)))
        })
    }

    /// Total number of objects, if the server reported it.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.pagination.total
    }

    /// Total number of pages, if the server reported it.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.pagination.total_pages
    }

    /// Page size reported by the server.
    #[must_use]
    pub const fn per_page(&self) -> Option<u32> {
        self.pagination.per_page
    }

    /// Number of the last fetched page.
    #[must_use]
    pub const fn current_page(&self) -> Option<u32> {
        self.pagination.current_page
    }

    /// Number of the next page, if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        self.pagination.next_page
    }

    /// Requests sent so far.
    #[must_use]
    pub const fn requests_issued(&self) -> u32 {
        self.requests
    }

    /// Returns `true` once no further page will be requested and the
    /// current page has been drained.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state == PagerState::Exhausted && self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::RestClient;
    use crate::config::{GitlabConfig, PerPage, ServerUrl};
    use crate::rest::{Capability, CapabilitySet, ResourceDefinition};
    use serde_json::json;

    static PROJECTS: ResourceDefinition = ResourceDefinition::new("project", "projects")
        .capabilities(CapabilitySet::NONE.with(Capability::List));

    fn list_at(url: &str, keep_base_url: bool, options: &ListOptions) -> ObjectList {
        let config = GitlabConfig::builder()
            .url(ServerUrl::new(url).unwrap())
            .per_page(PerPage::new(20).unwrap())
            .keep_base_url(keep_base_url)
            .build()
            .unwrap();
        let manager = RestClient::new(config).unwrap().manager(&PROJECTS).unwrap();
        ObjectList::new(manager, options)
    }

    fn list(options: &ListOptions) -> ObjectList {
        list_at("https://gitlab.example.com:8443", false, options)
    }

    #[test]
    fn test_query_uses_configured_page_size() {
        let projects = list(&ListOptions::new().filter("owned", true));
        assert_eq!(projects.query["per_page"], "20");
        assert_eq!(projects.query["owned"], "true");
        assert!(projects.follow);
        assert_eq!(projects.state, PagerState::Initial);

        let page = list(&ListOptions::new().per_page(5).page(3));
        assert_eq!(page.query["per_page"], "5");
        assert_eq!(page.query["page"], "3");
        assert!(!page.follow);
    }

    #[test]
    fn test_continuation_prefers_link_header() {
        let mut projects = list(&ListOptions::new());
        projects.pagination = PaginationInfo {
            next_link: Some("https://gitlab.example.com:8443/api/v4/projects?id_after=9".into()),
            next_page: Some(2),
            ..PaginationInfo::default()
        };
        assert_eq!(
            projects.continuation(None),
            Some(Cursor::Link(
                "https://gitlab.example.com:8443/api/v4/projects?id_after=9".to_string()
            ))
        );
    }

    #[test]
    fn test_foreign_link_is_followed_as_announced_by_default() {
        let projects = list(&ListOptions::new());
        assert_eq!(
            projects
                .rebase_link("http://internal:80/api/v4/projects?page=2")
                .as_deref(),
            Some("http://internal/api/v4/projects?page=2")
        );
    }

    #[test]
    fn test_kept_base_url_replaces_prefix_before_api() {
        let projects = list_at("https://proxy.example.com/gitlab", true, &ListOptions::new());
        assert_eq!(
            projects
                .rebase_link("http://internal/api/v4/projects?page=2")
                .as_deref(),
            Some("https://proxy.example.com/gitlab/api/v4/projects?page=2")
        );
        assert_eq!(
            projects
                .rebase_link("http://internal/mirror/api/v4/projects?id_after=5")
                .as_deref(),
            Some("https://proxy.example.com/gitlab/api/v4/projects?id_after=5")
        );
    }

    #[test]
    fn test_links_under_base_are_kept() {
        let projects = list_at("https://proxy.example.com/gitlab", true, &ListOptions::new());
        assert_eq!(
            projects
                .rebase_link("https://proxy.example.com/gitlab/api/v4/projects?page=3")
                .as_deref(),
            Some("https://proxy.example.com/gitlab/api/v4/projects?page=3")
        );
        assert_eq!(
            projects.rebase_link("/gitlab/api/v4/projects?page=4").as_deref(),
            Some("https://proxy.example.com/gitlab/api/v4/projects?page=4")
        );
    }

    #[test]
    fn test_continuation_stops_on_repeats_and_absence() {
        let mut projects = list(&ListOptions::new());
        assert_eq!(projects.continuation(None), None);

        projects.pagination.next_page = Some(2);
        assert_eq!(projects.continuation(None), Some(Cursor::Page(2)));
        assert_eq!(projects.continuation(Some(&Cursor::Page(2))), None);

        projects.pagination.current_page = Some(2);
        assert_eq!(projects.continuation(None), None);
    }

    #[tokio::test]
    async fn test_exhausted_list_sends_nothing() {
        let mut projects = list(&ListOptions::new());
        projects.state = PagerState::Exhausted;
        projects.buffer.push_back(json!({"id": 1}));

        assert!(!projects.is_exhausted());
        assert!(projects.next().await.unwrap().is_some());
        assert!(projects.next().await.unwrap().is_none());
        assert!(projects.is_exhausted());
        assert_eq!(projects.requests_issued(), 0);
    }
}
