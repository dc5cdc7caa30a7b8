//! Integration tests for managers and objects against a mock GitLab server.
//!
//! Request counts are read back from the mock server to check that local
//! failures never reach the network and that saves send only what changed.

mod common;

use common::{attrs, client_for, request_count, EVENTS, ISSUES, PROJECTS, SETTINGS, VARIABLES};
use gitlab_api::rest::{
    CreateMixin, DeleteMixin, GetMixin, GetOptions, GetWithoutIdMixin, ListMixin, ListOptions,
    ResourceError, UpdateMixin,
};
use gitlab_api::{ErrorKind, HttpError};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn body_of(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

// ============================================================================
// Capabilities and local validation
// ============================================================================

#[tokio::test]
async fn test_unsupported_operations_send_no_requests() {
    let server = MockServer::start().await;
    let events = client_for(&server).manager(&EVENTS).unwrap();

    let create = events.create(attrs(json!({"action_name": "pushed"}))).await;
    let get = events.get(1u64, GetOptions::new()).await;
    let update = events.update(1u64, attrs(json!({"x": 1}))).await;
    let delete = events.delete(1u64).await;

    for result in [create.map(|_| ()), get.map(|_| ()), update.map(|_| ()), delete] {
        let error = result.unwrap_err();
        assert!(matches!(error, ResourceError::UnsupportedOperation { .. }));
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_missing_create_attributes_fail_before_request() {
    let server = MockServer::start().await;
    let projects = client_for(&server).manager(&PROJECTS).unwrap();

    let result = projects.create(attrs(json!({"path": "no-name"}))).await;

    match result {
        Err(error @ ResourceError::MissingAttributes { .. }) => {
            assert_eq!(error.kind(), ErrorKind::Validation);
            assert!(error.to_string().contains("name"));
        }
        other => panic!("expected MissingAttributes, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 0);
}

// ============================================================================
// Create, get, refresh
// ============================================================================

#[tokio::test]
async fn test_create_posts_data_and_returns_clean_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects"))
        .and(header("PRIVATE-TOKEN", "glpat-test-token"))
        .and(body_json(json!({"name": "demo", "visibility": "private"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 5, "name": "demo"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let project = projects
        .create(attrs(json!({"name": "demo", "visibility": "private"})))
        .await
        .unwrap();

    assert_eq!(project.get_i64("id").unwrap(), 5);
    assert!(project.updated_keys().is_empty());
    assert!(!project.is_lazy());
}

#[tokio::test]
async fn test_get_encodes_path_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapp"))
        .and(query_param("statistics", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 3, "name": "app"})),
        )
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let project = projects
        .get(
            "group/app",
            GetOptions::new().query_param("statistics", true),
        )
        .await
        .unwrap();
    assert_eq!(project.get_str("name").unwrap(), "app");
}

#[tokio::test]
async fn test_lazy_get_then_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42, "name": "lazy", "archived": false})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let mut project = projects
        .get(42u64, GetOptions::new().lazy(true))
        .await
        .unwrap();

    assert_eq!(request_count(&server).await, 0);
    assert!(project.is_lazy());
    assert!(matches!(
        project.get("name"),
        Err(ResourceError::UndefinedAttribute { lazy: true, .. })
    ));

    project.refresh().await.unwrap();

    assert_eq!(request_count(&server).await, 1);
    assert!(!project.is_lazy());
    assert_eq!(project.get_str("name").unwrap(), "lazy");
    assert!(!project.get_bool("archived").unwrap());
}

#[tokio::test]
async fn test_singleton_get_and_full_save() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/application/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signup_enabled": true,
            "home_page_url": "https://example.com",
            "id": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/application/settings"))
        .and(body_json(json!({
            "signup_enabled": true,
            "home_page_url": "https://example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signup_enabled": true,
            "home_page_url": "https://example.com",
            "id": 1
        })))
        .expect(2)
        .mount(&server)
        .await;

    let settings = client_for(&server).manager(&SETTINGS).unwrap();
    let mut current = settings.get_singleton(GetOptions::new()).await.unwrap();

    // The full policy always sends, even without local edits.
    current.save().await.unwrap();
    current.save().await.unwrap();
    assert_eq!(request_count(&server).await, 3);
}

// ============================================================================
// Updates
// ============================================================================

#[tokio::test]
async fn test_save_sends_only_changed_attributes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "name": "a", "value": "b"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1, "name": "a", "value": "c", "updated": true})),
        )
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let mut project = projects.get(1u64, GetOptions::new()).await.unwrap();

    project.set("value", "c").unwrap();
    assert_eq!(project.updated_keys(), vec!["value"]);
    project.save().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(body_of(&requests[1]), json!({"value": "c"}));
    assert!(project.updated_keys().is_empty());
    assert!(project.get_bool("updated").unwrap());
}

#[tokio::test]
async fn test_save_without_changes_is_a_no_op() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "a"})))
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let mut project = projects.get(1u64, GetOptions::new()).await.unwrap();

    assert_ok!(project.save().await);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_save_with_empty_response_keeps_local_values() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v4/variables/TOKEN"))
        .and(body_json(json!({"value": "new", "key": "TOKEN"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/variables"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"key": "TOKEN", "value": "old"})),
        )
        .mount(&server)
        .await;

    let variables = client_for(&server).manager(&VARIABLES).unwrap();
    let mut variable = variables
        .create(attrs(json!({"key": "TOKEN", "value": "old"})))
        .await
        .unwrap();

    variable.set("value", "new").unwrap();
    variable.save().await.unwrap();

    assert_eq!(variable.get_str("value").unwrap(), "new");
    assert!(!variable.is_dirty());
}

#[tokio::test]
async fn test_validation_errors_are_mapped() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": {"name": ["has already been taken"]}
        })))
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let result = projects.update(1u64, attrs(json!({"name": "taken"}))).await;

    match result {
        Err(ResourceError::ValidationFailed { status, errors, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(errors["name"], vec!["has already been taken"]);
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_deleted_object_refuses_further_use() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let mut project = projects.get_lazy(9u64).unwrap();

    project.delete().await.unwrap();
    assert!(project.is_deleted());

    assert!(matches!(
        project.set("name", "again"),
        Err(ResourceError::ObjectDeleted { .. })
    ));
    assert!(matches!(
        project.save().await,
        Err(ResourceError::ObjectDeleted { .. })
    ));
    assert!(matches!(
        project.delete().await,
        Err(ResourceError::ObjectDeleted { .. })
    ));
    assert_eq!(request_count(&server).await, 1);
}

// ============================================================================
// Nested managers
// ============================================================================

#[tokio::test]
async fn test_nested_manager_scope_is_captured_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/issues"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"iid": 1, "project_id": 7, "title": "first"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/issues/1/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 100}])))
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let mut project = projects.get(7u64, GetOptions::new()).await.unwrap();

    let issues = project.manager("issues").unwrap().clone();
    project.set("id", 8).unwrap();
    assert_eq!(project.manager("issues").unwrap().path(), "projects/7/issues");

    let mut all = issues.list_all(&ListOptions::new()).await.unwrap();
    assert_eq!(all.len(), 1);
    let issue = &mut all[0];
    assert_eq!(issue.get_i64("project_id").unwrap(), 7);

    let notes = issue.manager("notes").unwrap();
    assert_eq!(notes.path(), "projects/7/issues/1/notes");
    let notes = notes.list_all(&ListOptions::new()).await.unwrap();
    assert_eq!(notes[0].get_i64("id").unwrap(), 100);
}

#[tokio::test]
async fn test_unscoped_nested_manager_is_rejected() {
    let server = MockServer::start().await;
    let result = client_for(&server).manager(&ISSUES);

    assert!(matches!(
        &result,
        Err(ResourceError::UnresolvedPlaceholder { placeholder, .. }) if placeholder == "project_id"
    ));
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn test_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"message": "404 Project Not Found"}))
                .insert_header("X-Request-Id", "req-404"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let error = projects.get(404u64, GetOptions::new()).await.unwrap_err();

    match &error {
        ResourceError::NotFound {
            resource,
            id,
            status,
            message,
            request_id,
        } => {
            assert_eq!(*resource, "project");
            assert_eq!(id, "404");
            assert_eq!(*status, 404);
            assert_eq!(message, "404 Project Not Found");
            assert_eq!(request_id.as_deref(), Some("req-404"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.status(), Some(404));
    assert_eq!(error.request_id(), Some("req-404"));
}

#[tokio::test]
async fn test_401_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-Request-Id", "req-401")
                .set_body_json(json!({"message": "401 Unauthorized"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let error = projects.get(1u64, GetOptions::new()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Authentication);
    assert_eq!(error.request_id(), Some("req-401"));
    match error {
        ResourceError::Http(HttpError::Authentication(e)) => {
            assert_eq!(e.code, 401);
            assert!(e.message.contains("401 Unauthorized"));
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_parsing_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": 1,"))
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).manager(&PROJECTS).unwrap();
    let error = projects.get(1u64, GetOptions::new()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Parsing);
    assert!(matches!(error, ResourceError::Http(HttpError::Parse { code: 200, .. })));
}
