//! End-to-end tests of the request pipeline against a mock backend:
//! bearer attachment, single-flight refresh coordination, retry-once
//! semantics, envelope normalization, and session restore.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use staffdesk_core::{
    AuthGateway, EmployeeFilter, EmployeeGateway, FormBuilder, SessionService, TokenStore,
};
use staffdesk_domain::{ApiConfig, SessionState};
use staffdesk_infra::{ApiClient, MemoryVault, RefreshTokenVault, SessionTokenStore};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("staffdesk_infra=debug").try_init();
}

async fn store_with(access: Option<&str>, refresh: Option<&str>) -> Arc<SessionTokenStore> {
    let vault = match refresh {
        Some(token) => Arc::new(MemoryVault::with_token(token)),
        None => Arc::new(MemoryVault::default()),
    };
    let store = Arc::new(SessionTokenStore::initialize(vault).await.expect("token store"));
    if let Some(token) = access {
        store.set_access_token(Some(token.to_string())).await.expect("set access");
    }
    store
}

fn client_against(server: &MockServer, store: Arc<SessionTokenStore>) -> Arc<ApiClient> {
    let config = ApiConfig { base_url: server.uri(), ..Default::default() };
    Arc::new(ApiClient::new(&config, store).expect("api client"))
}

fn profile_body() -> serde_json::Value {
    json!({
        "username": "jsmith",
        "full_name": "Jan Smith",
        "email": "jsmith@example.com",
        "phone": null,
        "avatar": null
    })
}

/// Stale token is rejected, fresh token accepted; the refresh endpoint
/// answers slowly so concurrent 401s pile up behind one refresh.
async fn mount_refresh_scenario(server: &MockServer, refresh_delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/refresh/"))
        .and(body_json(json!({"refresh": "ref-1"})))
        .respond_with(
            ResponseTemplate::new(200).set_delay(refresh_delay).set_body_json(json!({
                "access": "fresh"
            })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    init_tracing();
    let server = MockServer::start().await;
    // Long enough that every concurrent 401 lands while the refresh is still
    // in flight.
    mount_refresh_scenario(&server, Duration::from_millis(500)).await;

    let store = store_with(Some("stale"), Some("ref-1")).await;
    let client = client_against(&server, store.clone());

    let results = futures::future::join_all(
        (0..5).map(|_| {
            let client = client.clone();
            async move { client.fetch_profile().await }
        }),
    )
    .await;

    // All five requests succeeded with the refreshed token
    for result in results {
        assert_eq!(result.expect("profile").username, "jsmith");
    }

    // Exactly one refresh call was issued (also enforced by expect(1))
    let refresh_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/admin/refresh/")
        .count();
    assert_eq!(refresh_calls, 1);

    assert_eq!(store.access_token().await.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn refresh_failure_fails_all_waiters_and_clears_the_store() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({"detail": "token expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let vault = Arc::new(MemoryVault::with_token("ref-1"));
    let store =
        Arc::new(SessionTokenStore::initialize(vault.clone()).await.expect("token store"));
    store.set_access_token(Some("stale".to_string())).await.unwrap();
    let client = client_against(&server, store.clone());

    let results = futures::future::join_all(
        (0..4).map(|_| {
            let client = client.clone();
            async move { client.fetch_profile().await }
        }),
    )
    .await;

    // Never a mix: every request failed
    assert!(results.iter().all(Result::is_err));

    // Escalated to full logout: both tokens gone, including the persisted one
    assert_eq!(store.access_token().await, None);
    assert_eq!(store.refresh_token().await, None);
    assert_eq!(vault.load().await.unwrap(), None);
}

#[tokio::test]
async fn a_second_401_after_retry_is_final() {
    let server = MockServer::start().await;

    // The backend rejects every credential, including the refreshed one
    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2) // initial attempt + exactly one retry, never a third
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("stale"), Some("ref-1")).await;
    let client = client_against(&server, store);

    let result = client.fetch_profile().await;
    assert!(result.is_err());

    let profile_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/main/profile/")
        .count();
    assert_eq!(profile_calls, 2);
}

#[tokio::test]
async fn missing_refresh_token_fails_fast_without_a_refresh_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_with(Some("stale"), None).await;
    let client = client_against(&server, store);

    assert!(client.fetch_profile().await.is_err());
}

#[tokio::test]
async fn refresh_response_without_access_token_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"detail": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("stale"), Some("ref-1")).await;
    let client = client_against(&server, store.clone());

    assert!(client.fetch_profile().await.is_err());
    assert_eq!(store.refresh_token().await, None);
}

#[tokio::test]
async fn session_restore_runs_silently_through_the_refresh() {
    let server = MockServer::start().await;
    mount_refresh_scenario(&server, Duration::from_millis(10)).await;

    let store = store_with(Some("stale"), Some("ref-1")).await;
    let client = client_against(&server, store.clone());
    let session = SessionService::new(client, store);

    let state = session.bootstrap().await.expect("bootstrap");
    match state {
        SessionState::Authenticated(profile) => assert_eq!(profile.display_name, "Jan Smith"),
        other => panic!("expected authenticated session, got {other:?}"),
    }
}

#[tokio::test]
async fn logout_then_bootstrap_makes_no_network_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/main/login/"))
        .and(body_json(json!({"username": "jsmith", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "acc-1", "refresh": "ref-1"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/main/profile/"))
        .and(header("Authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let vault = Arc::new(MemoryVault::default());
    let store =
        Arc::new(SessionTokenStore::initialize(vault.clone()).await.expect("token store"));
    let client = client_against(&server, store.clone());
    let session = SessionService::new(client, store.clone());

    session.login("jsmith", "hunter2").await.expect("login");
    assert_eq!(vault.load().await.unwrap().as_deref(), Some("ref-1"));

    session.logout().await.expect("logout");
    assert_eq!(vault.load().await.unwrap(), None);

    let before = server.received_requests().await.unwrap().len();
    let state = session.bootstrap().await.expect("bootstrap");
    let after = server.received_requests().await.unwrap().len();

    assert!(matches!(state, SessionState::Anonymous));
    assert_eq!(before, after);
}

#[tokio::test]
async fn employee_list_handles_both_envelope_shapes_and_filters() {
    let server = MockServer::start().await;

    let employee = json!({
        "id": 3, "form": 7, "form_name": "Staff",
        "data": {"Name": "Ada", "Department": "HR"},
        "is_active": true,
        "updated_at": "2026-05-01T10:00:00Z"
    });

    Mock::given(method("GET"))
        .and(path("/api/employees/"))
        .and(query_param("Department", "HR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [employee.clone()]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/employees/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([employee])))
        .mount(&server)
        .await;

    let store = store_with(Some("acc-1"), None).await;
    let client = client_against(&server, store);

    let bare = client.list_employees(&EmployeeFilter::default()).await.expect("bare list");
    let filtered = client
        .list_employees(&EmployeeFilter::default().field("Department", "HR"))
        .await
        .expect("filtered list");

    assert_eq!(bare.len(), 1);
    assert_eq!(filtered.len(), 1);
    assert_eq!(bare[0].id, filtered[0].id);
    assert_eq!(bare[0].form_name.as_deref(), Some("Staff"));
}

#[tokio::test]
async fn soft_delete_hits_the_dedicated_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/employees/3/soft-delete/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("acc-1"), None).await;
    let client = client_against(&server, store);

    client.soft_delete_employee(3).await.expect("soft delete");
}

#[tokio::test]
async fn form_builder_save_round_trips_through_the_backend() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/forms/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/forms/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 12,
            "name": "Onboarding",
            "schema": {"fields": [
                {"id": "7f8e1a9c-8f2d-4a31-9a57-0b1c2d3e4f50", "type": "text",
                 "label": "Name", "required": true}
            ]},
            "is_active": true,
            "updated_at": "2026-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/forms/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "name": "Onboarding v2",
            "schema": {"fields": []},
            "is_active": true,
            "updated_at": "2026-05-02T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_with(Some("acc-1"), None).await;
    let client = client_against(&server, store);
    let mut builder = FormBuilder::new(client);

    builder.load().await.expect("load forms");
    builder.create("Onboarding").expect("create");
    builder
        .add_field(staffdesk_core::FieldDraft {
            kind: staffdesk_domain::FieldKind::Text,
            label: "Name".to_string(),
            placeholder: None,
            required: true,
            options: None,
        })
        .expect("add field");

    // First save creates and adopts the backend id
    let id = builder.save().await.expect("create save");
    assert_eq!(id.remote(), Some(12));

    // Second save updates in place
    builder.rename("Onboarding v2").expect("rename");
    let id = builder.save().await.expect("update save");
    assert_eq!(id.remote(), Some(12));
}
