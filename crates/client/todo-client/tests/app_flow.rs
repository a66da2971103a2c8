//! Screen and session flow of `TodoApp` against a mock todo service.

use serde_json::json;
use todo_client::{ApiClient, ClientConfig, ClientError, TodoApp};
use todo_core::{Credentials, Screen};
use todo_session::{MemorySessionStore, SessionStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(store: MemorySessionStore) -> (MockServer, TodoApp<MemorySessionStore>) {
    let server = MockServer::start().await;
    let config = ClientConfig::builder().base_url(server.uri()).build();
    let app = TodoApp::new(ApiClient::new(config).unwrap(), store);
    (server, app)
}

async fn mount_task_list(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "titulo": "Comprar pão", "status": "pendente"},
            {"id": 2, "titulo": "Relatório", "status": "concluida"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_saves_token_and_loads_board() {
    let (server, mut app) = setup(MemorySessionStore::new()).await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
        )
        .mount(&server)
        .await;
    mount_task_list(&server, "tok-1").await;

    app.login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(app.screen(), Screen::Tasks);
    assert_eq!(app.session().load().unwrap().as_deref(), Some("tok-1"));
    assert_eq!(app.api().bearer_token(), Some("tok-1"));

    let board = app.board().unwrap();
    assert_eq!(board.snapshot().await.tasks.len(), 2);
}

#[tokio::test]
async fn test_login_with_bad_credentials_stays_on_login() {
    let (server, mut app) = setup(MemorySessionStore::new()).await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = app
        .login(&Credentials::new("ana@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Authentication));
    assert_eq!(app.screen(), Screen::Login);
    assert_eq!(app.message(), Some("Invalid credentials"));
    assert!(app.board().is_none());
    assert_eq!(app.session().load().unwrap(), None);
}

#[tokio::test]
async fn test_empty_fields_never_reach_the_server() {
    let (server, mut app) = setup(MemorySessionStore::new()).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(app.login(&Credentials::new("", "secret")).await.is_err());
    assert_eq!(app.message(), Some("Fill in all fields"));

    app.switch_to_register().unwrap();
    assert_eq!(app.message(), None);
    assert!(app.register(&Credentials::new("a@b.c", "")).await.is_err());
    assert_eq!(app.screen(), Screen::Register);
}

#[tokio::test]
async fn test_register_returns_to_login() {
    let (server, mut app) = setup(MemorySessionStore::new()).await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    app.switch_to_register().unwrap();
    assert_eq!(app.screen(), Screen::Register);

    app.register(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(app.screen(), Screen::Login);
}

#[tokio::test]
async fn test_register_conflict_message() {
    let (server, mut app) = setup(MemorySessionStore::new()).await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Usuário já existe"))
        .mount(&server)
        .await;

    app.switch_to_register().unwrap();
    assert!(
        app.register(&Credentials::new("ana@example.com", "secret"))
            .await
            .is_err()
    );
    assert_eq!(app.screen(), Screen::Register);
    assert_eq!(
        app.message(),
        Some("User already exists or registration failed")
    );
}

#[tokio::test]
async fn test_restore_and_logout() {
    let (server, mut app) = setup(MemorySessionStore::with_token("saved")).await;
    mount_task_list(&server, "saved").await;

    assert!(app.restore().unwrap());
    assert_eq!(app.screen(), Screen::Tasks);

    let board = app.board().unwrap();
    board.refresh().await.unwrap();
    assert_eq!(board.snapshot().await.tasks.len(), 2);

    app.logout();
    assert_eq!(app.screen(), Screen::Login);
    assert!(app.board().is_none());
    assert_eq!(app.api().bearer_token(), None);
    assert_eq!(app.session().load().unwrap(), None);
}

#[tokio::test]
async fn test_restore_without_token_stays_on_login() {
    let (_server, mut app) = setup(MemorySessionStore::new()).await;

    assert!(!app.restore().unwrap());
    assert_eq!(app.screen(), Screen::Login);

    // logout is accepted from any screen
    app.logout();
    assert_eq!(app.screen(), Screen::Login);
}
