//! Tracker behaviour against a mock API server.

use std::time::Duration;

use serde_json::{Value, json};
use symtrack_core::{
  form::EditorMode,
  session::{SessionStorage, TOKEN_KEY, USER_KEY},
  storage::{KeyValueStore, MemoryStore},
  user::User,
};
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_json, header, method, path},
};

use crate::{
  ApiClient, ApiConfig, AuthMode, ClientError, Tracker, TrackerError, View,
  tracker::{
    DELETE_FAILED, FETCH_SYMPTOMS_FAILED, LOGIN_FAILED, LOGIN_RETRY, REGISTER_FAILED,
    SESSION_EXPIRED,
  },
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn client_for(base_url: String) -> ApiClient {
  ApiClient::new(ApiConfig {
    base_url,
    timeout: Some(Duration::from_secs(5)),
  })
  .expect("client")
}

fn tracker(server: &MockServer) -> Tracker<MemoryStore> {
  Tracker::new(client_for(server.uri()), MemoryStore::new())
}

fn user_json(id: i64) -> Value {
  json!({ "id": id, "username": "alice", "age": 30, "gender": "F", "location": "Oslo" })
}

fn symptom_json(id: i64, label: &str, description: &str) -> Value {
  json!({
    "id": id,
    "label": label,
    "description": description,
    "timestamp": "2024-05-01T10:00:00",
  })
}

async fn mount_patterns(server: &MockServer, patterns: Value) {
  Mock::given(method("GET"))
    .and(path("/symptoms/patterns"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "most_common_patterns": patterns })),
    )
    .mount(server)
    .await;
}

async fn mount_list_once(server: &MockServer, user_id: i64, list: Value) {
  Mock::given(method("GET"))
    .and(path(format!("/users/{user_id}/symptoms")))
    .respond_with(ResponseTemplate::new(200).set_body_json(list))
    .up_to_n_times(1)
    .mount(server)
    .await;
}

/// A tracker that resumes a stored session for `user_id` with `list` as its
/// first symptom fetch.
async fn logged_in(server: &MockServer, user_id: i64, list: Value) -> Tracker<MemoryStore> {
  let mut store = MemoryStore::new();
  store.set(TOKEN_KEY, "tok").unwrap();
  store
    .set(USER_KEY, &user_json(user_id).to_string())
    .unwrap();

  mount_list_once(server, user_id, list).await;
  let mut tracker = Tracker::new(client_for(server.uri()), store);
  assert!(tracker.restore().await);
  assert_eq!(tracker.view(), View::Authenticated);
  tracker
}

async fn pattern_fetches(server: &MockServer) -> usize {
  server
    .received_requests()
    .await
    .unwrap()
    .iter()
    .filter(|r| r.url.path() == "/symptoms/patterns")
    .count()
}

fn labels(tracker: &Tracker<MemoryStore>) -> Vec<(i64, &str)> {
  tracker
    .symptoms()
    .iter()
    .map(|s| (s.id, s.label.as_str()))
    .collect()
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_success_authenticates_and_persists() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/register"))
    .and(body_json(json!({
      "username": "alice",
      "password": "pw",
      "age": 30,
      "gender": "F",
      "location": "Oslo",
    })))
    .respond_with(
      ResponseTemplate::new(201).set_body_json(json!({ "token": "tok", "user": user_json(7) })),
    )
    .expect(1)
    .mount(&server)
    .await;
  mount_list_once(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;
  mount_patterns(&server, json!([{ "symptoms": ["Cough", "Fever"], "count": 3 }])).await;

  let mut t = tracker(&server);
  t.toggle_auth_mode();
  assert_eq!(t.auth_mode, AuthMode::Register);
  t.register_form.username = "alice".into();
  t.register_form.password = "pw".into();
  t.register_form.age = "30".into();
  t.register_form.gender = "F".into();
  t.register_form.location = "Oslo".into();

  t.register().await.unwrap();

  assert_eq!(t.view(), View::Authenticated);
  assert_eq!(t.error(), None);
  assert_eq!(t.session().unwrap().user.id, 7);
  assert_eq!(t.symptoms().len(), 1);
  assert_eq!(t.patterns()[0].count, 3);
  assert!(t.register_form.username.is_empty());

  let store = t.storage().store();
  assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
  let stored: User = serde_json::from_str(&store.get(USER_KEY).unwrap().unwrap()).unwrap();
  assert_eq!(stored.username, "alice");
}

#[tokio::test]
async fn login_invalid_credentials_shows_server_message() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/login"))
    .and(body_json(json!({ "username": "a", "password": "b" })))
    .respond_with(
      ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
    )
    .expect(1)
    .mount(&server)
    .await;

  let mut t = tracker(&server);
  t.login_form.username = "a".into();
  t.login_form.password = "b".into();

  let err = t.login().await.unwrap_err();
  assert!(matches!(err, TrackerError::Client(ClientError::Rejected { .. })));
  assert_eq!(t.error(), Some("Invalid credentials"));
  assert_eq!(t.view(), View::Unauthenticated);
  assert_eq!(t.auth_mode, AuthMode::Login);
  assert!(t.storage().store().is_empty());
}

#[tokio::test]
async fn login_accepts_unrecognised_profile_fields() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/login"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "token": "tok",
      "user": { "id": 7, "username": "a", "age": -1, "gender": "Nonbinary" },
    })))
    .expect(1)
    .mount(&server)
    .await;
  mount_list_once(&server, 7, json!([])).await;
  mount_patterns(&server, json!([])).await;

  let mut t = tracker(&server);
  t.login_form.username = "a".into();
  t.login_form.password = "b".into();

  t.login().await.unwrap();
  assert_eq!(t.view(), View::Authenticated);
  assert_eq!(t.error(), None);
  let user = &t.session().unwrap().user;
  assert_eq!(user.id, 7);
  assert_eq!(user.age, None);
  assert_eq!(user.gender, None);

  // The stored copy must survive a restart too.
  let mut reopened = SessionStorage::new(t.storage().store().clone());
  assert_eq!(reopened.load().unwrap().map(|s| s.user.id), Some(7));
}

#[tokio::test]
async fn login_rejection_without_message_uses_fallback() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/login"))
    .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
    .mount(&server)
    .await;

  let mut t = tracker(&server);
  t.login_form.username = "a".into();
  t.login_form.password = "b".into();

  assert!(t.login().await.is_err());
  assert_eq!(t.error(), Some(LOGIN_FAILED));
  assert_eq!(t.view(), View::Unauthenticated);
}

#[tokio::test]
async fn register_rejection_uses_message_or_fallback() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/register"))
    .respond_with(
      ResponseTemplate::new(409).set_body_json(json!({ "message": "Username already exists" })),
    )
    .up_to_n_times(1)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/auth/register"))
    .respond_with(ResponseTemplate::new(400).set_body_string("bad"))
    .mount(&server)
    .await;

  let mut t = tracker(&server);
  t.auth_mode = AuthMode::Register;
  t.register_form.username = "alice".into();
  t.register_form.password = "pw".into();

  assert!(t.submit_auth().await.is_err());
  assert_eq!(t.error(), Some("Username already exists"));

  assert!(t.submit_auth().await.is_err());
  assert_eq!(t.error(), Some(REGISTER_FAILED));
  assert_eq!(t.view(), View::Unauthenticated);
}

#[tokio::test]
async fn login_network_failure_asks_to_retry() {
  let mut t = Tracker::new(client_for("http://127.0.0.1:1".into()), MemoryStore::new());
  t.login_form.username = "a".into();
  t.login_form.password = "b".into();

  assert!(t.login().await.is_err());
  assert_eq!(t.error(), Some(LOGIN_RETRY));
  assert_eq!(t.view(), View::Unauthenticated);
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
  let server = MockServer::start().await;

  let mut t = tracker(&server);
  t.login_form.username = "a".into();
  let err = t.login().await.unwrap_err();
  assert!(matches!(err, TrackerError::Form(_)));
  assert_eq!(t.error(), Some("Password is required"));

  t.auth_mode = AuthMode::Register;
  t.register_form.username = "a".into();
  t.register_form.password = "b".into();
  t.register_form.age = "old".into();
  assert!(t.submit_auth().await.is_err());
  assert_eq!(t.error(), Some("Age must be a whole number"));

  let received = server.received_requests().await.unwrap();
  assert!(received.is_empty());
}

#[tokio::test]
async fn toggling_auth_mode_clears_banner() {
  let server = MockServer::start().await;
  let mut t = tracker(&server);
  assert!(t.login().await.is_err());
  assert!(t.error().is_some());
  t.toggle_auth_mode();
  assert_eq!(t.error(), None);
}

#[tokio::test]
async fn logout_clears_state_and_storage() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([{ "symptoms": ["Cough"], "count": 1 }])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;
  t.begin_edit(1).unwrap();
  assert!(!t.symptoms().is_empty());
  assert!(!t.patterns().is_empty());

  t.logout();

  assert_eq!(t.view(), View::Unauthenticated);
  assert!(t.session().is_none());
  assert!(t.symptoms().is_empty());
  assert!(t.patterns().is_empty());
  assert_eq!(t.symptom_form.mode, EditorMode::Creating);
  assert!(t.storage().store().is_empty());
}

#[tokio::test]
async fn restore_without_stored_session_stays_logged_out() {
  let server = MockServer::start().await;
  let mut t = tracker(&server);
  assert!(!t.restore().await);
  assert_eq!(t.view(), View::Unauthenticated);
  assert!(server.received_requests().await.unwrap().is_empty());
}

// ─── Symptoms ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_symptom_posts_and_refetches() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([])).await;
  assert!(t.symptoms().is_empty());

  Mock::given(method("POST"))
    .and(path("/users/7/symptoms"))
    .and(header("Authorization", "Bearer tok"))
    .and(body_json(json!({ "label": "Headache", "description": "dull ache" })))
    .respond_with(
      ResponseTemplate::new(201).set_body_json(symptom_json(11, "Headache", "dull ache")),
    )
    .expect(1)
    .mount(&server)
    .await;
  mount_list_once(&server, 7, json!([symptom_json(11, "Headache", "dull ache")])).await;

  t.symptom_form.label = "Headache".into();
  t.symptom_form.description = "dull ache".into();
  t.submit_symptom().await.unwrap();

  assert_eq!(labels(&t), vec![(11, "Headache")]);
  assert!(t.symptom_form.label.is_empty());
  assert!(t.symptom_form.description.is_empty());
  assert_eq!(t.error(), None);
}

#[tokio::test]
async fn add_failure_keeps_draft() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([])).await;

  Mock::given(method("POST"))
    .and(path("/users/7/symptoms"))
    .respond_with(
      ResponseTemplate::new(409).set_body_json(json!({ "message": "Duplicate symptom" })),
    )
    .mount(&server)
    .await;

  t.symptom_form.label = "Headache".into();
  t.symptom_form.description = "dull ache".into();
  assert!(t.submit_symptom().await.is_err());
  assert_eq!(t.error(), Some(crate::tracker::ADD_FAILED));
  assert_eq!(t.symptom_form.label, "Headache");
  assert_eq!(t.view(), View::Authenticated);
}

#[tokio::test]
async fn edit_preserves_id_and_position() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let initial = json!([
    symptom_json(1, "Cough", "dry"),
    symptom_json(2, "Headache", "dull ache"),
    symptom_json(3, "Fever", "38C"),
  ]);
  let mut t = logged_in(&server, 7, initial).await;

  Mock::given(method("PUT"))
    .and(path("/users/7/symptoms/2"))
    .and(header("Authorization", "Bearer tok"))
    .and(body_json(json!({ "label": "Migraine", "description": "throbbing" })))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(symptom_json(2, "Migraine", "throbbing")),
    )
    .expect(1)
    .mount(&server)
    .await;
  mount_list_once(
    &server,
    7,
    json!([
      symptom_json(1, "Cough", "dry"),
      symptom_json(2, "Migraine", "throbbing"),
      symptom_json(3, "Fever", "38C"),
    ]),
  )
  .await;

  t.begin_edit(2).unwrap();
  assert_eq!(t.symptom_form.label, "Headache");
  assert_eq!(t.symptom_form.editing_id(), Some(2));

  t.symptom_form.label = "Migraine".into();
  t.symptom_form.description = "throbbing".into();
  t.submit_symptom().await.unwrap();

  assert_eq!(labels(&t), vec![(1, "Cough"), (2, "Migraine"), (3, "Fever")]);
  assert_eq!(t.symptoms()[1].description, "throbbing");
  assert_eq!(t.symptom_form.mode, EditorMode::Creating);
}

#[tokio::test]
async fn edit_result_replaces_entry_when_refetch_fails() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let initial = json!([
    symptom_json(1, "Cough", "dry"),
    symptom_json(2, "Headache", "dull ache"),
    symptom_json(3, "Fever", "38C"),
  ]);
  let mut t = logged_in(&server, 7, initial).await;

  Mock::given(method("PUT"))
    .and(path("/users/7/symptoms/2"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(symptom_json(2, "Migraine", "throbbing")),
    )
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/users/7/symptoms"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  t.begin_edit(2).unwrap();
  t.symptom_form.label = "Migraine".into();
  t.symptom_form.description = "throbbing".into();
  t.submit_symptom().await.unwrap();

  assert_eq!(labels(&t), vec![(1, "Cough"), (2, "Migraine"), (3, "Fever")]);
  assert_eq!(t.symptoms()[1].description, "throbbing");
  assert_eq!(t.error(), Some(FETCH_SYMPTOMS_FAILED));
  assert_eq!(t.view(), View::Authenticated);
}

#[tokio::test]
async fn cancel_edit_returns_to_create() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;

  t.begin_edit(1).unwrap();
  t.cancel_edit();
  assert_eq!(t.symptom_form.mode, EditorMode::Creating);
  assert!(t.symptom_form.label.is_empty());

  assert!(matches!(t.begin_edit(99), Err(TrackerError::UnknownSymptom(99))));
}

#[tokio::test]
async fn delete_removes_exactly_that_symptom() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let initial = json!([
    symptom_json(1, "Cough", "dry"),
    symptom_json(2, "Headache", "dull ache"),
    symptom_json(3, "Fever", "38C"),
  ]);
  let mut t = logged_in(&server, 7, initial).await;
  t.begin_edit(2).unwrap();

  Mock::given(method("DELETE"))
    .and(path("/users/7/symptoms/2"))
    .and(header("Authorization", "Bearer tok"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
    .expect(1)
    .mount(&server)
    .await;

  t.delete_symptom(2).await.unwrap();

  assert_eq!(labels(&t), vec![(1, "Cough"), (3, "Fever")]);
  assert_eq!(t.symptom_form.mode, EditorMode::Creating);
}

#[tokio::test]
async fn failed_delete_keeps_list() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;

  Mock::given(method("DELETE"))
    .and(path("/users/7/symptoms/1"))
    .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
    .mount(&server)
    .await;

  assert!(t.delete_symptom(1).await.is_err());
  assert_eq!(t.error(), Some(DELETE_FAILED));
  assert_eq!(labels(&t), vec![(1, "Cough")]);
}

#[tokio::test]
async fn expired_token_forces_logout() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;

  Mock::given(method("GET"))
    .and(path("/users/7/symptoms"))
    .respond_with(
      ResponseTemplate::new(401).set_body_json(json!({ "msg": "Token has expired" })),
    )
    .mount(&server)
    .await;

  let err = t.refresh_symptoms().await.unwrap_err();
  assert!(matches!(err, TrackerError::Client(ClientError::SessionExpired { .. })));
  assert_eq!(t.view(), View::Unauthenticated);
  assert_eq!(t.error(), Some(SESSION_EXPIRED));
  assert!(t.symptoms().is_empty());
  assert!(t.storage().store().is_empty());
}

#[tokio::test]
async fn fetch_failure_keeps_session() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;

  Mock::given(method("GET"))
    .and(path("/users/7/symptoms"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  assert!(t.refresh_symptoms().await.is_err());
  assert_eq!(t.error(), Some(FETCH_SYMPTOMS_FAILED));
  assert_eq!(t.view(), View::Authenticated);
  assert_eq!(labels(&t), vec![(1, "Cough")]);
}

#[tokio::test]
async fn symptom_operations_need_a_session() {
  let server = MockServer::start().await;
  let mut t = tracker(&server);
  t.symptom_form.label = "Headache".into();
  t.symptom_form.description = "dull ache".into();

  assert!(matches!(
    t.submit_symptom().await,
    Err(TrackerError::NotAuthenticated)
  ));
  assert!(matches!(
    t.delete_symptom(1).await,
    Err(TrackerError::NotAuthenticated)
  ));
  assert!(server.received_requests().await.unwrap().is_empty());
}

// ─── Patterns ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patterns_refresh_after_mutation() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/symptoms/patterns"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "most_common_patterns": [] })))
    .up_to_n_times(1)
    .mount(&server)
    .await;
  mount_patterns(
    &server,
    json!([{ "symptoms": ["Cough", "Fever"], "count": 2 }]),
  )
  .await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;
  assert!(t.patterns().is_empty());

  Mock::given(method("DELETE"))
    .and(path("/users/7/symptoms/1"))
    .respond_with(ResponseTemplate::new(204))
    .mount(&server)
    .await;
  t.delete_symptom(1).await.unwrap();

  assert_eq!(t.patterns().len(), 1);
  assert_eq!(t.patterns()[0].joined(), "Cough + Fever");
}

#[tokio::test]
async fn patterns_refetched_after_create_and_update() {
  let server = MockServer::start().await;
  mount_patterns(&server, json!([])).await;
  let mut t = logged_in(&server, 7, json!([symptom_json(1, "Cough", "dry")])).await;

  Mock::given(method("POST"))
    .and(path("/users/7/symptoms"))
    .respond_with(ResponseTemplate::new(201).set_body_json(symptom_json(2, "Fever", "38C")))
    .mount(&server)
    .await;
  Mock::given(method("PUT"))
    .and(path("/users/7/symptoms/1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(symptom_json(1, "Cough", "wet")))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/users/7/symptoms"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      symptom_json(1, "Cough", "wet"),
      symptom_json(2, "Fever", "38C"),
    ])))
    .mount(&server)
    .await;

  assert_eq!(pattern_fetches(&server).await, 1);

  t.symptom_form.label = "Fever".into();
  t.symptom_form.description = "38C".into();
  t.submit_symptom().await.unwrap();
  assert_eq!(pattern_fetches(&server).await, 2);

  t.begin_edit(1).unwrap();
  t.symptom_form.description = "wet".into();
  t.submit_symptom().await.unwrap();
  assert_eq!(pattern_fetches(&server).await, 3);
}
