use mock_database::MockDatabase;
use serde_json::json;
use std::{net::TcpListener, sync::Arc, time::Duration};
use uuid::Uuid;
use webdb_core::{
    client::{RemoteEndpoint, WebDatabase},
    error::DatabaseError,
    registry::{ObjectType, TypeRegistry},
    state::{Query, State},
    transport::{Credentials, HttpTransport, TransportError},
};

fn registry(article: Uuid) -> TypeRegistry {
    [ObjectType::new(article, "demo.Article")].into_iter().collect()
}

#[test]
fn test_round_trip_over_http_with_credentials() {
    let article = Uuid::new_v4();
    let mock = Arc::new(
        MockDatabase::new()
            .with_type(article, "demo.Article")
            .require_credentials("admin", "s3cret: with colon"),
    );
    let url = mock.serve();

    let endpoint = RemoteEndpoint::new(url)
        .with_database("main")
        .with_credentials(Credentials::new("admin", "s3cret: with colon"));
    let database = WebDatabase::new(endpoint, registry(article)).unwrap();

    let mut state = State::new(Some(article));
    state.put("title", "Über & more");
    database.save(&state).unwrap();

    let records = database.read_all(&Query::from_type(article)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id(), state.id());
    assert_eq!(records[0].get("title"), Some(&json!("Über & more")));

    let request = mock.last_request().unwrap();
    assert_eq!(request[1], ("database".to_string(), "main".to_string()));
}

#[test]
fn test_wrong_credentials_are_a_transport_error() {
    let mock = Arc::new(MockDatabase::new().require_credentials("admin", "secret"));
    let url = mock.serve();

    let endpoint = RemoteEndpoint::new(url).with_credentials(Credentials::new("admin", "guess"));
    let database = WebDatabase::new(endpoint, TypeRegistry::new()).unwrap();

    let err = database.read_count(&Query::from_all()).unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::Transport(TransportError::HttpStatus { status: 401, .. })
    ));
    assert!(mock.requests().is_empty());
}

#[test]
fn test_unreachable_server_is_a_transport_error() {
    // Bind and drop to find a port nothing is listening on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let transport = HttpTransport::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let database = WebDatabase::with_transport(
        RemoteEndpoint::new(format!("http://127.0.0.1:{port}/")),
        TypeRegistry::new(),
        transport,
    );

    let err = database.read_first(&Query::from_all()).unwrap_err();

    assert!(matches!(
        err,
        DatabaseError::Transport(TransportError::Request { .. })
    ));
}
