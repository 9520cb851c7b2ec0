//! # Mock Database
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide the server side of the web
//! database protocol for integration testing `webdb-core`.
//! It is not intended for production use.
//!
//! Objects are kept in memory in insertion order. Queries only understand the `_type` key,
//! which filters objects by type name; every other query field is ignored.
use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value, json};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::{SystemTime, UNIX_EPOCH},
};

type FieldMap = Map<String, Value>;

/// A raw HTTP-like response produced by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    fn ok(body: String) -> Self {
        Self { status: 200, body }
    }
}

#[derive(Default)]
struct Inner {
    records: Vec<FieldMap>,
    type_names: HashMap<String, String>,
    scripted: VecDeque<String>,
    requests: Vec<Vec<(String, String)>>,
    last_update: Option<i64>,
    credentials: Option<(String, String)>,
}

/// An in-memory database speaking the web database protocol.
#[derive(Default)]
pub struct MockDatabase {
    inner: Mutex<Inner>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the name of a type so that saved objects referring to it by id are stored
    /// under its name.
    pub fn with_type(self, id: impl ToString, name: impl Into<String>) -> Self {
        self.lock().type_names.insert(id.to_string(), name.into());
        self
    }

    /// Rejects every request not carrying these credentials with HTTP 401.
    pub fn require_credentials(self, username: &str, password: &str) -> Self {
        self.lock().credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Queues a raw body returned, unchecked, by the next request.
    pub fn respond_with(&self, body: impl Into<String>) {
        self.lock().scripted.push_back(body.into());
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<Vec<(String, String)>> {
        self.lock().requests.last().cloned()
    }

    /// The stored objects, with their `_type` as a type name.
    pub fn records(&self) -> Vec<Value> {
        self.lock()
            .records
            .iter()
            .cloned()
            .map(Value::Object)
            .collect()
    }

    /// Inserts an object directly, bypassing the protocol.
    pub fn insert(&self, record: Value) {
        if let Value::Object(record) = record {
            let mut inner = self.lock();
            let record = inner.normalize(record);
            inner.upsert(record);
        }
    }

    /// Handles one request.
    ///
    /// `credentials` are the username and password sent by the client, if any.
    pub fn handle(
        &self,
        params: &[(String, String)],
        credentials: Option<(&str, &str)>,
    ) -> MockResponse {
        let mut inner = self.lock();

        if let Some((username, password)) = &inner.credentials
            && credentials != Some((username.as_str(), password.as_str()))
        {
            return MockResponse {
                status: 401,
                body: "Unauthorized".to_string(),
            };
        }

        inner.requests.push(params.to_vec());

        if let Some(body) = inner.scripted.pop_front() {
            return MockResponse::ok(body);
        }

        let body = match inner.dispatch(params) {
            Ok(result) => json!({ "status": "ok", "result": result }),
            Err(message) => json!({ "status": "error", "result": message }),
        };
        MockResponse::ok(body.to_string())
    }

    /// Serves this database over HTTP on an ephemeral local port and returns its URL.
    ///
    /// The server runs on a background thread until the process exits.
    pub fn serve(self: &Arc<Self>) -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        let database = Arc::clone(self);

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build the mock server runtime");

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind the mock server");
                let addr = listener
                    .local_addr()
                    .expect("Failed to read the mock server address");
                tx.send(addr).expect("Failed to publish the mock server address");

                let app = Router::new()
                    .route("/", post(serve_form))
                    .with_state(database);
                axum::serve(listener, app)
                    .await
                    .expect("Mock server stopped unexpectedly");
            });
        });

        let addr = rx.recv().expect("Mock server failed to start");
        format!("http://{addr}/")
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn serve_form(
    State(database): State<Arc<MockDatabase>>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> (StatusCode, String) {
    let credentials = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok());

    let credentials = credentials
        .as_deref()
        .and_then(|pair| pair.split_once(':'));

    let response = database.handle(&params, credentials);
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, response.body)
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn param_values<'a>(
    params: &'a [(String, String)],
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    params
        .iter()
        .filter(move |(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_object(raw: &str) -> Result<FieldMap, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(format!("Not a JSON object: {raw}")),
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

impl Inner {
    fn dispatch(&mut self, params: &[(String, String)]) -> Result<Value, String> {
        let action = param(params, "action").unwrap_or_default();

        let type_filter = match param(params, "query") {
            Some(raw) => parse_object(raw)?
                .get("_type")
                .and_then(Value::as_str)
                .map(str::to_string),
            None => None,
        };

        match action {
            "readAll" => Ok(Value::Array(self.matching(&type_filter))),
            "readAllGrouped" => Ok(Value::Array(self.groups(&type_filter))),
            "readCount" => Ok(json!(self.matching(&type_filter).len())),
            "readFirst" => Ok(self
                .matching(&type_filter)
                .into_iter()
                .next()
                .unwrap_or(Value::Null)),
            "readLastUpdate" => Ok(self.last_update.map(Value::from).unwrap_or(Value::Null)),
            "readPartial" => {
                let items = self.matching(&type_filter);
                paginate(params, items)
            }
            "readPartialGrouped" => {
                let groups = self.groups(&type_filter);
                paginate(params, groups)
            }
            "write" => self.write(params),
            other => Err(format!("Unknown action [{other}]!")),
        }
    }

    fn matching(&self, type_filter: &Option<String>) -> Vec<Value> {
        self.records
            .iter()
            .filter(|record| match type_filter {
                Some(name) => record.get("_type").and_then(Value::as_str) == Some(name),
                None => true,
            })
            .cloned()
            .map(Value::Object)
            .collect()
    }

    fn groups(&self, type_filter: &Option<String>) -> Vec<Value> {
        let mut groups: Vec<(Value, usize)> = Vec::new();

        for record in self.matching(type_filter) {
            let key = record.get("_type").cloned().unwrap_or(Value::Null);
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, count)) => *count += 1,
                None => groups.push((key, 1)),
            }
        }

        groups
            .into_iter()
            .map(|(key, count)| json!({ "keys": [key], "count": count }))
            .collect()
    }

    fn write(&mut self, params: &[(String, String)]) -> Result<Value, String> {
        let saves = param_values(params, "saves")
            .map(parse_object)
            .collect::<Result<Vec<_>, _>>()?;
        // Indexing leaves the stored fields untouched, the payload is only validated.
        param_values(params, "indexes").try_for_each(|raw| parse_object(raw).map(drop))?;
        let deletes = param_values(params, "deletes")
            .map(parse_object)
            .collect::<Result<Vec<_>, _>>()?;

        for record in saves {
            let record = self.normalize(record);
            self.upsert(record);
        }

        for record in deletes {
            if let Some(id) = record.get("_id") {
                self.records.retain(|existing| existing.get("_id") != Some(id));
            }
        }

        self.last_update = Some(now_millis());

        Ok(Value::Null)
    }

    fn normalize(&self, mut record: FieldMap) -> FieldMap {
        if let Some(Value::String(type_id)) = record.get("_type")
            && let Some(name) = self.type_names.get(type_id)
        {
            record.insert("_type".to_string(), Value::String(name.clone()));
        }
        record
    }

    fn upsert(&mut self, record: FieldMap) {
        let existing = record.get("_id").and_then(|id| {
            self.records
                .iter()
                .position(|existing| existing.get("_id") == Some(id))
        });

        match existing {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }
}

fn paginate(params: &[(String, String)], items: Vec<Value>) -> Result<Value, String> {
    let offset = param(params, "offset")
        .and_then(|raw| raw.parse::<usize>().ok())
        .ok_or("Invalid offset!")?;
    let limit = param(params, "limit")
        .and_then(|raw| raw.parse::<usize>().ok())
        .ok_or("Invalid limit!")?;

    let count = items.len();
    let page: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();

    Ok(json!({ "items": page, "count": count }))
}
