//! The REST providers against a local stand-in for both remote services.
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::State as Extract,
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use firenotes::{
    AuthError, Identity, RecordStore, firebase_auth::FirebaseAuth, firestore::Firestore,
};
use parking_lot::Mutex;
use records::{Note, NoteDraft, Product, USERS};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const API_KEY: &str = "test-key";
const PAGE_SIZE: usize = 2;

#[derive(Default)]
struct Data {
    // email -> (uid, password)
    accounts: HashMap<String, (String, String)>,
    resets: Vec<String>,
    collections: BTreeMap<String, BTreeMap<String, Value>>,
    next_id: u64,
}

#[derive(Default)]
struct Mock {
    data: Mutex<Data>,
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"code": status.as_u16(), "message": message}})),
    )
        .into_response()
}

fn query(uri: &Uri) -> Vec<(String, String)> {
    uri.query()
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn handle(
    Extract(mock): Extract<Arc<Mock>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let params = query(&uri);

    if let Some(call) = path.strip_prefix("/v1/accounts:") {
        if !params.contains(&("key".to_string(), API_KEY.to_string())) {
            return error(StatusCode::BAD_REQUEST, "API_KEY_INVALID");
        }
        let body: Value = serde_json::from_str(&body).unwrap_or_default();
        return identity(&mock, call, &body);
    }

    if let Some((_, rest)) = path.split_once("/documents/") {
        let authorized = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("Bearer token-"));
        if !authorized {
            return error(StatusCode::UNAUTHORIZED, "unauthenticated");
        }

        let segments: Vec<&str> = rest.split('/').collect();
        let body: Value = serde_json::from_str(&body).unwrap_or_default();
        return documents(&mock, &method, &segments, &params, &body);
    }

    error(StatusCode::NOT_FOUND, "no such route")
}

fn identity(mock: &Mock, call: &str, body: &Value) -> Response {
    let mut data = mock.data.lock();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let account = |uid: &str, email: &str| {
        Json(json!({
            "localId": uid,
            "idToken": format!("token-{uid}"),
            "email": email,
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }))
        .into_response()
    };

    match call {
        "signUp" => {
            if data.accounts.contains_key(&email) {
                return error(StatusCode::BAD_REQUEST, "EMAIL_EXISTS");
            }
            if !email.contains('@') {
                return error(StatusCode::BAD_REQUEST, "INVALID_EMAIL");
            }

            data.next_id += 1;
            let uid = format!("uid{}", data.next_id);
            data.accounts.insert(email.clone(), (uid.clone(), password));
            account(&uid, &email)
        }
        "signInWithPassword" => match data.accounts.get(&email) {
            Some((uid, stored)) if *stored == password => account(uid, &email),
            _ => error(StatusCode::BAD_REQUEST, "INVALID_LOGIN_CREDENTIALS"),
        },
        "sendOobCode" => {
            if body["requestType"] != "PASSWORD_RESET" {
                return error(StatusCode::BAD_REQUEST, "INVALID_REQ_TYPE");
            }
            if !data.accounts.contains_key(&email) {
                return error(StatusCode::BAD_REQUEST, "EMAIL_NOT_FOUND");
            }

            data.resets.push(email.clone());
            Json(json!({"email": email})).into_response()
        }
        _ => error(StatusCode::NOT_FOUND, "no such call"),
    }
}

fn stored(collection: &str, id: &str, fields: &Value) -> Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/{collection}/{id}"),
        "fields": fields,
        "createTime": "2024-01-01T00:00:00Z"
    })
}

fn documents(
    mock: &Mock,
    method: &Method,
    segments: &[&str],
    params: &[(String, String)],
    body: &Value,
) -> Response {
    let mut data = mock.data.lock();
    let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));

    match (method.as_str(), segments) {
        ("GET", [collection]) => {
            let offset: usize = params
                .iter()
                .find(|(k, _)| k == "pageToken")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap_or(0);
            let all = data.collections.get(*collection).cloned().unwrap_or_default();

            let page: Vec<Value> = all
                .iter()
                .skip(offset)
                .take(PAGE_SIZE)
                .map(|(id, fields)| stored(collection, id, fields))
                .collect();

            if page.is_empty() {
                return Json(json!({})).into_response();
            }

            let mut response = json!({"documents": page});
            if offset + PAGE_SIZE < all.len() {
                response["nextPageToken"] = json!((offset + PAGE_SIZE).to_string());
            }
            Json(response).into_response()
        }
        ("POST", [collection]) => {
            data.next_id += 1;
            let id = format!("doc{:04}", data.next_id);
            data.collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields.clone());

            Json(stored(collection, &id, &fields)).into_response()
        }
        ("PATCH", [collection, id]) => {
            let mask: Vec<&str> = params
                .iter()
                .filter(|(k, _)| k == "updateMask.fieldPaths")
                .map(|(_, v)| v.as_str())
                .collect();

            let documents = data.collections.entry(collection.to_string()).or_default();
            let document = documents.entry(id.to_string()).or_insert_with(|| json!({}));

            if mask.is_empty() {
                *document = fields;
            } else {
                for key in mask {
                    document[key] = fields[key].clone();
                }
            }

            Json(stored(collection, id, document)).into_response()
        }
        ("DELETE", [collection, id]) => {
            if let Some(documents) = data.collections.get_mut(*collection) {
                documents.remove(*id);
            }

            Json(json!({})).into_response()
        }
        _ => error(StatusCode::BAD_REQUEST, "unsupported"),
    }
}

async fn serve(mock: Arc<Mock>) -> String {
    let app = Router::new().fallback(handle).with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{address}/v1")
}

struct Remote {
    mock: Arc<Mock>,
    identity: Identity,
    firestore: Arc<Firestore>,
}

async fn remote() -> Remote {
    let mock = Arc::new(Mock::default());
    let base = serve(mock.clone()).await;
    let client = reqwest::Client::new();

    let firestore = Arc::new(Firestore::new(client.clone(), &base, "demo"));
    let identity = Identity::new(Arc::new(FirebaseAuth::new(client, &base, API_KEY)))
        .with_profiles(firestore.clone());

    Remote {
        mock,
        identity,
        firestore,
    }
}

#[tokio::test]
async fn test_identity_over_rest() {
    let remote = remote().await;

    let session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();
    assert_eq!(session.uid, "uid1");
    assert_eq!(session.id_token, "token-uid1");
    assert_eq!(
        remote.identity.current_user().unwrap().email.as_deref(),
        Some("user@example.com")
    );

    assert_eq!(
        remote.identity.sign_up("user@example.com", "secret1").await,
        Err(AuthError::DuplicateAccount)
    );
    assert_eq!(
        remote.identity.sign_up("nope", "secret1").await,
        Err(AuthError::MalformedEmail)
    );

    remote.identity.sign_out();
    assert_eq!(
        remote.identity.sign_in("user@example.com", "bad-password").await,
        Err(AuthError::Provider("INVALID_LOGIN_CREDENTIALS".to_string()))
    );
    remote
        .identity
        .sign_in("user@example.com", "secret1")
        .await
        .unwrap();

    remote
        .identity
        .reset_password("user@example.com")
        .await
        .unwrap();
    assert_eq!(remote.mock.data.lock().resets, vec!["user@example.com"]);
}

#[tokio::test]
async fn test_profile_over_rest() {
    let remote = remote().await;

    let session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();

    let data = remote.mock.data.lock();
    let profile = &data.collections[USERS][&session.uid];
    assert_eq!(profile["email"], json!({"stringValue": "user@example.com"}));
    assert_eq!(profile["notes"], json!({"arrayValue": {}}));
}

#[tokio::test]
async fn test_records_over_rest() {
    let remote = remote().await;
    let session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();
    let store = RecordStore::new(remote.firestore.clone(), session);

    // more than one page
    let mut ids = Vec::new();
    for (title, content) in [("A", "B"), ("C", "D"), ("E", "F")] {
        ids.push(store.add::<Note>(&NoteDraft::new(title, content)).await.unwrap());
    }

    let notes = store.get_all::<Note>().await;
    assert_eq!(notes.len(), 3);
    assert_eq!(notes.iter().map(|n| n.id.clone()).collect::<Vec<_>>(), ids);

    store
        .update::<Note>(&ids[0], &NoteDraft::new("A", "changed"))
        .await
        .unwrap();
    store.delete::<Note>(&ids[1]).await.unwrap();

    let notes = store.get_all::<Note>().await;
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].content, "changed");
    assert!(notes.iter().all(|n| n.id != ids[1]));
}

#[tokio::test]
async fn test_integer_price_over_rest() {
    let remote = remote().await;
    let session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();
    let store = RecordStore::new(remote.firestore.clone(), session);

    remote
        .mock
        .data
        .lock()
        .collections
        .entry("products".to_string())
        .or_default()
        .insert(
            "p1".to_string(),
            json!({"name": {"stringValue": "Bolt"}, "price": {"integerValue": "12"}}),
        );

    let products = store.get_all::<Product>().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Bolt");
    assert_eq!(products[0].price, 12.0);
}

#[tokio::test]
async fn test_odd_documents_do_not_empty_the_list() {
    let remote = remote().await;
    let session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();
    let store = RecordStore::new(remote.firestore.clone(), session);

    {
        let mut data = remote.mock.data.lock();
        let products = data.collections.entry("products".to_string()).or_default();
        products.insert(
            "p1".to_string(),
            json!({"name": {"stringValue": "Widget"}, "price": {"doubleValue": 9.99}}),
        );
        products.insert(
            "p2".to_string(),
            json!({"name": {"stringValue": "Odd"}, "price": {"doubleValue": "NaN"}}),
        );
        products.insert(
            "p3".to_string(),
            json!({"tag": {"vectorValue": {"values": []}}}),
        );
    }

    let mut products = store.get_all::<Product>().await;
    products.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Widget");
    assert_eq!(products[0].price, 9.99);
    assert_eq!(products[1].name, "Odd");
    assert_eq!(products[1].price, 0.0);
}

#[tokio::test]
async fn test_rejected_token_reads_empty() {
    let remote = remote().await;
    let mut session = remote
        .identity
        .sign_up("user@example.com", "secret1")
        .await
        .unwrap();
    session.id_token = "forged".to_string();
    let store = RecordStore::new(remote.firestore.clone(), session);

    assert!(store.get_all::<Note>().await.is_empty());

    let e = store.try_get_all::<Note>().await.unwrap_err();
    assert!(e.message.contains("unauthenticated"));
    assert!(store.add::<Note>(&NoteDraft::new("A", "B")).await.is_err());
}
