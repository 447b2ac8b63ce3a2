// GitHub client wire tests
// A fake GitHub REST server backed by MemoryStore runs on a random port and
// GitHubStore talks to it over real HTTP.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kronika_store::{
    BatchOptions, GitHubConfig, GitHubStore, MemoryStore, PendingCommit, RemoteObjectStore,
    StoreError, TreeEntry, TreeEntryTarget,
};

const TOKEN: &str = "test-token";
const INLINE_LIMIT: usize = 1024;

struct ApiError(StoreError, bool);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err, false)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(err, ref_update) = self;
        let status = match &err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) if ref_update => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Remote { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };
        (status, Json(json!({ "message": err.to_string() }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

async fn require_token(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {TOKEN}");
    let headers = request.headers();
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    let accepts = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        == Some("application/vnd.github+json");
    let has_agent = headers.contains_key(header::USER_AGENT);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Bad credentials" })))
            .into_response();
    }
    if !accepts || !has_agent {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "missing headers" })))
            .into_response();
    }
    next.run(request).await
}

async fn get_contents(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    if query.get("ref").map(String::as_str) != Some(store.branch()) {
        return Err(StoreError::not_found("ref").into());
    }
    let file = store.read_file(&path).await?;
    let size = file.content.len();
    let (content, encoding) = if size > INLINE_LIMIT {
        (String::new(), "none")
    } else {
        (STANDARD.encode(&file.content), "base64")
    };
    Ok(Json(json!({
        "type": "file",
        "path": path,
        "sha": file.revision,
        "size": size,
        "encoding": encoding,
        "content": content
    })))
}

async fn put_contents(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    assert_eq!(body["branch"], "main");
    let content = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
    let sha = store
        .write_file(
            &path,
            &content,
            body["sha"].as_str(),
            body["message"].as_str().unwrap(),
        )
        .await?;
    let commit = store.tip("main").await?;
    Ok(Json(json!({ "content": { "sha": sha, "path": path }, "commit": { "sha": commit } })))
}

async fn delete_contents(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    store
        .delete_file(
            &path,
            body["sha"].as_str().unwrap(),
            body["message"].as_str().unwrap(),
        )
        .await?;
    let commit = store.tip("main").await?;
    Ok(Json(json!({ "content": Value::Null, "commit": { "sha": commit } })))
}

async fn get_ref(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, branch)): Path<(String, String, String)>,
) -> ApiResult {
    let sha = store.branch_tip(&branch).await?;
    Ok(Json(json!({
        "ref": format!("refs/heads/{branch}"),
        "object": { "sha": sha, "type": "commit" }
    })))
}

async fn patch_ref(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, branch)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    let sha = body["sha"].as_str().unwrap();
    let force = body["force"].as_bool().unwrap_or(false);
    store
        .update_ref(&branch, sha, force)
        .await
        .map_err(|e| ApiError(e, true))?;
    Ok(Json(json!({ "object": { "sha": sha } })))
}

async fn get_commit(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, sha)): Path<(String, String, String)>,
) -> ApiResult {
    let tree = store.commit_tree(&sha).await?;
    Ok(Json(json!({ "sha": sha, "tree": { "sha": tree } })))
}

async fn post_commit(
    State(store): State<MemoryStore>,
    Path((_owner, _repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    let parents: Vec<String> = serde_json::from_value(body["parents"].clone()).unwrap();
    let sha = store
        .create_commit(
            body["message"].as_str().unwrap(),
            body["tree"].as_str().unwrap(),
            &parents,
        )
        .await?;
    Ok(Json(json!({ "sha": sha })))
}

async fn post_blob(
    State(store): State<MemoryStore>,
    Path((_owner, _repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    assert_eq!(body["encoding"], "base64");
    let bytes = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
    let sha = store.create_blob(&bytes).await?;
    Ok(Json(json!({ "sha": sha })))
}

async fn get_blob(
    State(store): State<MemoryStore>,
    Path((_owner, _repo, sha)): Path<(String, String, String)>,
) -> ApiResult {
    let bytes = store.blob(&sha).await?;
    Ok(Json(json!({
        "sha": sha,
        "encoding": "base64",
        "content": STANDARD.encode(bytes)
    })))
}

async fn post_tree(
    State(store): State<MemoryStore>,
    Path((_owner, _repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult {
    let entries: Vec<TreeEntry> = body["tree"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| {
            assert_eq!(item["mode"], "100644");
            let target = match (item.get("content"), item.get("sha")) {
                (Some(content), _) => TreeEntryTarget::Text(content.as_str().unwrap().into()),
                (None, Some(Value::Null)) => TreeEntryTarget::Delete,
                (None, Some(sha)) => TreeEntryTarget::Blob(sha.as_str().unwrap().into()),
                (None, None) => panic!("tree entry without sha or content"),
            };
            TreeEntry {
                path: item["path"].as_str().unwrap().into(),
                target,
            }
        })
        .collect();
    let sha = store
        .create_tree(body["base_tree"].as_str().unwrap(), &entries)
        .await?;
    Ok(Json(json!({ "sha": sha })))
}

// Helper to start a fake GitHub on a random port
async fn start_fake_github(store: MemoryStore) -> (String, tokio::task::JoinHandle<()>) {
    start_fake_github_with(store, true).await
}

async fn start_fake_github_with(
    store: MemoryStore,
    serve_blobs: bool,
) -> (String, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let mut app = Router::new()
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(get_contents).put(put_contents).delete(delete_contents),
        )
        .route("/repos/{owner}/{repo}/git/ref/heads/{*branch}", get(get_ref))
        .route("/repos/{owner}/{repo}/git/refs/heads/{*branch}", patch(patch_ref))
        .route("/repos/{owner}/{repo}/git/commits", post(post_commit))
        .route("/repos/{owner}/{repo}/git/commits/{sha}", get(get_commit))
        .route("/repos/{owner}/{repo}/git/blobs", post(post_blob))
        .route("/repos/{owner}/{repo}/git/trees", post(post_tree));
    if serve_blobs {
        app = app.route("/repos/{owner}/{repo}/git/blobs/{sha}", get(get_blob));
    }
    let app = app
        .layer(middleware::from_fn(require_token))
        .with_state(store);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, handle)
}

fn client(base_url: &str, token: &str) -> GitHubStore {
    GitHubStore::new(GitHubConfig::new("szkola", "strona", token).with_api_base_url(base_url))
        .unwrap()
}

#[tokio::test]
async fn test_single_file_round_trip() {
    let backing = MemoryStore::new();
    let (url, _server) = start_fake_github(backing.clone()).await;
    let github = client(&url, TOKEN);

    let tag = github
        .write_file("content/a.json", b"{\"v\":1}", None, "Create")
        .await
        .unwrap();
    let read = github.read_file("content/a.json").await.unwrap();
    assert_eq!(read.revision, tag);
    assert_eq!(read.content, b"{\"v\":1}");

    let stale = github
        .write_file("content/a.json", b"{\"v\":2}", Some("0000"), "Update")
        .await
        .unwrap_err();
    assert!(stale.is_conflict());

    github
        .delete_file("content/a.json", &tag, "Delete")
        .await
        .unwrap();
    assert!(github
        .read_file("content/a.json")
        .await
        .unwrap_err()
        .is_not_found());
    assert!(github
        .delete_file("content/a.json", &tag, "Delete")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_batch_commit_over_http() {
    let backing = MemoryStore::new();
    let (url, _server) = start_fake_github(backing.clone()).await;
    let github = client(&url, TOKEN);
    let before = backing.history_len("main").await.unwrap();

    let image = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff];
    let mut batch = PendingCommit::new("Add event");
    batch.upsert("content/aktualnosci/2024/marzec/a.json", b"{}".to_vec());
    batch.upsert("public/images/2024/marzec/a-1-0.png", image.clone());
    let commit = github
        .commit_batch("main", batch, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(backing.tip("main").await.unwrap(), commit);
    assert_eq!(backing.history_len("main").await.unwrap(), before + 1);
    assert_eq!(backing.tip_message("main").await.unwrap(), "Add event");
    assert_eq!(
        backing
            .read_file("public/images/2024/marzec/a-1-0.png")
            .await
            .unwrap()
            .content,
        image
    );
}

#[tokio::test]
async fn test_moved_branch_maps_to_conflict() {
    let backing = MemoryStore::new();
    let (url, _server) = start_fake_github(backing.clone()).await;
    let github = client(&url, TOKEN);
    backing.advance_branch_concurrently("main").await;

    let mut batch = PendingCommit::new("Add event");
    batch.upsert("content/a.json", b"{}".to_vec());
    let err = github
        .commit_batch("main", batch, BatchOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "got {err:?}");
    assert!(backing.read_file("content/a.json").await.is_err());
}

#[tokio::test]
async fn test_large_file_read_through_blob_api() {
    let backing = MemoryStore::new();
    let big: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    backing
        .write_file("public/images/big.jpg", &big, None, "Big")
        .await
        .unwrap();
    let (url, _server) = start_fake_github(backing).await;

    let read = client(&url, TOKEN)
        .read_file("public/images/big.jpg")
        .await
        .unwrap();
    assert_eq!(read.content, big);
}

#[tokio::test]
async fn test_large_file_revision_skips_blob_download() {
    let backing = MemoryStore::new();
    let big: Vec<u8> = (0..4096u32).map(|i| (i % 13) as u8).collect();
    let tag = backing
        .write_file("public/images/big.png", &big, None, "Big")
        .await
        .unwrap();
    let (url, _server) = start_fake_github_with(backing, false).await;
    let github = client(&url, TOKEN);

    assert_eq!(
        github.file_revision("public/images/big.png").await.unwrap(),
        tag
    );
    assert!(github
        .file_revision("public/images/missing.png")
        .await
        .unwrap_err()
        .is_not_found());
    github
        .delete_file("public/images/big.png", &tag, "Remove")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bad_token_is_permanent_remote_error() {
    let (url, _server) = start_fake_github(MemoryStore::new()).await;
    let err = client(&url, "wrong")
        .read_file("content/a.json")
        .await
        .unwrap_err();
    match &err {
        StoreError::Remote { status, message } => {
            assert_eq!(*status, Some(401));
            assert!(message.contains("Bad credentials"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_unreachable_server_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url, TOKEN).branch_tip("main").await.unwrap_err();
    assert!(err.is_transient(), "got {err:?}");
}
