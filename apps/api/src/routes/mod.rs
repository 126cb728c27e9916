pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::{self, require_auth};
use crate::companies;
use crate::locale::resolve_locale;
use crate::resumes;
use crate::resumes::staging::{MAX_FILES, MAX_FILE_BYTES};
use crate::state::AppState;
use crate::storage;

/// Room for multipart boundaries and the contact fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/upload/resume",
            post(resumes::handlers::handle_upload_resume)
                .layer(DefaultBodyLimit::max(MAX_FILES * MAX_FILE_BYTES + MULTIPART_OVERHEAD)),
        )
        .route(
            "/file/signed-url",
            get(resumes::handlers::handle_signed_url),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let mut public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/signup", post(auth::handlers::handle_signup))
        .route("/login", post(auth::handlers::handle_login))
        .route("/companies", post(companies::handlers::handle_create_company));

    if state.local_files.is_some() {
        public = public.route("/files/:key", get(storage::handlers::handle_download));
    }

    public
        .merge(protected)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_locale))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryObjectStore, TestApp};
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
            Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-HIREBASE-BOUNDARY";

    struct Part<'a> {
        name: &'a str,
        file: Option<(&'a str, &'a str)>,
        data: &'a [u8],
    }

    fn file<'a>(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Part<'a> {
        Part {
            name: "files",
            file: Some((file_name, content_type)),
            data,
        }
    }

    fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part.file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                ),
            }
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(bearer: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/upload/resume")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(bearer) = bearer {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        builder.body(Body::from(multipart(parts))).unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response: Response = build_router(app.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new(MemoryObjectStore::default());
        let (status, body) = send(&app, get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_login_flow() {
        let app = TestApp::new(MemoryObjectStore::default());
        let creds = json!({"email": "ada@example.com", "password": "secret"});

        let (status, body) = send(&app, json_request("/signup", creds.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);

        let (status, body) = send(&app, json_request("/signup", creds.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(app.users.len(), 1);

        let (status, body) = send(&app, json_request("/login", creds)).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();
        assert!(app.state.tokens.verify_session(token).is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let app = TestApp::new(MemoryObjectStore::default());
        send(
            &app,
            json_request("/signup", json!({"email": "ada@example.com", "password": "secret"})),
        )
        .await;

        let wrong_password = send(
            &app,
            json_request("/login", json!({"email": "ada@example.com", "password": "nope!!"})),
        )
        .await;
        let unknown_email = send(
            &app,
            json_request("/login", json!({"email": "bob@example.com", "password": "secret"})),
        )
        .await;

        assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn test_signup_validation_and_missing_fields() {
        let app = TestApp::new(MemoryObjectStore::default());
        let (status, body) = send(
            &app,
            json_request("/signup", json!({"email": "ada@example.com", "password": "12345"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(&app, json_request("/signup", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.users.len(), 0);
    }

    #[tokio::test]
    async fn test_error_messages_follow_locale() {
        let app = TestApp::new(MemoryObjectStore::default());
        let (_, body) = send(
            &app,
            json_request("/signup?lang=fr", json!({"email": "nope", "password": "secret"})),
        )
        .await;
        assert_eq!(body["message"], "Format d'adresse e-mail invalide");

        let mut request = json_request("/signup", json!({"email": "nope", "password": "secret"}));
        request
            .headers_mut()
            .insert(ACCEPT_LANGUAGE, "es-MX,es;q=0.9".parse().unwrap());
        let (_, body) = send(&app, request).await;
        assert_eq!(body["message"], "Formato de correo electrónico no válido");

        let (_, body) = send(
            &app,
            json_request("/signup?lang=zz", json!({"email": "nope", "password": "secret"})),
        )
        .await;
        assert_eq!(body["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_company_creation_and_placeholder_conflict() {
        let app = TestApp::new(MemoryObjectStore::default());
        let company = json!({
            "name": "Acme",
            "address": "1 Road Runner Way",
            "logo": "acme.png",
            "placeholder": "acme"
        });

        let (status, body) = send(&app, json_request("/companies", company.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["placeholder"], "acme");

        let (status, body) = send(&app, json_request("/companies", company)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(app.companies.len(), 1);

        let (status, _) = send(
            &app,
            json_request("/companies", json!({"name": "NoAddress", "placeholder": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.companies.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let app = TestApp::new(MemoryObjectStore::default());
        let parts = [file("cv.txt", "text/plain", b"hello")];

        let (status, body) = send(&app, upload_request(None, &parts)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, upload_request(Some("Bearer forged"), &parts)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(app.storage.attempted().is_empty());
    }

    #[tokio::test]
    async fn test_upload_stores_every_file() {
        let app = TestApp::new(MemoryObjectStore::default());
        let bearer = app.bearer();
        let parts = [
            file("first.txt", "text/plain", b"the cat and the hat"),
            file("second.txt", "text/plain; charset=utf-8", b"Rust in production"),
            Part {
                name: "phone",
                file: None,
                data: b"+33 1 23 45 67 89",
            },
        ];

        let (status, body) = send(&app, upload_request(Some(&bearer), &parts)).await;
        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["originalName"], "first.txt");
        let stored = data[0]["storedFileName"].as_str().unwrap();
        assert!(app.storage.contains(stored));

        let rows = app.resumes.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content_sterilized, "cat hat");
        assert_eq!(rows[1].content_sterilized, "Rust production");
        assert_eq!(rows[1].phone, "+33 1 23 45 67 89");
        assert_eq!(rows[1].email, "");
        assert!(app.upload_dir_is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type_before_storing() {
        let app = TestApp::new(MemoryObjectStore::default());
        let bearer = app.bearer();
        let parts = [
            file("cv.txt", "text/plain", b"fine"),
            file("photo.png", "image/png", b"\x89PNG"),
        ];

        let (status, body) = send(&app, upload_request(Some(&bearer), &parts)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fileName"], "photo.png");
        assert!(app.storage.attempted().is_empty());
        assert!(app.resumes.rows().is_empty());
        assert!(app.upload_dir_is_empty());
    }

    #[tokio::test]
    async fn test_upload_limits() {
        let app = TestApp::new(MemoryObjectStore::default());
        let bearer = app.bearer();

        let contact_only = [Part {
            name: "email",
            file: None,
            data: b"ada@example.com",
        }];
        let (status, body) = send(&app, upload_request(Some(&bearer), &contact_only)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No files uploaded");

        let eleven: Vec<Part> = (0..11).map(|_| file("cv.txt", "text/plain", b"x")).collect();
        let (status, body) = send(&app, upload_request(Some(&bearer), &eleven)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Too many files: at most 10 files per upload");

        let big = vec![b'a'; MAX_FILE_BYTES + 1];
        let (status, body) = send(
            &app,
            upload_request(Some(&bearer), &[file("big.txt", "text/plain", &big)]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fileName"], "big.txt");

        assert!(app.storage.attempted().is_empty());
        assert!(app.upload_dir_is_empty());
    }

    #[tokio::test]
    async fn test_upload_partial_failure_reports_failed_file() {
        let app = TestApp::new(MemoryObjectStore::failing_on(2));
        let bearer = app.bearer();
        let parts = [
            file("one.txt", "text/plain", b"one"),
            file("two.txt", "text/plain", b"two"),
            file("three.txt", "text/plain", b"three"),
        ];

        let (status, body) = send(&app, upload_request(Some(&bearer), &parts)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["failedFile"], "two.txt");
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(app.resumes.rows().len(), 1);
        assert_eq!(app.storage.attempted(), vec!["one.txt", "two.txt"]);
        assert!(app.upload_dir_is_empty());
    }

    #[tokio::test]
    async fn test_signed_url() {
        let app = TestApp::new(MemoryObjectStore::default());
        let bearer = app.bearer();

        let (status, _) = send(&app, get_request("/file/signed-url?fileName=x.pdf", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, get_request("/file/signed-url", Some(&bearer))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "fileName query parameter is required");

        let (status, body) = send(
            &app,
            get_request("/file/signed-url?fileName=ghost-1.pdf", Some(&bearer)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (_, body) = send(
            &app,
            upload_request(Some(&bearer), &[file("cv.txt", "text/plain", b"hi")]),
        )
        .await;
        let key = body["data"][0]["storedFileName"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            get_request(&format!("/file/signed-url?fileName={key}"), Some(&bearer)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["signedUrl"],
            format!("https://storage.test/{key}?expires_in=3600")
        );
    }

    mod local_download {
        use super::*;
        use crate::storage::{LocalObjectStore, ObjectStore};
        use axum::http::header::CONTENT_ENCODING;
        use flate2::read::GzDecoder;
        use std::io::{Read, Write};
        use std::path::Path;
        use std::sync::Arc;
        use std::time::Duration;

        fn with_local_files(app: &mut TestApp, root: &Path) -> Arc<LocalObjectStore> {
            let store = Arc::new(
                LocalObjectStore::open(
                    root.to_path_buf(),
                    "http://localhost:8080",
                    app.state.tokens.clone(),
                )
                .unwrap(),
            );
            app.state.storage = store.clone();
            app.state.local_files = Some(store.clone());
            store
        }

        async fn put(store: &LocalObjectStore, name: &str, data: &[u8]) -> String {
            let mut source = tempfile::NamedTempFile::new().unwrap();
            source.write_all(data).unwrap();
            store
                .upload(source.path(), name, "application/pdf")
                .await
                .unwrap()
        }

        async fn signed_path(store: &LocalObjectStore, key: &str) -> String {
            let url = store
                .signed_url(key, Duration::from_secs(60))
                .await
                .unwrap();
            url.strip_prefix("http://localhost:8080").unwrap().to_string()
        }

        async fn fetch(app: &TestApp, uri: &str) -> Response {
            build_router(app.state.clone())
                .oneshot(get_request(uri, None))
                .await
                .unwrap()
        }

        #[tokio::test]
        async fn test_signed_download_serves_gzip_object() {
            let root = tempfile::tempdir().unwrap();
            let mut app = TestApp::new(MemoryObjectStore::default());
            let store = with_local_files(&mut app, root.path());
            let key = put(&store, "cv.pdf", b"%PDF-1.4 resume").await;

            let response = fetch(&app, &signed_path(&store, &key).await).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[CONTENT_ENCODING], "gzip");
            assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let mut body = Vec::new();
            GzDecoder::new(bytes.as_ref()).read_to_end(&mut body).unwrap();
            assert_eq!(body, b"%PDF-1.4 resume");
        }

        #[tokio::test]
        async fn test_download_needs_token_for_that_key() {
            let root = tempfile::tempdir().unwrap();
            let mut app = TestApp::new(MemoryObjectStore::default());
            let store = with_local_files(&mut app, root.path());
            let first = put(&store, "one.pdf", b"one").await;
            let second = put(&store, "two.pdf", b"two").await;

            let (status, body) = send(&app, get_request(&format!("/files/{first}"), None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["success"], false);

            let path = signed_path(&store, &first).await;
            let (_, query) = path.split_once('?').unwrap();
            let (status, _) = send(
                &app,
                get_request(&format!("/files/{second}?{query}"), None),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn test_download_of_deleted_object_is_not_found() {
            let root = tempfile::tempdir().unwrap();
            let mut app = TestApp::new(MemoryObjectStore::default());
            let store = with_local_files(&mut app, root.path());
            let key = put(&store, "cv.pdf", b"gone soon").await;
            let path = signed_path(&store, &key).await;
            std::fs::remove_file(root.path().join(&key)).unwrap();

            let (status, body) = send(&app, get_request(&path, None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["code"], "NOT_FOUND");
        }

        #[tokio::test]
        async fn test_download_route_absent_without_local_backend() {
            let app = TestApp::new(MemoryObjectStore::default());
            let response = fetch(&app, "/files/cv-1.pdf?token=abc").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty());
        }
    }
}
