#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use catalog_service::{
    config::{CatalogConfig, JwtConfig, StorageConfig, DEFAULT_POINTER_KEY},
    services::{AuthError, CatalogService, Claims, JwtService, LocalStorage, Storage, TokenVerifier},
    startup::build_router,
    AppState,
};
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::{Config as CoreConfig, Environment};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "catalog-test-secret";
pub const TEST_MAX_UPLOAD_BYTES: usize = 64 * 1024;
const BOUNDARY: &str = "catalog-test-boundary";

/// Local storage that counts every call made through the trait.
pub struct CountingStorage {
    inner: LocalStorage,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &LocalStorage {
        &self.inner
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> io::Result<()> {
        self.hit();
        self.inner.upload(key, data).await
    }

    async fn download(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        self.hit();
        self.inner.download(key).await
    }

    async fn exists(&self, key: &str) -> io::Result<bool> {
        self.hit();
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &str) -> io::Result<bool> {
        self.hit();
        self.inner.delete(key).await
    }
}

/// Real JWT verifier that records how often it was consulted.
pub struct CountingVerifier {
    inner: JwtService,
    calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenVerifier for CountingVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token)
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

pub struct TestApp {
    pub router: Router,
    pub storage_dir: TempDir,
    pub storage: Arc<CountingStorage>,
    pub verifier: Arc<CountingVerifier>,
    pub jwt: JwtService,
    pub catalog: Arc<CatalogService>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let storage_dir = TempDir::new().expect("Failed to create storage dir");

        let config = CatalogConfig {
            common: CoreConfig { port: 0 },
            environment: Environment::Dev,
            service_name: "catalog-service-test".to_string(),
            log_level: "error".to_string(),
            otlp_endpoint: None,
            jwt: JwtConfig {
                secret: Secret::new(TEST_SECRET.to_string()),
            },
            storage: StorageConfig {
                root: storage_dir.path().to_path_buf(),
                pointer_key: DEFAULT_POINTER_KEY.to_string(),
                max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
            },
        };

        let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
        let verifier = Arc::new(CountingVerifier {
            inner: jwt.clone(),
            calls: AtomicUsize::new(0),
        });
        let storage = Arc::new(CountingStorage {
            inner: LocalStorage::new(storage_dir.path())
                .await
                .expect("Failed to create storage"),
            calls: AtomicUsize::new(0),
        });
        let catalog = Arc::new(CatalogService::new(
            storage.clone(),
            DEFAULT_POINTER_KEY,
        ));

        let state = AppState::new(config, verifier.clone(), catalog.clone());

        TestApp {
            router: build_router(state),
            storage_dir,
            storage,
            verifier,
            jwt,
            catalog,
        }
    }

    /// A valid admin token.
    pub fn token(&self) -> String {
        let claims = json!({
            "sub": "admin",
            "email": "admin@example.com",
            "exp": (chrono::Utc::now() + chrono::Duration::minutes(15)).timestamp(),
        });
        self.jwt
            .issue(claims.as_object().unwrap())
            .expect("Failed to issue token")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn publish(&self, upload: &Upload<'_>, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/catalog")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(upload.body())).unwrap())
            .await
    }

    pub async fn delete_catalog(&self) -> TestResponse {
        let token = self.token();
        self.request(Method::DELETE, "/catalog", Some(&token)).await
    }

    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.storage_dir.path().join(key)).ok()
    }
}

/// Multipart publish request body.
#[derive(Default)]
pub struct Upload<'a> {
    pub file: Option<(&'a str, &'a [u8])>,
    pub path: Option<&'a str>,
    pub title: Option<&'a str>,
}

impl<'a> Upload<'a> {
    pub fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            file: Some((name, data)),
            ..Default::default()
        }
    }

    pub fn at(mut self, path: &'a str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn titled(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    fn body(&self) -> Vec<u8> {
        let mut body = Vec::new();
        let mut text_field = |name: &str, value: &str| {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        };
        if let Some(path) = self.path {
            text_field("path", path);
        }
        if let Some(title) = self.title {
            text_field("title", title);
        }
        if let Some((name, data)) = self.file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
