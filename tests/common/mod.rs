#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use drinks_api::auth::{KeySource, TokenVerifier};
use drinks_api::config::AppConfig;
use drinks_api::database::{DrinkStore, MemoryDrinkStore};
use drinks_api::AppState;

pub const ISSUER: &str = "https://drinks-test.auth0.example/";
pub const AUDIENCE: &str = "drinks";
pub const KID: &str = "test-key-1";

const PRIVATE_KEY: &[u8] = include_bytes!("../fixtures/test_rsa_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

/// Every permission a barista manager holds
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// A barista may only read the detailed menu
pub const BARISTA: &[&str] = &["get:drinks-detail"];

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start the real router on an ephemeral port, backed by a freshly seeded
/// in-memory store and the fixture key set.
pub async fn spawn_server() -> Result<TestServer> {
    let store = Arc::new(MemoryDrinkStore::new());
    store.reset().await.context("failed to seed store")?;

    let keys = KeySource::from_json(JWKS).context("fixture key set is invalid")?;
    let verifier = TokenVerifier::new(keys, ISSUER, AUDIENCE, 0);
    let app = drinks_api::app(AppState::new(AppConfig::development(), store, verifier));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
    })
}

/// Claims for a valid, unexpired token holding `permissions`
pub fn claims(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "sub": "auth0|tester",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// Sign arbitrary claims with the fixture key under `kid`
pub fn sign(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY).expect("fixture private key");
    encode(&header, claims, &key).expect("sign test token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions), Some(KID))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn water_recipe() -> Value {
    json!([{"name": "water", "color": "blue", "parts": 1}])
}
