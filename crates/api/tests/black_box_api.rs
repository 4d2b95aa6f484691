//! Black-box HTTP tests: same router as production, ephemeral port, minted
//! HS256 tokens. Require a Postgres via `DATABASE_URL`, so `#[ignore]`d:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/oxbank_test cargo test -p oxbank-api -- --ignored
//! ```

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;

const JWT_SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    pool: PgPool,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("failed to connect");
        oxbank_store::run_migrations(&pool)
            .await
            .expect("migrations failed");

        let app = oxbank_api::app::build_app(pool.clone(), JWT_SECRET.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            pool,
            handle,
        }
    }

    async fn seed_role(&self, principal: &str, role: &str) {
        sqlx::query(
            "INSERT INTO role_grants (principal, role) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(principal)
        .bind(role)
        .execute(&self.pool)
        .await
        .expect("failed to seed role grant");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Serialize)]
struct WireClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

fn mint_jwt(sub: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = WireClaims {
        sub: sub.to_string(),
        iat: now - 60,
        exp: now + 600,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn health_needs_no_auth() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn protected_routes_reject_missing_tokens() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/customers", server.base_url))
        .json(&json!({ "name": "Nobody", "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn roleless_principals_are_forbidden() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt("bb_nobody");

    let resp = client
        .post(format!("{}/customers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Nobody", "email": "nobody@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
#[ignore]
async fn teller_creates_and_reads_a_customer() {
    let server = TestServer::spawn().await;
    server.seed_role("bb_teller", "TELLER").await;
    let client = reqwest::Client::new();
    let token = mint_jwt("bb_teller");

    let resp = client
        .post(format!("{}/customers", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Black Box",
            "address": "9 Harness Way",
            "phone": "555-0142",
            "email": "black.box@example.com",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: serde_json::Value = resp.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();

    let resp = client
        .get(format!("{}/customers/{}", server.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Black Box");
    assert_eq!(body["created_by"], "bb_teller");

    // Tellers cannot amend records.
    let resp = client
        .patch(format!("{}/customers/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "phone": "555-0000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
