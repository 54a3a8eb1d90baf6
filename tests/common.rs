#![allow(dead_code)]

use studio_booking::{
    api::router::create_router,
    config::Config,
    domain::models::{auth::Claims, member::Role},
    infra::factory::sqlite_state,
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::str::FromStr;
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ISSUER: &str = "https://auth.test.local";
pub const AUDIENCE: &str = "studio-booking-test";

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_public_key: include_str!("../tests/keys/test_public.pem").to_string(),
            auth_issuer: ISSUER.to_string(),
            auth_audience: AUDIENCE.to_string(),
        };

        let state = Arc::new(sqlite_state(pool.clone(), &config).expect("Failed to build state"));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Signs a token the way the identity provider would.
    pub fn token(&self, tenant_id: &str, user_id: &str, role: Role) -> String {
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: (now + Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
            tenant_id: tenant_id.to_string(),
            role,
        };
        let key = EncodingKey::from_ed_pem(include_bytes!("../tests/keys/test_private.pem")).unwrap();
        encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap()
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    /// Creates a tenant with an admin profile and returns `(tenant_id, admin_token)`.
    pub async fn create_tenant(&self, slug: &str, timezone: &str) -> (String, String) {
        let (status, body) = self.send("POST", "/api/v1/tenants", None, Some(json!({
            "name": format!("Studio {}", slug),
            "slug": slug,
            "timezone": timezone,
            "admin": { "id": format!("admin-{}", slug), "full_name": "Studio Admin" }
        }))).await;
        assert_eq!(status, StatusCode::OK, "tenant create failed: {}", body);

        let tenant_id = body["tenant"]["id"].as_str().unwrap().to_string();
        let token = self.token(&tenant_id, &format!("admin-{}", slug), Role::Admin);
        (tenant_id, token)
    }

    /// Registers a member profile and returns a member token for it.
    pub async fn create_member(&self, tenant_id: &str, admin: &str, member_id: &str) -> String {
        let (status, body) = self.send("POST", &format!("/api/v1/{}/members", tenant_id), Some(admin), Some(json!({
            "id": member_id,
            "full_name": format!("Member {}", member_id),
            "email": format!("{}@example.com", member_id)
        }))).await;
        assert_eq!(status, StatusCode::OK, "member create failed: {}", body);
        self.token(tenant_id, member_id, Role::Member)
    }

    pub async fn create_class(&self, tenant_id: &str, admin: &str, date: NaiveDate, start: &str, end: &str, capacity: i32) -> String {
        let (status, body) = self.send("POST", &format!("/api/v1/{}/classes", tenant_id), Some(admin), Some(json!({
            "title": "Vinyasa Flow",
            "class_date": date.format("%Y-%m-%d").to_string(),
            "start_time": start,
            "end_time": end,
            "max_capacity": capacity
        }))).await;
        assert_eq!(status, StatusCode::OK, "class create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

/// A date comfortably in the future for every timezone.
pub fn days_ahead(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
