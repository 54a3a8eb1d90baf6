use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use studio_booking::domain::models::{auth::Claims, member::Role};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;
const CONTENDERS: usize = 200;
const SEATS: i32 = 12;

struct Bench {
    client: Client,
    base_url: String,
    key: EncodingKey,
    issuer: String,
    audience: String,
}

impl Bench {
    fn token(&self, tenant_id: &str, user_id: &str, role: Role) -> String {
        let now = Utc::now();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            aud: self.audience.clone(),
            exp: (now + ChronoDuration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
            tenant_id: tenant_id.to_string(),
            role,
        };
        encode(&Header::new(Algorithm::EdDSA), &claims, &self.key).expect("Failed to sign benchmark token")
    }
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Reservation Benchmark".bold().green());

    let base_url = std::env::var("BENCH_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let key_path = std::env::var("BENCH_JWT_PRIVATE_KEY").unwrap_or_else(|_| "tests/keys/test_private.pem".to_string());
    let pem = std::fs::read(&key_path).expect("Cannot read BENCH_JWT_PRIVATE_KEY");

    let bench = Arc::new(Bench {
        client: Client::builder()
            .pool_max_idle_per_host(1000)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client"),
        base_url,
        key: EncodingKey::from_ed_pem(&pem).expect("Invalid Ed25519 private key"),
        issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.studio-booking.local".to_string()),
        audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "studio-booking".to_string()),
    });
    println!("Target URL: {}", bench.base_url);

    if bench.client.get(format!("{}/health", bench.base_url)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let tenant_id = setup_tenant(&bench).await;
    let admin = bench.token(&tenant_id, "bench-admin", Role::Admin);
    let members = setup_members(&bench, &tenant_id, &admin).await;
    let class_id = setup_session(&bench, &tenant_id, &admin, SEATS).await;
    println!("{}", "✅ Data created successfully.".green());
    println!("   Tenant ID: {}", tenant_id);
    println!("   Session:   {} ({} seats)", class_id, SEATS);

    println!("\n{}", "=".repeat(60));
    println!("Contention: {} members race for {} seats", CONTENDERS.to_string().cyan().bold(), SEATS);
    println!("{}", "=".repeat(60));
    run_contention(&bench, &tenant_id, &class_id, &members).await;

    let reader = bench.token(&tenant_id, &members[0], Role::Member);
    let day = (Utc::now() + ChronoDuration::days(30)).format("%Y-%m-%d").to_string();
    let targets = vec![
        ("Health Check (Public)", format!("{}/health", bench.base_url), None),
        ("Day View (Occupancy Read)", format!("{}/api/v1/{}/calendar/day?date={}", bench.base_url, tenant_id, day), Some(reader.clone())),
        ("Month Indicators", format!("{}/api/v1/{}/calendar/month?month={}", bench.base_url, tenant_id, &day[..7]), Some(reader)),
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for (name, url, token) in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", name.cyan().bold());
        println!("URL: {}", url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&bench.client, &url, token.as_deref(), rps).await;
        }
    }
}

async fn setup_tenant(bench: &Bench) -> String {
    let slug = format!("bench-{}", Uuid::new_v4());
    let res = bench.client.post(format!("{}/api/v1/tenants", bench.base_url))
        .json(&json!({
            "name": "Benchmark Studio",
            "slug": slug,
            "admin": { "id": "bench-admin", "full_name": "Bench Admin" }
        }))
        .send()
        .await
        .expect("Failed to send tenant create request");

    if !res.status().is_success() {
        panic!("Failed to create tenant: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse tenant response");
    body["tenant"]["id"].as_str().expect("No tenant id").to_string()
}

async fn setup_members(bench: &Bench, tenant_id: &str, admin: &str) -> Vec<String> {
    let mut ids = Vec::with_capacity(CONTENDERS);
    for i in 0..CONTENDERS {
        let id = format!("bench-member-{}", i);
        let res = bench.client.post(format!("{}/api/v1/{}/members", bench.base_url, tenant_id))
            .bearer_auth(admin)
            .json(&json!({ "id": id, "full_name": format!("Member {}", i) }))
            .send()
            .await
            .expect("Failed to create member");
        if !res.status().is_success() {
            panic!("Failed to create member {}: status {}", id, res.status());
        }
        ids.push(id);
    }
    ids
}

async fn setup_session(bench: &Bench, tenant_id: &str, admin: &str, seats: i32) -> String {
    let date = (Utc::now() + ChronoDuration::days(30)).format("%Y-%m-%d").to_string();
    let res = bench.client.post(format!("{}/api/v1/{}/classes", bench.base_url, tenant_id))
        .bearer_auth(admin)
        .json(&json!({
            "title": "Benchmark Flow",
            "class_date": date,
            "start_time": "18:00",
            "end_time": "19:00",
            "max_capacity": seats
        }))
        .send()
        .await
        .expect("Failed to create session");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create session. Status: {}. Body: {}", status, txt);
    }
    let body: Value = res.json().await.expect("Failed to parse session response");
    body["id"].as_str().expect("No session id").to_string()
}

/// Fires every reservation at once and checks that exactly `SEATS` succeed.
async fn run_contention(bench: &Arc<Bench>, tenant_id: &str, class_id: &str, members: &[String]) {
    let mut set = JoinSet::new();
    let started = Instant::now();

    for member in members {
        let bench = bench.clone();
        let token = bench.token(tenant_id, member, Role::Member);
        let url = format!("{}/api/v1/{}/classes/{}/reservation", bench.base_url, tenant_id, class_id);
        set.spawn(async move {
            let req_start = Instant::now();
            let status = bench.client.post(&url).bearer_auth(token).send().await.map(|r| r.status()).ok();
            (req_start.elapsed(), status)
        });
    }

    let mut histogram = Histogram::<u64>::new(3).expect("histogram");
    let (mut ok, mut full, mut other) = (0, 0, 0);
    while let Some(joined) = set.join_next().await {
        let Ok((latency, status)) = joined else { other += 1; continue };
        let _ = histogram.record(latency.as_micros() as u64);
        match status {
            Some(s) if s.is_success() => ok += 1,
            Some(StatusCode::CONFLICT) => full += 1,
            _ => other += 1,
        }
    }

    println!("Wall time:    {:.2} ms", started.elapsed().as_secs_f64() * 1000.0);
    println!("Mean latency: {:.2} ms, P99: {:.2} ms", histogram.mean() / 1000.0, histogram.value_at_quantile(0.99) as f64 / 1000.0);
    println!("Reserved: {}  Refused (409): {}  Errors: {}", ok, full, other);

    if ok == SEATS as usize {
        println!("{}", "✅ Capacity held under contention".green().bold());
    } else {
        println!("{}", format!("❌ Expected {} reservations, got {}", SEATS, ok).red().bold());
    }
}

async fn run_stage(client: &Client, url: &str, token: Option<&str>, rps: u32) {
    let Some(per_second) = NonZeroU32::new(rps) else { return };
    let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = url.to_string();
            let token = token.map(str::to_string);
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let mut req = client.get(&url);
                if let Some(t) = token {
                    req = req.bearer_auth(t);
                }
                let res = req.send().await;
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).expect("histogram");
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        let _ = histogram.record(latency.as_micros() as u64);
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
