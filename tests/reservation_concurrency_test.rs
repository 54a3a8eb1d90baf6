mod common;

use chrono::{NaiveTime, Utc};
use common::{days_ahead, TestApp};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use studio_booking::{
    domain::models::{
        class_session::{ClassSession, NewSessionParams},
        member::{MemberProfile, NewMemberParams, Role},
        tenant::Tenant,
    },
    domain::ports::{ClassRepository, MemberRepository, ReservationRepository, TenantRepository},
    error::AppError,
    infra::{
        factory::run_postgres_migrations,
        repositories::{
            postgres_class_repo::PostgresClassRepo, postgres_member_repo::PostgresMemberRepo,
            postgres_reservation_repo::PostgresReservationRepo, postgres_tenant_repo::PostgresTenantRepo,
        },
    },
};
use tokio::task::JoinSet;
use uuid::Uuid;

struct Repos {
    tenants: Arc<dyn TenantRepository>,
    members: Arc<dyn MemberRepository>,
    classes: Arc<dyn ClassRepository>,
    reservations: Arc<dyn ReservationRepository>,
}

/// Seeds a tenant, `members` member profiles and one session; returns `(tenant_id, class_id, member_ids)`.
async fn seed(repos: &Repos, members: usize, capacity: i32) -> (String, String, Vec<String>) {
    let tenant = repos.tenants.create(&Tenant::new("Race".into(), format!("race-{}", Uuid::new_v4()), None).unwrap()).await.unwrap();

    let mut ids = Vec::with_capacity(members);
    for i in 0..members {
        let profile = MemberProfile::new(NewMemberParams {
            id: format!("racer-{}", i),
            tenant_id: tenant.id.clone(),
            full_name: format!("Racer {}", i),
            email: None,
            role: Role::Member,
            start_date: Utc::now().date_naive(),
        });
        ids.push(repos.members.create(&profile).await.unwrap().id);
    }

    let session = ClassSession::new(NewSessionParams {
        tenant_id: tenant.id.clone(),
        title: "Contended".into(),
        description: None,
        class_date: days_ahead(7),
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        max_capacity: capacity,
        instructor_id: None,
    });
    let session = repos.classes.create(&session).await.unwrap();
    (tenant.id, session.id, ids)
}

async fn race_for_seats(repos: &Repos, members: usize, capacity: i32) {
    let (tenant_id, class_id, ids) = seed(repos, members, capacity).await;
    let now = Utc::now().naive_utc();
    let mut set = JoinSet::new();

    for user_id in ids {
        let repo = repos.reservations.clone();
        let (tenant_id, class_id) = (tenant_id.clone(), class_id.clone());
        set.spawn(async move { repo.reserve(&tenant_id, &class_id, &user_id, now).await });
    }

    let (mut reserved, mut full) = (0, 0);
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => reserved += 1,
            Err(AppError::SessionFull) => full += 1,
            Err(e) => panic!("unexpected reservation error: {:?}", e),
        }
    }

    println!("Reserved: {}, full: {}", reserved, full);
    assert_eq!(reserved, capacity as usize, "Overbooking or lost seats detected");
    assert_eq!(full, members - capacity as usize);
    assert_eq!(repos.reservations.count_active(&tenant_id, &class_id).await.unwrap(), i64::from(capacity));
}

async fn race_duplicate(repos: &Repos, attempts: usize) {
    let (tenant_id, class_id, ids) = seed(repos, 1, 10).await;
    let user_id = ids[0].clone();
    let now = Utc::now().naive_utc();
    let mut set = JoinSet::new();

    for _ in 0..attempts {
        let repo = repos.reservations.clone();
        let (tenant_id, class_id, user_id) = (tenant_id.clone(), class_id.clone(), user_id.clone());
        set.spawn(async move { repo.reserve(&tenant_id, &class_id, &user_id, now).await });
    }

    let (mut reserved, mut duplicates) = (0, 0);
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => reserved += 1,
            Err(AppError::AlreadyReserved) => duplicates += 1,
            Err(e) => panic!("unexpected reservation error: {:?}", e),
        }
    }

    assert_eq!(reserved, 1, "Double booking detected");
    assert_eq!(duplicates, attempts - 1);
}

fn sqlite_repos(app: &TestApp) -> Repos {
    Repos {
        tenants: app.state.tenant_repo.clone(),
        members: app.state.member_repo.clone(),
        classes: app.state.class_repo.clone(),
        reservations: app.state.reservation_repo.clone(),
    }
}

#[tokio::test]
async fn test_sqlite_capacity_holds_under_contention() {
    let app = TestApp::new().await;
    race_for_seats(&sqlite_repos(&app), 30, 7).await;
}

#[tokio::test]
async fn test_sqlite_no_double_booking_under_contention() {
    let app = TestApp::new().await;
    race_duplicate(&sqlite_repos(&app), 10).await;
}

#[tokio::test]
async fn test_sqlite_cancel_then_race_refills_once() {
    let app = TestApp::new().await;
    let repos = sqlite_repos(&app);
    let (tenant_id, class_id, ids) = seed(&repos, 6, 1).await;
    let now = Utc::now().naive_utc();

    repos.reservations.reserve(&tenant_id, &class_id, &ids[0], now).await.unwrap();
    repos.reservations.cancel_for_member(&tenant_id, &class_id, &ids[0], now).await.unwrap();

    let mut set = JoinSet::new();
    for user_id in ids.into_iter().skip(1) {
        let repo = repos.reservations.clone();
        let (tenant_id, class_id) = (tenant_id.clone(), class_id.clone());
        set.spawn(async move { repo.reserve(&tenant_id, &class_id, &user_id, now).await.is_ok() });
    }

    let mut winners = 0;
    while let Some(res) = set.join_next().await {
        if res.unwrap() { winners += 1; }
    }
    assert_eq!(winners, 1);
    assert_eq!(repos.reservations.count_active(&tenant_id, &class_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_postgres_capacity_holds_under_contention() {
    let db_url = std::env::var("DATABASE_URL").unwrap_or_default();
    if !db_url.starts_with("postgres") {
        println!("Skipping concurrency test (not targeting Postgres)");
        return;
    }

    let opts = PgConnectOptions::from_str(&db_url)
        .unwrap()
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .expect("Failed to connect to DB");
    run_postgres_migrations(&pool).await.expect("Failed to migrate");

    let repos = Repos {
        tenants: Arc::new(PostgresTenantRepo::new(pool.clone())),
        members: Arc::new(PostgresMemberRepo::new(pool.clone())),
        classes: Arc::new(PostgresClassRepo::new(pool.clone())),
        reservations: Arc::new(PostgresReservationRepo::new(pool.clone())),
    };

    race_for_seats(&repos, 50, 12).await;
    race_duplicate(&repos, 20).await;
}
