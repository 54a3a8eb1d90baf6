mod common;

use axum::http::StatusCode;
use common::{days_ahead, TestApp};
use serde_json::json;
use studio_booking::domain::models::member::Role;

#[tokio::test]
async fn test_tenants_cannot_see_each_other() {
    let app = TestApp::new().await;
    let (tid_a, admin_a) = app.create_tenant("studio-a", "UTC").await;
    let (tid_b, admin_b) = app.create_tenant("studio-b", "UTC").await;
    let member_b = app.create_member(&tid_b, &admin_b, "shared-user").await;
    let class_a = app.create_class(&tid_a, &admin_a, days_ahead(2), "10:00", "11:00", 5).await;

    // Token for tenant B on tenant A's path looks like a missing tenant
    let (status, body) = app.send("GET", &format!("/api/v1/{}/classes/{}", tid_a, class_a), Some(&admin_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // Tenant A's session id under tenant B's path does not exist
    let (status, _) = app.send("GET", &format!("/api/v1/{}/classes/{}", tid_b, class_a), Some(&admin_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("POST", &format!("/api/v1/{}/classes/{}/reservation", tid_b, class_a), Some(&member_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("PUT", &format!("/api/v1/{}/classes/{}/status", tid_b, class_a), Some(&admin_b), Some(json!({"status": "closed"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", &format!("/api/v1/{}/classes/{}?cascade=true", tid_b, class_a), Some(&admin_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The same subject in another tenant has no profile there
    let forged = app.token(&tid_a, "shared-user", Role::Member);
    let (status, _) = app.send("GET", &format!("/api/v1/{}/me", tid_a), Some(&forged), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list_b) = app.send("GET", &format!("/api/v1/{}/classes", tid_b), Some(&admin_b), None).await;
    assert!(list_b.as_array().unwrap().is_empty());

    let (_, month) = app.send("GET", &format!("/api/v1/{}/calendar/month?month={}", tid_b, days_ahead(2).format("%Y-%m")), Some(&member_b), None).await;
    assert!(month["days"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_authentication_and_roles() {
    let app = TestApp::new().await;
    let (tid, admin) = app.create_tenant("auth", "UTC").await;
    let member = app.create_member(&tid, &admin, "m1").await;

    let (status, body) = app.send("GET", &format!("/api/v1/{}/me", tid), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.send("GET", &format!("/api/v1/{}/me", tid), Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, me) = app.send("GET", &format!("/api/v1/{}/me", tid), Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "member");

    for uri in [
        format!("/api/v1/{}/members", tid),
        format!("/api/v1/{}/instructors", tid),
        format!("/api/v1/{}/classes", tid),
        format!("/api/v1/{}/overview", tid),
    ] {
        let (status, body) = app.send("GET", &uri, Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} allowed a member", uri);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    let (status, tenant) = app.send("GET", &format!("/api/v1/{}", tid), Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tenant["slug"], "auth");
}

#[tokio::test]
async fn test_tenant_provisioning_rules() {
    let app = TestApp::new().await;
    app.create_tenant("taken", "UTC").await;

    let (status, body) = app.send("POST", "/api/v1/tenants", None, Some(json!({"name": "Again", "slug": "taken"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app.send("POST", "/api/v1/tenants", None, Some(json!({"name": "Nowhere", "slug": "nowhere", "timezone": "Mars/Olympus"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send("POST", "/api/v1/tenants", None, Some(json!({"name": "Plain", "slug": "plain"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["timezone"], "UTC");
    assert!(body["admin"].is_null());
}

#[tokio::test]
async fn test_duplicate_member_profile_is_conflict() {
    let app = TestApp::new().await;
    let (tid, admin) = app.create_tenant("dupes", "UTC").await;
    app.create_member(&tid, &admin, "m1").await;

    let (status, body) = app.send("POST", &format!("/api/v1/{}/members", tid), Some(&admin), Some(json!({"id": "m1", "full_name": "Again"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, members) = app.send("GET", &format!("/api/v1/{}/members", tid), Some(&admin), None).await;
    assert_eq!(members.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_foreign_reservation_ids_are_not_found() {
    let app = TestApp::new().await;
    let (tid_a, admin_a) = app.create_tenant("owner-a", "UTC").await;
    let (tid_b, admin_b) = app.create_tenant("owner-b", "UTC").await;
    let member_a = app.create_member(&tid_a, &admin_a, "same-subject").await;
    let member_b = app.create_member(&tid_b, &admin_b, "same-subject").await;
    let class_a = app.create_class(&tid_a, &admin_a, days_ahead(3), "08:00", "09:00", 4).await;

    let (status, reservation) = app.send("POST", &format!("/api/v1/{}/classes/{}/reservation", tid_a, class_a), Some(&member_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let reservation_id = reservation["id"].as_str().unwrap().to_string();

    let (status, _) = app.send("DELETE", &format!("/api/v1/{}/reservations/{}", tid_b, reservation_id), Some(&admin_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", &format!("/api/v1/{}/classes/{}/reservations", tid_b, class_a), Some(&admin_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Same IdP subject, but the token belongs to tenant B
    let (status, _) = app.send("DELETE", &format!("/api/v1/{}/classes/{}/reservation", tid_b, class_a), Some(&member_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("DELETE", &format!("/api/v1/{}/classes/{}/reservation", tid_a, class_a), Some(&member_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, roster) = app.send("GET", &format!("/api/v1/{}/classes/{}/reservations", tid_a, class_a), Some(&admin_a), None).await;
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["id"], reservation_id.as_str());
    assert_eq!(roster[0]["status"], "active");

    let (_, session) = app.send("GET", &format!("/api/v1/{}/classes/{}", tid_a, class_a), Some(&admin_a), None).await;
    assert_eq!(session["occupancy"], 1);
}

#[tokio::test]
async fn test_deactivated_profiles_cannot_act() {
    let app = TestApp::new().await;
    let (tid, admin) = app.create_tenant("deactivated", "UTC").await;
    let class_id = app.create_class(&tid, &admin, days_ahead(4), "10:00", "11:00", 5).await;

    let (status, _) = app.send("POST", &format!("/api/v1/{}/members", tid), Some(&admin), Some(json!({"id": "admin-2", "full_name": "Second Admin", "role": "admin"}))).await;
    assert_eq!(status, StatusCode::OK);
    let second_admin = app.token(&tid, "admin-2", Role::Admin);
    let member = app.create_member(&tid, &admin, "m1").await;
    let reserve_uri = format!("/api/v1/{}/classes/{}/reservation", tid, class_id);
    let (status, _) = app.send("POST", &reserve_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);

    for id in ["admin-2", "m1"] {
        let (status, _) = app.send("PUT", &format!("/api/v1/{}/members/{}/active", tid, id), Some(&admin), Some(json!({"active": false}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let status_uri = format!("/api/v1/{}/classes/{}/status", tid, class_id);
    let (status, body) = app.send("PUT", &status_uri, Some(&second_admin), Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.send("GET", &format!("/api/v1/{}/members", tid), Some(&second_admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &reserve_uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, session) = app.send("GET", &format!("/api/v1/{}/classes/{}", tid, class_id), Some(&admin), None).await;
    assert_eq!(session["status"], "active");
    assert_eq!(session["occupancy"], 1);

    // An admin token without any profile in the tenant
    let ghost = app.token(&tid, "ghost-admin", Role::Admin);
    let (status, _) = app.send("PUT", &status_uri, Some(&ghost), Some(json!({"status": "closed"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Reactivation restores access
    let (status, _) = app.send("PUT", &format!("/api/v1/{}/members/admin-2/active", tid), Some(&admin), Some(json!({"active": true}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send("PUT", &status_uri, Some(&second_admin), Some(json!({"status": "closed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");
}
