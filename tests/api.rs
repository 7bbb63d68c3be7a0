mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use qube_console::models::{
    qube::{Qube, QubeStatus},
    zone::{Zone, ZoneStatus},
};
use serde_json::{Value, json};

async fn server() -> TestServer {
    let app = qube_console::app_with_defaults(common::setup().await);
    TestServer::new(app).expect("test server should start")
}

async fn post_zone(server: &TestServer, name: &str) -> Zone {
    let response = server
        .post("/api/v1/zones")
        .json(&json!({ "name": name, "type": "proxmox", "config": { "endpoint": "https://pve:8006" } }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Zone>()
}

fn assert_error(body: &Value, kind: &str, status: u16) {
    assert_eq!(body["kind"], kind, "body: {body}");
    assert_eq!(body["status"], status, "body: {body}");
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn health_probes_respond() {
    let server = server().await;

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");

    let response = server.get("/readyz").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["sqlite"]["ok"], true);
    assert_eq!(body["checks"]["schema"]["ok"], true);
}

#[tokio::test]
async fn zone_crud_over_http() {
    let server = server().await;
    let zone = post_zone(&server, "Lab").await;
    assert_eq!(zone.status, ZoneStatus::Disconnected);

    let response = server.get(&format!("/api/v1/zones/{}", zone.id)).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["type"], "proxmox");
    assert_eq!(body["config"]["endpoint"], "https://pve:8006");
    assert!(body["config"].get("api_key").is_none());

    let response = server
        .put(&format!("/api/v1/zones/{}", zone.id))
        .json(&json!({ "name": "Lab 2" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Zone>().name, "Lab 2");

    let response = server.get("/api/v1/zones").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["zones"][0]["id"], zone.id.as_str());

    let response = server.delete(&format!("/api/v1/zones/{}", zone.id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "zone deleted");

    let response = server.get(&format!("/api/v1/zones/{}", zone.id)).await;
    response.assert_status_not_found();
    assert_error(&response.json::<Value>(), "zone_not_found", 404);
}

#[tokio::test]
async fn invalid_requests_are_rejected_with_400() {
    let server = server().await;

    let response = server
        .post("/api/v1/zones")
        .json(&json!({ "name": "Lab", "type": "openstack" }))
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json::<Value>(), "invalid_zone_type", 400);

    let response = server
        .post("/api/v1/zones")
        .json(&json!({ "name": "", "type": "aws" }))
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json::<Value>(), "invalid_input", 400);

    let response = server
        .post("/api/v1/qubes")
        .json(&json!({ "name": "box", "type": "vm" }))
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json::<Value>(), "invalid_qube_type", 400);

    let response = server
        .post("/api/v1/qubes")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json::<Value>(), "invalid_input", 400);

    let response = server
        .put("/api/v1/qubes/anything/ip")
        .json(&json!({ "ip_address": "nope" }))
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json::<Value>(), "invalid_input", 400);
}

#[tokio::test]
async fn qube_in_unknown_zone_is_not_found() {
    let server = server().await;
    let response = server
        .post("/api/v1/qubes")
        .json(&json!({ "name": "box", "type": "app", "zone_id": "nope" }))
        .await;
    response.assert_status_not_found();
    assert_error(&response.json::<Value>(), "zone_not_found", 404);
}

#[tokio::test]
async fn qube_lifecycle_over_http() {
    let server = server().await;
    let zone = post_zone(&server, "Lab").await;

    let response = server
        .post("/api/v1/qubes")
        .json(&json!({ "name": "Dev Box", "type": "dev", "zone_id": zone.id }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let qube = response.json::<Qube>();
    assert_eq!(qube.status, QubeStatus::Stopped);
    assert_eq!((qube.spec.vcpu, qube.spec.memory, qube.spec.disk), (2, 2048, 20));

    let start_path = format!("/api/v1/qubes/{}/start", qube.id);
    let response = server.post(&start_path).await;
    response.assert_status(StatusCode::PRECONDITION_FAILED);
    assert_error(&response.json::<Value>(), "zone_disconnected", 412);

    let response = server
        .post(&format!("/api/v1/zones/{}/connect", zone.id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Zone>().status, ZoneStatus::Connected);

    let response = server.post(&start_path).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Qube>().status, QubeStatus::Running);

    let response = server
        .put(&format!("/api/v1/qubes/{}/ip", qube.id))
        .json(&json!({ "ip_address": "10.1.2.3" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Qube>().ip_address.as_deref(), Some("10.1.2.3"));

    let response = server.delete(&format!("/api/v1/qubes/{}", qube.id)).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_error(&response.json::<Value>(), "qube_not_stopped", 409);

    let response = server.delete(&format!("/api/v1/zones/{}", zone.id)).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_error(&response.json::<Value>(), "zone_in_use", 409);

    let response = server
        .get("/api/v1/qubes")
        .add_query_param("zone_id", &zone.id)
        .add_query_param("status", "running")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["total"], 1);

    let response = server
        .post(&format!("/api/v1/qubes/{}/stop", qube.id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Qube>().status, QubeStatus::Stopped);

    server
        .delete(&format!("/api/v1/qubes/{}", qube.id))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/api/v1/zones/{}", zone.id))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/api/v1/qubes/{}", qube.id)).await;
    response.assert_status_not_found();
    assert_error(&response.json::<Value>(), "qube_not_found", 404);
}

#[tokio::test]
async fn list_honours_type_filter_and_limit() {
    let server = server().await;
    for (name, kind) in [("a", "app"), ("b", "gpu"), ("c", "app")] {
        server
            .post("/api/v1/qubes")
            .json(&json!({ "name": name, "type": kind }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get("/api/v1/qubes?type=app").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 2);
    assert_eq!(body["qubes"][0]["name"], "c");

    let response = server.get("/api/v1/qubes?limit=1&offset=1").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["qubes"][0]["name"], "b");

    server
        .get("/api/v1/qubes?status=exploded")
        .await
        .assert_status_bad_request();
}
