mod common;

use axum::http::StatusCode;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};
use txirimiri::config::SessionBackend;

use common::{
    TEST_TOKEN, get, post_empty, post_json, post_raw_json, send, spawn_app, spawn_app_with,
};

const JPEG_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46, 0x00];

fn capture(record_name: &str, model_name: &str, skybox: Option<&str>) -> Value {
    json!({
        "model3d_record_name": record_name,
        "model3d_name": model_name,
        "skybox_record_name": skybox.unwrap_or(""),
        "skybox_name": skybox.map(|s| format!("{s} name")).unwrap_or_default(),
        "model_scale": 1.5,
        "yaw_angle": 0.25,
        "camera_position_x": 1.0,
        "camera_position_y": 2.0,
        "camera_position_z": 3.0,
        "camera_target_x": -1.0,
        "camera_target_y": 0.0,
        "camera_target_z": 0.5,
        "image_base64": STANDARD.encode(JPEG_BYTES),
    })
}

#[tokio::test]
async fn saving_with_new_record_name_creates_one_model_and_one_screenshot() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(
        &t.app,
        post_json("/api/screenshots/save/", &capture("REC-1", "Teapot", None)),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    let id = resp.json()["id"].as_i64().expect("id missing");

    let models = t.storage.list_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].record_name, "REC-1");
    assert_eq!(models[0].name, "Teapot");
    assert_eq!(models[0].screenshot_count, 1);

    let resp = send(&t.app, get("/api/screenshots/?model3d_record_name=REC-1")).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let shots = body["screenshots"].as_array().unwrap();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0]["id"], id);
    assert!(shots[0]["skybox_record_name"].is_null());
    assert_eq!(shots[0]["model_scale"], 1.5);
    assert_eq!(shots[0]["camera_position_z"], 3.0);
    assert_eq!(shots[0]["camera_target_x"], -1.0);

    let decoded = STANDARD
        .decode(shots[0]["image_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, JPEG_BYTES);
}

#[tokio::test]
async fn second_save_reuses_existing_model() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let first = send(
        &t.app,
        post_json("/api/screenshots/save/", &capture("REC-1", "Teapot", None)),
    )
    .await
    .json()["id"]
        .as_i64()
        .unwrap();
    let second = send(
        &t.app,
        post_json("/api/screenshots/save/", &capture("REC-1", "Renamed", None)),
    )
    .await
    .json()["id"]
        .as_i64()
        .unwrap();
    assert!(second > first);

    let models = t.storage.list_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "Teapot");
    assert_eq!(models[0].screenshot_count, 2);

    let body = send(&t.app, get("/api/screenshots/?model3d_record_name=REC-1"))
        .await
        .json();
    let ids: Vec<i64> = body["screenshots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);
}

#[tokio::test]
async fn listing_unknown_model_returns_empty_list() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(&t.app, get("/api/screenshots/?model3d_record_name=nope")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({ "screenshots": [] }));
    assert!(t.storage.list_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_without_record_name_is_bad_request() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(&t.app, get("/api/screenshots/")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn deleting_missing_screenshot_is_not_found_and_store_unchanged() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let id = send(
        &t.app,
        post_json("/api/screenshots/save/", &capture("REC-1", "Teapot", None)),
    )
    .await
    .json()["id"]
        .as_i64()
        .unwrap();

    let resp = send(
        &t.app,
        post_empty(&format!("/api/screenshots/{}/delete/", id + 1000)),
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["error"], "Not found");

    let shots = t.storage.list_screenshots("REC-1").await.unwrap();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].id, id);
}

#[tokio::test]
async fn deleting_screenshot_keeps_its_model() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let id = send(
        &t.app,
        post_json("/api/screenshots/save/", &capture("REC-1", "Teapot", None)),
    )
    .await
    .json()["id"]
        .as_i64()
        .unwrap();

    let resp = send(&t.app, post_empty(&format!("/api/screenshots/{id}/delete/"))).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({ "ok": true }));

    assert!(t.storage.list_screenshots("REC-1").await.unwrap().is_empty());
    let models = t.storage.list_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].screenshot_count, 0);
}

#[tokio::test]
async fn non_numeric_screenshot_id_is_bad_request() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(&t.app, post_empty("/api/screenshots/abc/delete/")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_save_bodies_are_rejected_without_writes() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(&t.app, post_raw_json("/api/screenshots/save/", "{not json")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["code"], "BAD_REQUEST");

    let missing_image = json!({ "model3d_record_name": "REC-1" });
    let resp = send(&t.app, post_json("/api/screenshots/save/", &missing_image)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let mut bad_image = capture("REC-1", "Teapot", None);
    bad_image["image_base64"] = json!("%%% not base64 %%%");
    let resp = send(&t.app, post_json("/api/screenshots/save/", &bad_image)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let mut blank_record = capture("  ", "Teapot", None);
    blank_record["model3d_record_name"] = json!("  ");
    let resp = send(&t.app, post_json("/api/screenshots/save/", &blank_record)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    assert!(t.storage.list_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn skybox_reference_is_created_and_listed() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(
        &t.app,
        post_json(
            "/api/screenshots/save/",
            &capture("REC-1", "Teapot", Some("SKY-1")),
        ),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);

    let skyboxes = t.storage.list_skyboxes().await.unwrap();
    assert_eq!(skyboxes.len(), 1);
    assert_eq!(skyboxes[0].record_name, "SKY-1");
    assert_eq!(skyboxes[0].name, "SKY-1 name");
    assert_eq!(skyboxes[0].screenshot_count, 1);

    let body = send(&t.app, get("/api/screenshots/?model3d_record_name=REC-1"))
        .await
        .json();
    assert_eq!(body["screenshots"][0]["skybox_record_name"], "SKY-1");
}

#[tokio::test]
async fn cloudkit_token_is_served_to_post_only() {
    let t = spawn_app(SessionBackend::Sqlite).await;

    let resp = send(&t.app, post_empty("/api/cloudkit-token/")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({ "api_token": TEST_TOKEN }));

    let resp = send(&t.app, get("/api/cloudkit-token/")).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn oversized_screenshot_body_is_payload_too_large() {
    let t = spawn_app_with(SessionBackend::Sqlite, |cfg| cfg.basic.body_limit_mb = 1).await;

    let mut body = capture("REC-1", "Teapot", None);
    body["image_base64"] = json!(STANDARD.encode(vec![0u8; 2 * 1024 * 1024]));
    let resp = send(&t.app, post_json("/api/screenshots/save/", &body)).await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.json()["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(resp.json()["error"], "request body too large");

    assert!(t.storage.list_models().await.unwrap().is_empty());
}
