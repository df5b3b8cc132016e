use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn owner_updates_upload_limit() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;

    let res = app
        .post_json(
            routes::SAVE_SETTINGS,
            &json!({"max_file_size": 2, "file_size_unit": "KB"}),
            Some(&owner),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    let dashboard = app.get(routes::DASHBOARD, Some(&owner)).await;
    assert_eq!(dashboard.body["settings"]["max_file_size"], 2);
    assert_eq!(dashboard.body["settings"]["file_size_unit"], "KB");
    assert_eq!(dashboard.body["settings"]["max_upload_bytes"], 2048);
}

#[tokio::test]
async fn non_owner_cannot_change_settings() {
    let app = TestApp::spawn().await;
    app.login_owner().await;
    let guest = app.login("Петров", "Пётр", "").await;

    let res = app
        .post_json(
            routes::SAVE_SETTINGS,
            &json!({"max_file_size": 1, "file_size_unit": "GB"}),
            Some(&guest),
        )
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
    assert_eq!(
        app.state.db.read(|d| d.settings.max_upload_bytes()).await,
        16 * 1024 * 1024
    );
}

#[tokio::test]
async fn invalid_limits_are_rejected() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;

    for body in [
        json!({"max_file_size": 0, "file_size_unit": "MB"}),
        json!({"max_file_size": 2, "file_size_unit": "GB"}),
        json!({"max_file_size": 1025, "file_size_unit": "MB"}),
        json!({"max_file_size": 10, "file_size_unit": "TB"}),
        json!({"max_file_size": "много"}),
    ] {
        let res = app.post_json(routes::SAVE_SETTINGS, &body, Some(&owner)).await;
        assert_eq!(res.status, 400, "{body}: {}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn numeric_string_size_is_accepted() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;

    let res = app
        .post_json(
            routes::SAVE_SETTINGS,
            &json!({"max_file_size": "64", "file_size_unit": "KB"}),
            Some(&owner),
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(
        app.state.db.read(|d| d.settings.max_upload_bytes()).await,
        64 * 1024
    );
}

#[tokio::test]
async fn defaults_apply_to_omitted_fields() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;
    app.post_json(
        routes::SAVE_SETTINGS,
        &json!({"max_file_size": 1, "file_size_unit": "GB"}),
        Some(&owner),
    )
    .await;

    let res = app.post_json(routes::SAVE_SETTINGS, &json!({}), Some(&owner)).await;

    assert_eq!(res.status, 200);
    assert_eq!(
        app.state.db.read(|d| d.settings.max_upload_bytes()).await,
        16 * 1024 * 1024
    );
}

#[tokio::test]
async fn new_secret_key_reissues_owner_session() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;
    let guest = app.login("Петров", "Пётр", "").await;

    let res = app
        .post_json(
            routes::SAVE_SETTINGS,
            &json!({"max_file_size": 16, "file_size_unit": "MB", "secret_key": "новый ключ"}),
            Some(&owner),
        )
        .await;
    assert_eq!(res.status, 200);
    let renewed = res.session.expect("Owner should receive a fresh session");

    assert_eq!(app.get(routes::DASHBOARD, Some(&owner)).await.status, 401);
    assert_eq!(app.get(routes::DASHBOARD, Some(&guest)).await.status, 401);
    assert_eq!(app.get(routes::DASHBOARD, Some(&renewed)).await.status, 200);
}

#[tokio::test]
async fn settings_survive_restart() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;
    app.post_json(
        routes::SAVE_SETTINGS,
        &json!({"max_file_size": 512, "file_size_unit": "KB"}),
        Some(&owner),
    )
    .await;

    let reopened = filechanger::db::Database::open(app.dir.path().join("Base/state.json"))
        .await
        .unwrap();
    assert_eq!(
        reopened.read(|d| d.settings.max_upload_bytes()).await,
        512 * 1024
    );
}
