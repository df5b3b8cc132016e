use serde_json::json;

use crate::common::{TestApp, routes};

mod login_page {
    use super::*;

    #[tokio::test]
    async fn fresh_server_has_no_owner_and_no_password() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::LOGIN, None).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["owner_exists"], false);
        assert_eq!(res.body["password_required"], false);
        assert!(res.body["logged_in_as"].is_null());
        assert_eq!(
            res.body["fields"],
            json!(["lastname", "firstname", "patronymic"])
        );
    }

    #[tokio::test]
    async fn reports_current_session_and_owner() {
        let app = TestApp::spawn().await;
        let token = app.login_owner().await;

        let res = app.get(routes::LOGIN, Some(&token)).await;

        assert_eq!(res.body["owner_exists"], true);
        assert_eq!(res.body["logged_in_as"], "Иванов Иван Иванович");
    }
}

mod set_username {
    use super::*;

    #[tokio::test]
    async fn first_user_becomes_owner() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::SET_USERNAME,
                &[
                    ("lastname", "Иванов"),
                    ("firstname", "Иван"),
                    ("patronymic", "Иванович"),
                ],
                None,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["username"], "Иванов Иван Иванович");
        assert_eq!(res.body["formatted_name"], "Иванов И.И.");
        assert_eq!(res.body["is_owner"], true);
        assert!(res.session.is_some());
    }

    #[tokio::test]
    async fn later_users_are_not_owner_and_owner_stays() {
        let app = TestApp::spawn().await;
        app.login_owner().await;

        let res = app
            .post_form(
                routes::SET_USERNAME,
                &[("lastname", "Петров"), ("firstname", "Пётр")],
                None,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["is_owner"], false);
        assert_eq!(res.body["username"], "Петров Пётр");

        let again = app
            .post_form(
                routes::SET_USERNAME,
                &[
                    ("lastname", "Иванов"),
                    ("firstname", "Иван"),
                    ("patronymic", "Иванович"),
                ],
                None,
            )
            .await;
        assert_eq!(again.body["is_owner"], true);
        assert_eq!(
            app.state.db.get_owner().await.as_deref(),
            Some("Иванов Иван Иванович")
        );
    }

    #[tokio::test]
    async fn names_are_trimmed() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(
                routes::SET_USERNAME,
                &[("lastname", "  Сидоров "), ("firstname", " Семён"), ("patronymic", "  ")],
                None,
            )
            .await;

        assert_eq!(res.body["username"], "Сидоров Семён");
        assert_eq!(res.body["formatted_name"], "Сидоров С.");
    }

    #[tokio::test]
    async fn missing_name_fields_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_form(routes::SET_USERNAME, &[("lastname", "Иванов")], None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.session.is_none());
        assert_eq!(app.state.db.get_owner().await, None);
    }

    #[tokio::test]
    async fn login_is_persisted_with_account_id() {
        let app = TestApp::spawn().await;
        app.login("Петров", "Пётр", "").await;

        let raw = std::fs::read_to_string(app.dir.path().join("Base/state.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let user = &doc["users"]["Петров Пётр"];
        assert_eq!(user["lastname"], "Петров");
        assert_eq!(user["ip"], "127.0.0.1");
        assert!(user["account_id"].is_string());
        assert_eq!(doc["owner"], "Петров Пётр");
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn protected_endpoints_require_login() {
        let app = TestApp::spawn().await;

        for path in [routes::DASHBOARD, routes::CONNECTED_DEVICES, "/download/a.txt"] {
            let res = app.get(path, None).await;
            assert_eq!(res.status, 401, "{path}");
            assert_eq!(res.body["code"], "LOGIN_REQUIRED");
            assert_eq!(res.body["success"], false);
        }
    }

    #[tokio::test]
    async fn forged_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::DASHBOARD, Some("not-a-jwt")).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "LOGIN_REQUIRED");
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_redirects() {
        let app = TestApp::spawn().await;
        let token = app.login_owner().await;

        let res = app.get(routes::LOGOUT, Some(&token)).await;

        assert_eq!(res.status, 303);
        assert_eq!(res.session.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn logout_without_session_still_redirects() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::LOGOUT, None).await;

        assert_eq!(res.status, 303);
    }

    #[tokio::test]
    async fn cookie_store_client_stays_logged_in() {
        let app = TestApp::spawn().await;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap();

        let login = client
            .post(app.url(routes::SET_USERNAME))
            .form(&[("lastname", "Иванов"), ("firstname", "Иван")])
            .send()
            .await
            .unwrap();
        assert_eq!(login.status(), 200);

        let dashboard = client.get(app.url(routes::DASHBOARD)).send().await.unwrap();
        assert_eq!(dashboard.status(), 200);
    }
}

mod access_password {
    use super::*;

    async fn protect_with_password(app: &TestApp, owner: &str) {
        let res = app
            .post_json(
                routes::SAVE_SETTINGS,
                &json!({"max_file_size": 16, "file_size_unit": "MB", "password": "секрет"}),
                Some(owner),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn login_requires_configured_password() {
        let app = TestApp::spawn().await;
        let owner = app.login_owner().await;
        protect_with_password(&app, &owner).await;

        let page = app.get(routes::LOGIN, None).await;
        assert_eq!(page.body["password_required"], true);

        let missing = app
            .post_form(
                routes::SET_USERNAME,
                &[("lastname", "Петров"), ("firstname", "Пётр")],
                None,
            )
            .await;
        assert_eq!(missing.status, 401);
        assert_eq!(missing.body["code"], "INVALID_PASSWORD");

        let wrong = app
            .post_form(
                routes::SET_USERNAME,
                &[("lastname", "Петров"), ("firstname", "Пётр"), ("password", "нет")],
                None,
            )
            .await;
        assert_eq!(wrong.status, 401);

        let right = app
            .post_form(
                routes::SET_USERNAME,
                &[("lastname", "Петров"), ("firstname", "Пётр"), ("password", "секрет")],
                None,
            )
            .await;
        assert_eq!(right.status, 200, "{}", right.text);
    }

    #[tokio::test]
    async fn empty_password_removes_protection() {
        let app = TestApp::spawn().await;
        let owner = app.login_owner().await;
        protect_with_password(&app, &owner).await;

        let res = app
            .post_json(
                routes::SAVE_SETTINGS,
                &json!({"max_file_size": 16, "file_size_unit": "MB", "password": ""}),
                Some(&owner),
            )
            .await;
        assert_eq!(res.status, 200);

        app.login("Петров", "Пётр", "").await;
    }
}
