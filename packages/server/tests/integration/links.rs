use crate::common::{TestApp, routes};

#[tokio::test]
async fn saved_link_appears_with_record() {
    let app = TestApp::spawn().await;
    let token = app.login_owner().await;

    let res = app
        .post_form(routes::SAVE_LINK, &[("link", "https://example.com/a")], Some(&token))
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["success"], true);
    let (links, has_record) = app
        .state
        .db
        .read(|d| (d.links.clone(), d.link_owners.contains_key("https://example.com/a")))
        .await;
    assert_eq!(links, vec!["https://example.com/a".to_string()]);
    assert!(has_record);
}

#[tokio::test]
async fn saving_same_link_twice_keeps_one() {
    let app = TestApp::spawn().await;
    let token = app.login_owner().await;
    let form = [("link", "https://example.com")];

    let first = app.post_form(routes::SAVE_LINK, &form, Some(&token)).await;
    let second = app.post_form(routes::SAVE_LINK, &form, Some(&token)).await;

    assert_eq!(first.status, 201);
    assert_eq!(second.status, 409);
    assert_eq!(second.body["code"], "CONFLICT");
    assert_eq!(second.body["success"], false);
    assert_eq!(app.state.db.read(|d| d.links.len()).await, 1);
}

#[tokio::test]
async fn links_keep_insertion_order() {
    let app = TestApp::spawn().await;
    let token = app.login_owner().await;
    for link in ["https://c.example", "https://a.example", "https://b.example"] {
        app.post_form(routes::SAVE_LINK, &[("link", link)], Some(&token)).await;
    }

    let res = app.get(routes::DASHBOARD, Some(&token)).await;

    let urls: Vec<_> = res.body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["url"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(urls, ["https://c.example", "https://a.example", "https://b.example"]);
}

#[tokio::test]
async fn empty_link_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login_owner().await;

    for form in [vec![("link", "")], vec![("link", "   ")], vec![]] {
        let res = app.post_form(routes::SAVE_LINK, &form, Some(&token)).await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
    assert!(app.state.db.read(|d| d.links.is_empty()).await);
}

#[tokio::test]
async fn only_saver_or_owner_may_delete_link() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;
    let saver = app.login("Петров", "Пётр", "").await;
    let stranger = app.login("Сидоров", "Семён", "").await;
    let form = [("link", "https://example.com")];
    app.post_form(routes::SAVE_LINK, &form, Some(&saver)).await;

    let denied = app.post_form(routes::DELETE_LINK, &form, Some(&stranger)).await;
    assert_eq!(denied.status, 403);
    assert_eq!(denied.body["code"], "PERMISSION_DENIED");
    assert_eq!(app.state.db.read(|d| d.links.len()).await, 1);

    let allowed = app.post_form(routes::DELETE_LINK, &form, Some(&saver)).await;
    assert_eq!(allowed.status, 200);
    let (links_empty, records_empty) = app
        .state
        .db
        .read(|d| (d.links.is_empty(), d.link_owners.is_empty()))
        .await;
    assert!(links_empty);
    assert!(records_empty);

    app.post_form(routes::SAVE_LINK, &form, Some(&saver)).await;
    let by_owner = app.post_form(routes::DELETE_LINK, &form, Some(&owner)).await;
    assert_eq!(by_owner.status, 200);
}

#[tokio::test]
async fn deleting_unknown_link_is_not_found() {
    let app = TestApp::spawn().await;
    let owner = app.login_owner().await;

    let res = app
        .post_form(routes::DELETE_LINK, &[("link", "https://nowhere.example")], Some(&owner))
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn link_routes_require_login() {
    let app = TestApp::spawn().await;
    let form = [("link", "https://example.com")];

    assert_eq!(app.post_form(routes::SAVE_LINK, &form, None).await.status, 401);
    assert_eq!(app.post_form(routes::DELETE_LINK, &form, None).await.status, 401);
}
