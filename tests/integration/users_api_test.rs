//! Integration tests for the user lookup API

use actix_web::{test, web, App};
use issuetrack::repository::UserRepository;
use issuetrack::routes;
use serde_json::Value;

use crate::common::TestDb;

#[actix_web::test]
async fn test_get_seeded_user() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .configure(routes::users::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/users/system").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["login"], "system");
    assert_eq!(body["id"], 1);
}

#[actix_web::test]
async fn test_get_unknown_user_is_not_found() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .configure(routes::users::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/users/ghost").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_find_user_by_id() {
    let db = TestDb::new().await;

    let admin = UserRepository::find_by_id(&db.pool, 2)
        .await
        .unwrap()
        .expect("admin is seeded");
    assert_eq!(admin.login, "admin");

    assert!(UserRepository::find_by_id(&db.pool, 999)
        .await
        .unwrap()
        .is_none());
}
