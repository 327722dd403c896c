//! Integration tests for the Issues API

use actix_web::{test, web, App};
use issuetrack::repository::IssueRepository;
use issuetrack::routes;
use serde_json::{json, Value};

use crate::common::{test_index, IssueBuilder, TestDb};

// =============================================================================
// Create
// =============================================================================

#[actix_web::test]
async fn test_create_issue() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(
            IssueBuilder::new("A", "A")
                .created("1970-01-01")
                .state("OPEN")
                .priority("MINOR")
                .build(),
        )
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let location = resp
        .headers()
        .get("location")
        .expect("Location header")
        .to_str()
        .unwrap()
        .to_string();
    let alert = resp
        .headers()
        .get("X-issuetrack-alert")
        .expect("alert header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(alert, "issuetrack.issue.created");

    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_i64().expect("assigned id");
    assert!(id > 0);
    assert_eq!(location, format!("/api/issues/{}", id));
    assert_eq!(body["name"], "A");
    assert_eq!(body["state"], "OPEN");
    assert_eq!(body["priority"], "MINOR");
}

#[actix_web::test]
async fn test_create_issue_with_id_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::default().id(99).build())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let error = resp
        .headers()
        .get("X-issuetrack-error")
        .expect("error header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(error, "error.idexists");
    let params = resp
        .headers()
        .get("X-issuetrack-params")
        .expect("params header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(params, "issue");

    assert_eq!(IssueRepository::count(&db.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_issue_missing_name_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(json!({
            "description": "no name supplied",
            "created": "2024-01-01",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "ValidationError");

    // Store record count is unchanged
    assert_eq!(IssueRepository::count(&db.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_issue_missing_created_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(json!({
            "name": "A",
            "description": "A",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(IssueRepository::count(&db.pool).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_create_issue_unknown_state_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::default().state("REOPENED").build())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_create_issue_with_attachment() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(
            IssueBuilder::default()
                .attachment("AAECAw==", "image/png")
                .build(),
        )
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["attachment"], "AAECAw==");
    assert_eq!(body["attachment_content_type"], "image/png");
}

// =============================================================================
// Update
// =============================================================================

#[actix_web::test]
async fn test_update_issue() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let create = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::new("Before", "Before").build())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_i64().unwrap();

    let update = test::TestRequest::put()
        .uri("/api/issues")
        .set_json(
            IssueBuilder::new("After", "After")
                .id(id)
                .state("RESOLVED")
                .priority("MAJOR")
                .build(),
        )
        .to_request();
    let resp = test::call_service(&app, update).await;
    assert_eq!(resp.status(), 200);

    let alert = resp
        .headers()
        .get("X-issuetrack-alert")
        .expect("alert header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(alert, "issuetrack.issue.updated");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "After");
    assert_eq!(body["state"], "RESOLVED");

    // Full-record replacement is visible on subsequent reads
    let get = test::TestRequest::get()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, get).await;
    assert_eq!(fetched["name"], "After");
    assert_eq!(fetched["priority"], "MAJOR");
}

#[actix_web::test]
async fn test_update_without_id_creates() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/issues")
        .set_json(IssueBuilder::new("Fresh", "Created through PUT").build())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn test_update_missing_description_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/issues")
        .set_json(json!({
            "id": 1,
            "name": "A",
            "created": "2024-01-01",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

// =============================================================================
// Get
// =============================================================================

#[actix_web::test]
async fn test_get_issue() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let create = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::default().comment("first comment").build())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, created);
}

#[actix_web::test]
async fn test_get_issue_not_found() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/issues/424242").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "NotFound");
}

// =============================================================================
// Delete
// =============================================================================

#[actix_web::test]
async fn test_delete_issue() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let create = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::default().build())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let alert = resp
        .headers()
        .get("X-issuetrack-alert")
        .expect("alert header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(alert, "issuetrack.issue.deleted");

    // Gone from the relational store and the index
    let get = test::TestRequest::get()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, get).await.status(), 404);
    assert!(!index.exists_by_id(id).unwrap());
}

#[actix_web::test]
async fn test_delete_is_idempotent() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let create = test::TestRequest::post()
        .uri("/api/issues")
        .set_json(IssueBuilder::default().build())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_i64().unwrap();

    let first = test::TestRequest::delete()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), 200);

    // Second delete and a delete of a never-existing id behave alike
    let second = test::TestRequest::delete()
        .uri(&format!("/api/issues/{}", id))
        .to_request();
    assert_eq!(test::call_service(&app, second).await.status(), 200);

    let never = test::TestRequest::delete()
        .uri("/api/issues/424242")
        .to_request();
    assert_eq!(test::call_service(&app, never).await.status(), 200);
}

// =============================================================================
// List
// =============================================================================

#[actix_web::test]
async fn test_list_issues_empty() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/issues").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let total = resp
        .headers()
        .get("X-Total-Count")
        .expect("X-Total-Count header")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(total, "0");

    let body: Value = test::read_body_json(resp).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_list_issues_pagination() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    for i in 0..25 {
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .set_json(IssueBuilder::new(&format!("Issue {}", i), "payload").build())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri("/api/issues?page=0&size=10")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let total = resp
        .headers()
        .get("X-Total-Count")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(total, "25");

    let link = resp
        .headers()
        .get("link")
        .expect("Link header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(link.contains("rel=\"next\""));
    assert!(link.contains("page=2&size=10>; rel=\"last\""));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 10);

    // Last page holds the remainder
    let req = test::TestRequest::get()
        .uri("/api/issues?page=2&size=10")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[actix_web::test]
async fn test_list_issues_sorted_by_name_desc() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    for name in ["alpha", "bravo", "charlie"] {
        let req = test::TestRequest::post()
            .uri("/api/issues")
            .set_json(IssueBuilder::new(name, "sorted").build())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri("/api/issues?sort=name,desc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["charlie", "bravo", "alpha"]);
}

#[actix_web::test]
async fn test_list_issues_invalid_sort_is_rejected() {
    let db = TestDb::new().await;
    let index = web::Data::new(test_index());

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(index.clone())
            .configure(routes::issues::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/issues?sort=attachment,desc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
