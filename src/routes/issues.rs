use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::IssueDraft;
use crate::pagination::{self, ListIssuesQuery, SearchIssuesQuery};
use crate::routes::alert;
use crate::search::IssueSearchIndex;
use crate::services::IssueService;

#[derive(Serialize)]
struct ReindexResponse {
    indexed: usize,
}

/// POST /api/issues
/// Creates a new issue; rejects payloads that already carry an id
pub async fn create_issue(
    pool: web::Data<DbPool>,
    search: web::Data<IssueSearchIndex>,
    body: web::Json<IssueDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner();
    log::debug!("REST request to save Issue : {:?}", draft);

    if draft.id.is_some() {
        return Err(AppError::validation(
            "idexists",
            "A new issue cannot already have an ID",
        ));
    }

    created_response(pool.get_ref(), search.get_ref(), draft).await
}

/// PUT /api/issues
/// Full-record replacement; falls back to create semantics when no id is
/// present
pub async fn update_issue(
    pool: web::Data<DbPool>,
    search: web::Data<IssueSearchIndex>,
    body: web::Json<IssueDraft>,
) -> AppResult<HttpResponse> {
    let draft = body.into_inner();
    log::debug!("REST request to update Issue : {:?}", draft);

    if draft.id.is_none() {
        return created_response(pool.get_ref(), search.get_ref(), draft).await;
    }

    let result = IssueService::save(pool.get_ref(), search.get_ref(), draft).await?;
    let id = saved_id(&result)?;

    let mut resp = HttpResponse::Ok();
    alert::entity_updated(&mut resp, "issue", &id.to_string());
    Ok(resp.json(result))
}

/// GET /api/issues
/// Lists issues with offset-based pagination
pub async fn list_issues(
    pool: web::Data<DbPool>,
    query: web::Query<ListIssuesQuery>,
) -> AppResult<HttpResponse> {
    log::debug!("REST request to get a page of Issues");
    let page = query.page_request()?;
    let (issues, total_count) = IssueService::find_all(pool.get_ref(), &page).await?;

    let mut resp = HttpResponse::Ok();
    pagination::pagination_headers(&mut resp, "/api/issues", &page, total_count);
    Ok(resp.json(issues))
}

/// GET /api/issues/{id}
/// Gets a single issue by ID
pub async fn get_issue(pool: web::Data<DbPool>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    log::debug!("REST request to get Issue : {}", id);

    let issue = IssueService::find_one(pool.get_ref(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue {} not found", id)))?;

    Ok(HttpResponse::Ok().json(issue))
}

/// DELETE /api/issues/{id}
/// Removes the issue from the store and the search index; idempotent
pub async fn delete_issue(
    pool: web::Data<DbPool>,
    search: web::Data<IssueSearchIndex>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    log::debug!("REST request to delete Issue : {}", id);

    IssueService::delete(pool.get_ref(), search.get_ref(), id).await?;

    let mut resp = HttpResponse::Ok();
    alert::entity_deleted(&mut resp, "issue", &id.to_string());
    Ok(resp.finish())
}

/// GET /api/_search/issues?query=...
/// Searches the index for issues matching the query expression
pub async fn search_issues(
    search: web::Data<IssueSearchIndex>,
    query: web::Query<SearchIssuesQuery>,
) -> AppResult<HttpResponse> {
    log::debug!(
        "REST request to search for a page of Issues for query {}",
        query.query
    );
    let page = query.page_request()?;
    let (issues, total_count) = IssueService::search(search.get_ref(), &query.query, &page)?;

    let mut resp = HttpResponse::Ok();
    pagination::search_pagination_headers(
        &mut resp,
        "/api/_search/issues",
        &query.query,
        &page,
        total_count,
    );
    Ok(resp.json(issues))
}

/// POST /api/_search/issues/reindex
/// Rebuilds the search index from the relational store
pub async fn reindex_issues(
    pool: web::Data<DbPool>,
    search: web::Data<IssueSearchIndex>,
) -> AppResult<HttpResponse> {
    log::debug!("REST request to reindex Issues");
    let indexed = IssueService::reindex(pool.get_ref(), search.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ReindexResponse { indexed }))
}

async fn created_response(
    pool: &DbPool,
    search: &IssueSearchIndex,
    draft: IssueDraft,
) -> AppResult<HttpResponse> {
    let result = IssueService::save(pool, search, draft).await?;
    let id = saved_id(&result)?;

    let mut resp = HttpResponse::Created();
    resp.insert_header((header::LOCATION, format!("/api/issues/{}", id)));
    alert::entity_created(&mut resp, "issue", &id.to_string());
    Ok(resp.json(result))
}

fn saved_id(issue: &crate::models::Issue) -> AppResult<i64> {
    issue
        .id
        .ok_or_else(|| AppError::Internal("Persisted issue has no id".to_string()))
}

/// Configure issue routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/issues", web::post().to(create_issue))
            .route("/issues", web::put().to(update_issue))
            .route("/issues", web::get().to(list_issues))
            .route("/issues/{id}", web::get().to(get_issue))
            .route("/issues/{id}", web::delete().to(delete_issue))
            .route("/_search/issues", web::get().to(search_issues))
            .route("/_search/issues/reindex", web::post().to(reindex_issues)),
    );
}
