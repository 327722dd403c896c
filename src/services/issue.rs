use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{Issue, IssueDraft};
use crate::pagination::PageRequest;
use crate::repository::IssueRepository;
use crate::search::IssueSearchIndex;

/// Orchestrates writes across the relational store and the search index.
///
/// The store is the source of truth; the index is a derived projection kept
/// in step with best-effort dual writes. Index failures never fail the
/// enclosing operation, so the index can drift until the next write or an
/// explicit [`IssueService::reindex`].
pub struct IssueService;

impl IssueService {
    /// Saves an issue: relational store first, then the search index
    ///
    /// The index receives the *persisted* row so store-assigned fields (the
    /// id) propagate into the document. Returns the relational result
    /// regardless of the index outcome.
    pub async fn save(
        pool: &DbPool,
        index: &IssueSearchIndex,
        draft: IssueDraft,
    ) -> AppResult<Issue> {
        log::debug!("Request to save Issue : {:?}", draft);
        let issue = draft.validate()?;
        let saved = IssueRepository::save(pool, &issue).await?;

        if let Err(e) = index.index(&saved) {
            log::error!(
                "Failed to mirror issue {:?} into the search index: {}",
                saved.id,
                e
            );
        }

        Ok(saved)
    }

    /// Gets a page of issues from the relational store
    pub async fn find_all(pool: &DbPool, page: &PageRequest) -> AppResult<(Vec<Issue>, i64)> {
        log::debug!("Request to get all Issues");
        IssueRepository::find_all(pool, page).await
    }

    /// Gets one issue by id from the relational store
    pub async fn find_one(pool: &DbPool, id: i64) -> AppResult<Option<Issue>> {
        log::debug!("Request to get Issue : {}", id);
        IssueRepository::find_by_id(pool, id).await
    }

    /// Deletes an issue from both stores
    ///
    /// The index delete runs unconditionally, even when the relational
    /// delete found nothing to remove.
    pub async fn delete(pool: &DbPool, index: &IssueSearchIndex, id: i64) -> AppResult<()> {
        log::debug!("Request to delete Issue : {}", id);
        let removed = IssueRepository::delete_by_id(pool, id).await?;
        if !removed {
            log::debug!("Delete requested for unknown issue {}", id);
        }

        if let Err(e) = index.delete_by_id(id) {
            log::error!("Failed to remove issue {} from the search index: {}", id, e);
        }

        Ok(())
    }

    /// Runs a free-text query against the search index only
    pub fn search(
        index: &IssueSearchIndex,
        query: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Issue>, i64)> {
        log::debug!("Request to search for a page of Issues for query {}", query);
        index.search(query, page)
    }

    /// Rebuilds the search index from the relational store
    ///
    /// Replays every stored row into a cleared index. Errors here are
    /// surfaced: an explicit repair operation should not fail silently.
    pub async fn reindex(pool: &DbPool, index: &IssueSearchIndex) -> AppResult<usize> {
        log::info!("Rebuilding the issue search index");
        index.clear()?;

        let issues = IssueRepository::list_all(pool).await?;
        for issue in &issues {
            index.index(issue)?;
        }

        log::info!("Search index rebuilt with {} issues", issues.len());
        Ok(issues.len())
    }
}
