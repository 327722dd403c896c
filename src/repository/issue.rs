use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::Issue;
use crate::pagination::{IssueSortField, PageRequest};

pub struct IssueRepository;

impl IssueRepository {
    /// Persists an issue, assigning an identifier on first save
    ///
    /// With an identifier present the stored record is overwritten whole;
    /// there are no partial updates.
    pub async fn save(pool: &DbPool, issue: &Issue) -> AppResult<Issue> {
        let saved = match issue.id {
            None => {
                sqlx::query_as::<_, Issue>(
                    r#"
                    INSERT INTO issues (
                        name, description, created, state, priority,
                        attachment, attachment_content_type, comment,
                        originator_id, assignee_id
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    RETURNING *
                    "#,
                )
                .bind(&issue.name)
                .bind(&issue.description)
                .bind(issue.created)
                .bind(issue.state)
                .bind(issue.priority)
                .bind(&issue.attachment)
                .bind(&issue.attachment_content_type)
                .bind(&issue.comment)
                .bind(issue.originator_id)
                .bind(issue.assignee_id)
                .fetch_one(pool)
                .await?
            }
            Some(id) => {
                sqlx::query_as::<_, Issue>(
                    r#"
                    INSERT INTO issues (
                        id, name, description, created, state, priority,
                        attachment, attachment_content_type, comment,
                        originator_id, assignee_id
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        description = excluded.description,
                        created = excluded.created,
                        state = excluded.state,
                        priority = excluded.priority,
                        attachment = excluded.attachment,
                        attachment_content_type = excluded.attachment_content_type,
                        comment = excluded.comment,
                        originator_id = excluded.originator_id,
                        assignee_id = excluded.assignee_id
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(&issue.name)
                .bind(&issue.description)
                .bind(issue.created)
                .bind(issue.state)
                .bind(issue.priority)
                .bind(&issue.attachment)
                .bind(&issue.attachment_content_type)
                .bind(&issue.comment)
                .bind(issue.originator_id)
                .bind(issue.assignee_id)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(saved)
    }

    /// Gets an issue by ID
    pub async fn find_by_id(pool: &DbPool, id: i64) -> AppResult<Option<Issue>> {
        let issue = sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(issue)
    }

    /// Lists issues with offset-based pagination
    ///
    /// Returns (issues, total_count) where total_count is the total number of
    /// stored issues.
    pub async fn find_all(pool: &DbPool, page: &PageRequest) -> AppResult<(Vec<Issue>, i64)> {
        let total_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM issues")
            .fetch_one(pool)
            .await?;

        // Sort column comes from a closed enum, never from raw input
        let order_clause = if page.sort == IssueSortField::Id {
            format!("{} {}", page.sort.as_str(), page.order.as_sql())
        } else {
            format!("{} {}, id ASC", page.sort.as_str(), page.order.as_sql())
        };

        let query = format!(
            "SELECT * FROM issues ORDER BY {} LIMIT ?1 OFFSET ?2",
            order_clause
        );
        let issues = sqlx::query_as::<_, Issue>(&query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok((issues, total_count.0))
    }

    /// Lists every stored issue in id order, for index rebuilds
    pub async fn list_all(pool: &DbPool) -> AppResult<Vec<Issue>> {
        let issues = sqlx::query_as::<_, Issue>("SELECT * FROM issues ORDER BY id ASC")
            .fetch_all(pool)
            .await?;

        Ok(issues)
    }

    /// Deletes an issue by ID
    ///
    /// No-op safe: deleting an id with no matching row is not an error.
    /// Returns whether a row was actually removed.
    pub async fn delete_by_id(pool: &DbPool, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM issues WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts stored issues
    pub async fn count(pool: &DbPool) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM issues")
            .fetch_one(pool)
            .await?;

        Ok(count.0)
    }
}
