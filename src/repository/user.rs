use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::User;

pub struct UserRepository;

impl UserRepository {
    /// Gets a user by ID
    pub async fn find_by_id(pool: &DbPool, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, first_name, last_name, email FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by login
    pub async fn find_by_login(pool: &DbPool, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, first_name, last_name, email FROM users WHERE login = ?1",
        )
        .bind(login)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
