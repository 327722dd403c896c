use actix_web::{web, HttpResponse};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::repository::UserRepository;

/// GET /api/users/{login}
/// Looks up a user by login
pub async fn get_user(pool: web::Data<DbPool>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let login = path.into_inner();
    log::debug!("REST request to get User : {}", login);

    let user = UserRepository::find_by_login(pool.get_ref(), &login)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", login)))?;

    Ok(HttpResponse::Ok().json(user))
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/users").route("/{login}", web::get().to(get_user)));
}
