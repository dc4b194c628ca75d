use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::validators::{is_valid_email, is_valid_text};

const MAX_AUTHOR_NAME_LENGTH: usize = 80;

#[derive(Deserialize)]
pub struct NewAuthor {
    pub name: String,
    pub email: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<NaiveDate>,
    pub biography: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateAuthor {
    pub name: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub biography: Option<String>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct AuthorSummary {
    pub id: i32,
    pub name: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_author))
        .route("", web::get().to(list_authors))
        .route("/{id}", web::get().to(get_author))
        .route("/{id}", web::put().to(update_author))
        .route("/{id}", web::delete().to(delete_author));
}

/// POST /authors
pub async fn create_author(
    form: web::Json<NewAuthor>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_text("name", &form.name, MAX_AUTHOR_NAME_LENGTH)?;
    let email = form.email.as_deref().map(is_valid_email).transpose()?;

    let mut transaction = pool.begin().await?;
    let author = sqlx::query_as::<_, Author>(
        r#"
        INSERT INTO authors (name, email, birth_date, biography)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, birth_date, biography
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(form.birth_date)
    .bind(&form.biography)
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    tracing::info!(author_id = author.id, "Author created");
    Ok(HttpResponse::Created().json(author))
}

/// GET /authors
pub async fn list_authors(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let authors = sqlx::query_as::<_, AuthorSummary>("SELECT id, name FROM authors ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(authors))
}

/// GET /authors/{id}
pub async fn get_author(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let author = sqlx::query_as::<_, Author>(
        "SELECT id, name, email, birth_date, biography FROM authors WHERE id = $1",
    )
    .bind(path.into_inner())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(author))
}

/// PUT /authors/{id}
pub async fn update_author(
    path: web::Path<i32>,
    form: web::Json<UpdateAuthor>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_text("name", &form.name, MAX_AUTHOR_NAME_LENGTH)?;

    let mut transaction = pool.begin().await?;
    let author = sqlx::query_as::<_, AuthorSummary>(
        "UPDATE authors SET name = $1 WHERE id = $2 RETURNING id, name",
    )
    .bind(&name)
    .bind(path.into_inner())
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    Ok(HttpResponse::Ok().json(author))
}

/// DELETE /authors/{id}
///
/// Cascades to the author's books.
pub async fn delete_author(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let mut transaction = pool.begin().await?;
    let result = sqlx::query("DELETE FROM authors WHERE id = $1")
        .bind(id)
        .execute(&mut transaction)
        .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound.into());
    }
    transaction.commit().await?;

    tracing::info!(author_id = id, "Author deleted");
    Ok(HttpResponse::NoContent().finish())
}
