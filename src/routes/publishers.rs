use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::validators::is_valid_text;

const MAX_PUBLISHER_NAME_LENGTH: usize = 100;
const MAX_LOCATION_LENGTH: usize = 200;

#[derive(Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub founded_year: Option<i32>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePublisher {
    pub name: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub founded_year: Option<i32>,
    pub location: Option<String>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct PublisherSummary {
    pub id: i32,
    pub name: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_publisher))
        .route("", web::get().to(list_publishers))
        .route("/{id}", web::get().to(get_publisher))
        .route("/{id}", web::put().to(update_publisher))
        .route("/{id}", web::delete().to(delete_publisher));
}

/// POST /publishers
pub async fn create_publisher(
    form: web::Json<NewPublisher>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_text("name", &form.name, MAX_PUBLISHER_NAME_LENGTH)?;
    let location = form
        .location
        .as_deref()
        .map(|l| is_valid_text("location", l, MAX_LOCATION_LENGTH))
        .transpose()?;

    let mut transaction = pool.begin().await?;
    let publisher = sqlx::query_as::<_, Publisher>(
        r#"
        INSERT INTO publishers (name, founded_year, location)
        VALUES ($1, $2, $3)
        RETURNING id, name, founded_year, location
        "#,
    )
    .bind(&name)
    .bind(form.founded_year)
    .bind(&location)
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    tracing::info!(publisher_id = publisher.id, "Publisher created");
    Ok(HttpResponse::Created().json(publisher))
}

/// GET /publishers
pub async fn list_publishers(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let publishers =
        sqlx::query_as::<_, PublisherSummary>("SELECT id, name FROM publishers ORDER BY id")
            .fetch_all(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(publishers))
}

/// GET /publishers/{id}
pub async fn get_publisher(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let publisher =
        sqlx::query_as::<_, PublisherSummary>("SELECT id, name FROM publishers WHERE id = $1")
            .bind(path.into_inner())
            .fetch_one(pool.get_ref())
            .await?;

    Ok(HttpResponse::Ok().json(publisher))
}

/// PUT /publishers/{id}
pub async fn update_publisher(
    path: web::Path<i32>,
    form: web::Json<UpdatePublisher>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_text("name", &form.name, MAX_PUBLISHER_NAME_LENGTH)?;

    let mut transaction = pool.begin().await?;
    let publisher = sqlx::query_as::<_, PublisherSummary>(
        "UPDATE publishers SET name = $1 WHERE id = $2 RETURNING id, name",
    )
    .bind(&name)
    .bind(path.into_inner())
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    Ok(HttpResponse::Ok().json(publisher))
}

/// DELETE /publishers/{id}
///
/// Cascades to the publisher's books.
pub async fn delete_publisher(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let mut transaction = pool.begin().await?;
    let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
        .bind(id)
        .execute(&mut transaction)
        .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound.into());
    }
    transaction.commit().await?;

    tracing::info!(publisher_id = id, "Publisher deleted");
    Ok(HttpResponse::NoContent().finish())
}
