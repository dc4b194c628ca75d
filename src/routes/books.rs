use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, ValidationError};
use crate::validators::{is_valid_isbn, is_valid_text};

const MAX_TITLE_LENGTH: usize = 120;
const MAX_LANGUAGE_LENGTH: usize = 20;
// NUMERIC(10, 2)
const MAX_PRICE: f64 = 99_999_999.99;

#[derive(Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author_id: i32,
    pub publisher_id: i32,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    pub price: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateBook {
    pub title: String,
    pub author_id: i32,
    pub publisher_id: i32,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub publisher_id: i32,
}

fn is_valid_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() || price < 0.0 || price > MAX_PRICE {
        return Err(ValidationError::InvalidFormat("price".to_string()));
    }
    Ok(price)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_book))
        .route("", web::get().to(list_books))
        .route("/{id}", web::get().to(get_book))
        .route("/{id}", web::put().to(update_book))
        .route("/{id}", web::delete().to(delete_book));
}

/// POST /books
///
/// # Errors
/// - 400: Unknown author or publisher, invalid fields
/// - 409: ISBN already used
pub async fn create_book(
    form: web::Json<NewBook>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let title = is_valid_text("title", &form.title, MAX_TITLE_LENGTH)?;
    let isbn = form.isbn.as_deref().map(is_valid_isbn).transpose()?;
    let language = form
        .language
        .as_deref()
        .map(|l| is_valid_text("language", l, MAX_LANGUAGE_LENGTH))
        .transpose()?;
    let price = form.price.map(is_valid_price).transpose()?;

    let mut transaction = pool.begin().await?;
    let book = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books
            (title, author_id, publisher_id, isbn, publication_date, description, page_count, language, price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::float8::numeric(10, 2))
        RETURNING id, title, author_id, publisher_id
        "#,
    )
    .bind(&title)
    .bind(form.author_id)
    .bind(form.publisher_id)
    .bind(&isbn)
    .bind(form.publication_date)
    .bind(&form.description)
    .bind(form.page_count)
    .bind(&language)
    .bind(price)
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    tracing::info!(book_id = book.id, "Book created");
    Ok(HttpResponse::Created().json(book))
}

/// GET /books
pub async fn list_books(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let books = sqlx::query_as::<_, Book>(
        "SELECT id, title, author_id, publisher_id FROM books ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(books))
}

/// GET /books/{id}
pub async fn get_book(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let book = sqlx::query_as::<_, Book>(
        "SELECT id, title, author_id, publisher_id FROM books WHERE id = $1",
    )
    .bind(path.into_inner())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(book))
}

/// PUT /books/{id}
pub async fn update_book(
    path: web::Path<i32>,
    form: web::Json<UpdateBook>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let title = is_valid_text("title", &form.title, MAX_TITLE_LENGTH)?;

    let mut transaction = pool.begin().await?;
    let book = sqlx::query_as::<_, Book>(
        r#"
        UPDATE books SET title = $1, author_id = $2, publisher_id = $3
        WHERE id = $4
        RETURNING id, title, author_id, publisher_id
        "#,
    )
    .bind(&title)
    .bind(form.author_id)
    .bind(form.publisher_id)
    .bind(path.into_inner())
    .fetch_one(&mut transaction)
    .await?;
    transaction.commit().await?;

    Ok(HttpResponse::Ok().json(book))
}

/// DELETE /books/{id}
pub async fn delete_book(
    path: web::Path<i32>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let mut transaction = pool.begin().await?;
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(id)
        .execute(&mut transaction)
        .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound.into());
    }
    transaction.commit().await?;

    tracing::info!(book_id = id, "Book deleted");
    Ok(HttpResponse::NoContent().finish())
}
