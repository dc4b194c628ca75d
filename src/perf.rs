/// Catalog bulk-operation timings
///
/// Fills the catalog with synthetic rows and measures wall-clock time for a
/// bulk insert, a full select, a row-by-row update and a row-by-row delete.

use rand::distributions::Uniform;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::{Duration, Instant};

use crate::error::AppError;

/// Rows per multi-row INSERT statement
pub const BATCH_SIZE: usize = 1000;

pub const DEFAULT_SIZES: [usize; 4] = [1_000, 10_000, 100_000, 1_000_000];

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Timings for one data size
#[derive(Debug, Clone, Serialize)]
pub struct PerfReport {
    pub size: usize,
    pub insert: Duration,
    pub select: Duration,
    pub update: Duration,
    pub delete: Duration,
}

/// Random ASCII-letter string
pub fn random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let dist = Uniform::from(0..LETTERS.len());
    (0..length)
        .map(|_| LETTERS[rng.sample(dist)] as char)
        .collect()
}

/// Number of authors and publishers generated for `count` books
pub fn parent_counts(count: usize) -> (usize, usize) {
    ((count / 100).max(1), (count / 200).max(1))
}

/// Remove every catalog row
pub async fn clear_catalog(pool: &PgPool) -> Result<(), AppError> {
    let mut transaction = pool.begin().await?;
    sqlx::query("DELETE FROM books").execute(&mut transaction).await?;
    sqlx::query("DELETE FROM authors").execute(&mut transaction).await?;
    sqlx::query("DELETE FROM publishers").execute(&mut transaction).await?;
    transaction.commit().await?;
    Ok(())
}

async fn insert_names(pool: &PgPool, table: &str, count: usize) -> Result<(), AppError> {
    let names: Vec<String> = (0..count).map(|_| random_string(10)).collect();

    for chunk in names.chunks(BATCH_SIZE) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO {} (name) ", table));
        builder.push_values(chunk, |mut row, name| {
            row.push_bind(name);
        });
        builder.build().execute(pool).await?;
    }

    Ok(())
}

/// Insert `count` books plus their authors and publishers
pub async fn insert_test_data(pool: &PgPool, count: usize) -> Result<Duration, AppError> {
    let start = Instant::now();
    let (author_count, publisher_count) = parent_counts(count);

    insert_names(pool, "authors", author_count).await?;
    insert_names(pool, "publishers", publisher_count).await?;

    let author_ids = sqlx::query_scalar::<_, i32>("SELECT id FROM authors")
        .fetch_all(pool)
        .await?;
    let publisher_ids = sqlx::query_scalar::<_, i32>("SELECT id FROM publishers")
        .fetch_all(pool)
        .await?;

    let books: Vec<(String, i32, i32)> = {
        let mut rng = rand::thread_rng();
        (0..count)
            .filter_map(|_| {
                let author_id = *author_ids.choose(&mut rng)?;
                let publisher_id = *publisher_ids.choose(&mut rng)?;
                Some((random_string(15), author_id, publisher_id))
            })
            .collect()
    };

    for chunk in books.chunks(BATCH_SIZE) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO books (title, author_id, publisher_id) ");
        builder.push_values(chunk, |mut row, (title, author_id, publisher_id)| {
            row.push_bind(title)
                .push_bind(*author_id)
                .push_bind(*publisher_id);
        });
        builder.build().execute(pool).await?;
    }

    Ok(start.elapsed())
}

/// Fetch every book
pub async fn select_test(pool: &PgPool) -> Result<(Duration, usize), AppError> {
    let start = Instant::now();
    let rows = sqlx::query_as::<_, (i32, String, i32, i32)>(
        "SELECT id, title, author_id, publisher_id FROM books",
    )
    .fetch_all(pool)
    .await?;

    Ok((start.elapsed(), rows.len()))
}

/// Retitle every book, one statement per row, in a single transaction
pub async fn update_test(pool: &PgPool) -> Result<Duration, AppError> {
    let start = Instant::now();
    let ids = sqlx::query_scalar::<_, i32>("SELECT id FROM books")
        .fetch_all(pool)
        .await?;

    let mut transaction = pool.begin().await?;
    for id in ids {
        sqlx::query("UPDATE books SET title = $1 WHERE id = $2")
            .bind(random_string(15))
            .bind(id)
            .execute(&mut transaction)
            .await?;
    }
    transaction.commit().await?;

    Ok(start.elapsed())
}

/// Delete every book, one statement per row, in a single transaction
pub async fn delete_test(pool: &PgPool) -> Result<Duration, AppError> {
    let start = Instant::now();
    let ids = sqlx::query_scalar::<_, i32>("SELECT id FROM books")
        .fetch_all(pool)
        .await?;

    let mut transaction = pool.begin().await?;
    for id in ids {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut transaction)
            .await?;
    }
    transaction.commit().await?;

    Ok(start.elapsed())
}

/// Run the full insert/select/update/delete cycle for one size
pub async fn run_for_size(pool: &PgPool, size: usize) -> Result<PerfReport, AppError> {
    clear_catalog(pool).await?;

    let insert = insert_test_data(pool, size).await?;
    let (select, fetched) = select_test(pool).await?;
    let update = update_test(pool).await?;
    let delete = delete_test(pool).await?;

    tracing::info!(
        size,
        fetched,
        insert_ms = insert.as_millis() as u64,
        select_ms = select.as_millis() as u64,
        update_ms = update.as_millis() as u64,
        delete_ms = delete.as_millis() as u64,
        "Catalog benchmark finished"
    );

    clear_catalog(pool).await?;

    Ok(PerfReport {
        size,
        insert,
        select,
        update,
        delete,
    })
}

/// Run every size in order; a failing size is logged and skipped
pub async fn run_suite(pool: &PgPool, sizes: &[usize]) -> Vec<PerfReport> {
    let mut reports = Vec::with_capacity(sizes.len());

    for &size in sizes {
        match run_for_size(pool, size).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(size, error = %e, "Catalog benchmark failed");
                if let Err(e) = clear_catalog(pool).await {
                    tracing::error!(error = %e, "Failed to clean up after benchmark failure");
                }
            }
        }
    }

    reports
}

/// Render reports as a plain text table
pub fn format_reports(reports: &[PerfReport]) -> String {
    let mut out = format!(
        "{:>10} {:>12} {:>12} {:>12} {:>12}\n",
        "records", "insert (s)", "select (s)", "update (s)", "delete (s)"
    );
    for r in reports {
        out.push_str(&format!(
            "{:>10} {:>12.3} {:>12.3} {:>12.3} {:>12.3}\n",
            r.size,
            r.insert.as_secs_f64(),
            r.select.as_secs_f64(),
            r.update.as_secs_f64(),
            r.delete.as_secs_f64()
        ));
    }
    out
}
