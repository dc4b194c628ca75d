mod common;

use common::{error_code, spawn_app, TestApp};
use serde_json::{json, Value};

async fn create_author(app: &TestApp, token: &str, name: &str) -> i64 {
    let response = app
        .post_authed("/authors", token, &json!({"name": name}))
        .await;
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No author id")
}

async fn create_publisher(app: &TestApp, token: &str, name: &str) -> i64 {
    let response = app
        .post_authed("/publishers", token, &json!({"name": name}))
        .await;
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No publisher id")
}

// --- Authors ---

#[tokio::test]
async fn author_crud_round() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let response = app
        .post_authed(
            "/authors",
            token,
            &json!({
                "name": "Ursula K. Le Guin",
                "email": "ursula@example.com",
                "birth_date": "1929-10-21",
                "biography": "Earthsea"
            }),
        )
        .await;
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["birth_date"], "1929-10-21");
    let id = created["id"].as_i64().unwrap();

    let response = app.get_authed(&format!("/authors/{}", id), token).await;
    assert_eq!(200, response.status().as_u16());
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["email"], "ursula@example.com");

    let response = app
        .put_authed(&format!("/authors/{}", id), token, &json!({"name": "U. K. Le Guin"}))
        .await;
    assert_eq!(200, response.status().as_u16());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "U. K. Le Guin");

    let list: Value = app.get_authed("/authors", token).await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "U. K. Le Guin");

    let response = app.delete_authed(&format!("/authors/{}", id), token).await;
    assert_eq!(204, response.status().as_u16());

    let response = app.get_authed(&format!("/authors/{}", id), token).await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn author_with_bad_email_is_rejected() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;

    let response = app
        .post_authed(
            "/authors",
            &user.access_token,
            &json!({"name": "Someone", "email": "not-an-email"}),
        )
        .await;
    assert_eq!(400, response.status().as_u16());
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_ids_return_404() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    for path in ["/authors/9999", "/publishers/9999", "/books/9999"] {
        let response = app.get_authed(path, token).await;
        assert_eq!(404, response.status().as_u16(), "GET {}", path);

        let response = app.delete_authed(path, token).await;
        assert_eq!(404, response.status().as_u16(), "DELETE {}", path);
    }

    let response = app
        .put_authed("/authors/9999", token, &json!({"name": "Nobody"}))
        .await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn malformed_ids_and_bodies_return_structured_400() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    for path in ["/authors/abc", "/publishers/abc", "/books/abc"] {
        let response = app.get_authed(path, token).await;
        assert_eq!(400, response.status().as_u16(), "GET {}", path);
        assert_eq!(error_code(response).await, "VALIDATION_ERROR", "GET {}", path);
    }

    let response = app
        .post_authed("/books", token, &json!({"title": "No refs"}))
        .await;
    assert_eq!(400, response.status().as_u16());
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}

// --- Publishers ---

#[tokio::test]
async fn publisher_crud_round() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let response = app
        .post_authed(
            "/publishers",
            token,
            &json!({"name": "Ace Books", "founded_year": 1952, "location": "New York"}),
        )
        .await;
    assert_eq!(201, response.status().as_u16());
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["founded_year"], 1952);
    let id = created["id"].as_i64().unwrap();

    let response = app
        .put_authed(&format!("/publishers/{}", id), token, &json!({"name": "Ace"}))
        .await;
    assert_eq!(200, response.status().as_u16());

    let fetched: Value = app
        .get_authed(&format!("/publishers/{}", id), token)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Ace");

    let response = app.delete_authed(&format!("/publishers/{}", id), token).await;
    assert_eq!(204, response.status().as_u16());
}

// --- Books ---

#[tokio::test]
async fn book_crud_round() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let author_id = create_author(&app, token, "Frank Herbert").await;
    let other_author_id = create_author(&app, token, "Brian Herbert").await;
    let publisher_id = create_publisher(&app, token, "Chilton").await;

    let response = app
        .post_authed(
            "/books",
            token,
            &json!({
                "title": "Dune",
                "author_id": author_id,
                "publisher_id": publisher_id,
                "isbn": "978-0-441-17271-9",
                "page_count": 412,
                "language": "en"
            }),
        )
        .await;
    assert_eq!(201, response.status().as_u16());
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["title"], "Dune");
    assert_eq!(book["author_id"], author_id);
    let id = book["id"].as_i64().unwrap();

    let response = app
        .put_authed(
            &format!("/books/{}", id),
            token,
            &json!({"title": "Dune Messiah", "author_id": other_author_id, "publisher_id": publisher_id}),
        )
        .await;
    assert_eq!(200, response.status().as_u16());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["title"], "Dune Messiah");
    assert_eq!(updated["author_id"], other_author_id);

    let list: Value = app.get_authed("/books", token).await.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = app.delete_authed(&format!("/books/{}", id), token).await;
    assert_eq!(204, response.status().as_u16());
}

#[tokio::test]
async fn book_with_unknown_author_is_rejected() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let publisher_id = create_publisher(&app, token, "Chilton").await;

    let response = app
        .post_authed(
            "/books",
            token,
            &json!({"title": "Orphan", "author_id": 424242, "publisher_id": publisher_id}),
        )
        .await;
    assert_eq!(400, response.status().as_u16());
    assert_eq!(error_code(response).await, "INVALID_REFERENCE");

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn duplicate_isbn_returns_409() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let author_id = create_author(&app, token, "Frank Herbert").await;
    let publisher_id = create_publisher(&app, token, "Chilton").await;
    let body = json!({
        "title": "Dune",
        "author_id": author_id,
        "publisher_id": publisher_id,
        "isbn": "9780441172719"
    });

    assert_eq!(201, app.post_authed("/books", token, &body).await.status().as_u16());

    let response = app.post_authed("/books", token, &body).await;
    assert_eq!(409, response.status().as_u16());
    assert_eq!(error_code(response).await, "DUPLICATE_ENTRY");
}

#[tokio::test]
async fn book_price_is_stored_and_validated() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let author_id = create_author(&app, token, "Frank Herbert").await;
    let publisher_id = create_publisher(&app, token, "Chilton").await;

    let response = app
        .post_authed(
            "/books",
            token,
            &json!({"title": "Dune", "author_id": author_id, "publisher_id": publisher_id, "price": 12.999}),
        )
        .await;
    assert_eq!(201, response.status().as_u16());
    let book_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let stored: String = sqlx::query_scalar("SELECT price::text FROM books WHERE id = $1")
        .bind(book_id as i32)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(stored, "13.00");

    let response = app
        .post_authed(
            "/books",
            token,
            &json!({"title": "Free", "author_id": author_id, "publisher_id": publisher_id, "price": -1.0}),
        )
        .await;
    assert_eq!(400, response.status().as_u16());
    assert_eq!(error_code(response).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn deleting_author_cascades_to_books() {
    let app = spawn_app().await;
    let user = app.logged_in_user("alice", "pw123").await;
    let token = &user.access_token;

    let author_id = create_author(&app, token, "Frank Herbert").await;
    let publisher_id = create_publisher(&app, token, "Chilton").await;

    for title in ["Dune", "Children of Dune"] {
        let response = app
            .post_authed(
                "/books",
                token,
                &json!({"title": title, "author_id": author_id, "publisher_id": publisher_id}),
            )
            .await;
        assert_eq!(201, response.status().as_u16());
    }

    let response = app.delete_authed(&format!("/authors/{}", author_id), token).await;
    assert_eq!(204, response.status().as_u16());

    let list: Value = app.get_authed("/books", token).await.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn all_catalog_endpoints_require_auth() {
    let app = spawn_app().await;

    for path in ["/authors", "/authors/1", "/publishers", "/publishers/1", "/books", "/books/1"] {
        let response = app
            .client
            .get(&format!("{}{}", &app.address, path))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16(), "Endpoint {} should require authentication", path);
    }
}
