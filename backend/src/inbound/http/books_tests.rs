//! Handler tests for the catalogue endpoints.

use super::*;
use crate::inbound::http::auth::login;
use crate::inbound::http::test_utils::{
    ADMIN, ALICE, BOB, login_request, seeded_state, session_cookie, test_session_middleware,
};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use rstest::rstest;
use serde_json::{Value, json};

const MISSING_ID: &str = "00000000-0000-4000-8000-000000000000";

macro_rules! books_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_state().await))
                .wrap(test_session_middleware())
                .service(
                    web::scope("/api/v1")
                        .service(login)
                        .service(list_books)
                        .service(get_book)
                        .service(create_book)
                        .service(update_book)
                        .service(delete_book)
                        .service(reserve_book)
                        .service(borrow_book)
                        .service(return_book)
                        .service(release_book)
                        .service(list_loans),
                ),
        )
        .await
    };
}

macro_rules! sign_in {
    ($app:expr, $who:expr) => {{
        let res = test::call_service(&$app, login_request($who).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        session_cookie(&res)
    }};
}

macro_rules! create {
    ($app:expr, $admin:expr, $title:expr, $author:expr) => {{
        let res = test::call_service(
            &$app,
            test::TestRequest::post()
                .uri("/api/v1/books")
                .cookie($admin.clone())
                .set_json(json!({ "title": $title, "author": $author }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        body["id"].as_str().expect("id").to_owned()
    }};
}

fn action(id: &str, verb: &str, cookie: Option<&Cookie<'static>>) -> test::TestRequest {
    let req = test::TestRequest::post().uri(&format!("/api/v1/books/{id}/{verb}"));
    match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    }
}

#[rstest]
#[actix_web::test]
async fn admin_created_books_read_back_unchanged() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/books")
            .cookie(admin.clone())
            .set_json(json!({
                "title": "Dune",
                "author": "Frank Herbert",
                "isbn": "9780441172719",
                "image": "data:image/png;base64,AQID"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["status"], "available");
    assert_eq!(created["reservedBy"], Value::Null);
    assert_eq!(created["image"], "data:image/jpeg;base64,AQID");
    assert_eq!(created["isbn"], "9780441172719");

    let id = created["id"].as_str().expect("id");
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/books/{id}"))
            .cookie(admin)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(res).await;
    assert_eq!(fetched, created);
    assert_eq!(fetched["author"], "Frank Herbert");
    assert_eq!(fetched["isbn"], "9780441172719");
    assert_eq!(fetched["image"], "data:image/jpeg;base64,AQID");
    assert_eq!(fetched["reservedBy"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn members_cannot_create_books() {
    let app = books_app!();
    let alice = sign_in!(app, ALICE);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/books")
            .cookie(alice)
            .set_json(json!({ "title": "Dune", "author": "Frank Herbert" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn blank_titles_are_rejected() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/books")
            .cookie(admin)
            .set_json(json!({ "title": "  ", "author": "Frank Herbert" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "title");
}

#[rstest]
#[actix_web::test]
async fn anonymous_reservations_are_unauthorised() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let id = create!(app, admin, "Dune", "Frank Herbert");

    let res = test::call_service(&app, action(&id, "reserve", None).to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn reserve_borrow_return_walks_the_lifecycle() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let id = create!(app, admin, "Dune", "Frank Herbert");

    let reserved = test::call_service(&app, action(&id, "reserve", Some(&alice)).to_request()).await;
    assert_eq!(reserved.status(), StatusCode::OK);
    let body: Value = test::read_body_json(reserved).await;
    assert_eq!(body["status"], "reserved");
    assert_eq!(body["reservedBy"], "alice");
    assert_eq!(body["actions"], json!(["borrow", "return"]));

    let borrowed = test::call_service(&app, action(&id, "borrow", Some(&alice)).to_request()).await;
    let body: Value = test::read_body_json(borrowed).await;
    assert_eq!(body["status"], "borrowed");
    assert_eq!(body["actions"], json!(["return"]));

    let returned = test::call_service(&app, action(&id, "return", Some(&alice)).to_request()).await;
    let body: Value = test::read_body_json(returned).await;
    assert_eq!(body["status"], "available");
    assert_eq!(body["reservedBy"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn borrowing_someone_elses_reservation_conflicts() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let bob = sign_in!(app, BOB);
    let id = create!(app, admin, "Dune", "Frank Herbert");
    test::call_service(&app, action(&id, "reserve", Some(&alice)).to_request()).await;

    let res = test::call_service(&app, action(&id, "borrow", Some(&bob)).to_request()).await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_state");
    assert_eq!(body["details"]["status"], "reserved");
    assert_eq!(body["details"]["action"], "borrow");
}

#[rstest]
#[actix_web::test]
async fn returning_someone_elses_book_is_forbidden() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let bob = sign_in!(app, BOB);
    let id = create!(app, admin, "Dune", "Frank Herbert");
    test::call_service(&app, action(&id, "borrow", Some(&alice)).to_request()).await;

    let res = test::call_service(&app, action(&id, "return", Some(&bob)).to_request()).await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[case("reserve")]
#[case("borrow")]
#[case("return")]
#[actix_web::test]
async fn unknown_books_are_not_found(#[case] verb: &str) {
    let app = books_app!();
    let alice = sign_in!(app, ALICE);

    let res = test::call_service(&app, action(MISSING_ID, verb, Some(&alice)).to_request()).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["bookId"], MISSING_ID);
}

#[rstest]
#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = books_app!();

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/books/not-a-uuid")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}

#[rstest]
#[actix_web::test]
async fn anonymous_listing_shows_books_without_actions() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    create!(app, admin, "Dune", "Frank Herbert");
    create!(app, admin, "Emma", "Jane Austen");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/books").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let books = body.as_array().expect("array");
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"], "Dune");
    assert!(books.iter().all(|book| book["actions"] == json!([])));
}

#[rstest]
#[case("austen", 1)]
#[case("DUNE", 1)]
#[case("   ", 2)]
#[case("tolkien", 0)]
#[actix_web::test]
async fn search_filters_titles_and_authors(#[case] needle: &str, #[case] expected: usize) {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    create!(app, admin, "Dune", "Frank Herbert");
    create!(app, admin, "Emma", "Jane Austen");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/books?search={}",
                needle.replace(' ', "%20")
            ))
            .to_request(),
    )
    .await;

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.as_array().expect("array").len(), expected);
}

#[rstest]
#[actix_web::test]
async fn updates_keep_status_and_cover() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/books")
            .cookie(admin.clone())
            .set_json(json!({ "title": "Dune", "author": "Herbert", "image": "AQID" }))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(created).await;
    let id = body["id"].as_str().expect("id").to_owned();
    test::call_service(&app, action(&id, "reserve", Some(&alice)).to_request()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/books/{id}"))
            .cookie(admin)
            .set_json(json!({ "title": "Dune", "author": "Frank Herbert" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["author"], "Frank Herbert");
    assert_eq!(body["status"], "reserved");
    assert_eq!(body["reservedBy"], "alice");
    assert_eq!(body["image"], "data:image/jpeg;base64,AQID");
}

#[rstest]
#[actix_web::test]
async fn deleted_books_disappear() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let id = create!(app, admin, "Dune", "Frank Herbert");

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/books/{id}"))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/books/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn release_clears_a_loan_and_history_records_it() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let id = create!(app, admin, "Dune", "Frank Herbert");
    test::call_service(&app, action(&id, "borrow", Some(&alice)).to_request()).await;

    let denied = test::call_service(&app, action(&id, "release", Some(&alice)).to_request()).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let released = test::call_service(&app, action(&id, "release", Some(&admin)).to_request()).await;
    assert_eq!(released.status(), StatusCode::OK);
    let body: Value = test::read_body_json(released).await;
    assert_eq!(body["status"], "available");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/books/{id}/loans"))
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let loans = body.as_array().expect("array");
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0]["holder"], "alice");
    assert_eq!(loans[0]["bookId"], id.as_str());
    assert!(loans[0]["returnedAt"].is_string());
}

#[rstest]
#[actix_web::test]
async fn members_cannot_read_loan_history() {
    let app = books_app!();
    let admin = sign_in!(app, ADMIN);
    let alice = sign_in!(app, ALICE);
    let id = create!(app, admin, "Dune", "Frank Herbert");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/books/{id}/loans"))
            .cookie(alice)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
