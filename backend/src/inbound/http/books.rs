//! Catalogue handlers.
//!
//! ```text
//! GET    /api/v1/books?search=dune
//! GET    /api/v1/books/{id}
//! POST   /api/v1/books                {"title":"Dune","author":"Frank Herbert"}
//! PUT    /api/v1/books/{id}
//! DELETE /api/v1/books/{id}
//! POST   /api/v1/books/{id}/reserve | borrow | return | release
//! GET    /api/v1/books/{id}/loans
//! ```
//!
//! Every book in a response carries `actions`: what the current caller
//! could do with it right now. Clients use it to decide which controls to
//! show; the server re-checks on every call regardless.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Book, BookAction, BookDetails, BookDraft, BookEdit, BookStatusKind, CoverImage, Loan,
    Requester,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_book_validation_error, parse_book_id};

/// A book as clients see it.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    #[schema(example = "6f1c2b1e-8d7a-4f4e-9a53-2f5e1c9b0a11")]
    pub id: String,
    #[schema(example = "Dune")]
    pub title: String,
    #[schema(example = "Frank Herbert")]
    pub author: String,
    pub isbn: Option<String>,
    /// Cover as a `data:image/jpeg;base64,...` URL.
    pub image: Option<String>,
    #[schema(value_type = String, example = "reserved")]
    pub status: BookStatusKind,
    /// Holder of a reserved or borrowed book.
    #[schema(example = "alice")]
    pub reserved_by: Option<String>,
    /// Lifecycle actions the caller may take now.
    #[schema(value_type = Vec<String>, example = json!(["borrow", "return"]))]
    pub actions: Vec<BookAction>,
}

impl BookResponse {
    fn new(book: &Book, actions: Vec<BookAction>) -> Self {
        Self {
            id: book.id().to_string(),
            title: book.title().to_owned(),
            author: book.author().to_owned(),
            isbn: book.isbn().map(str::to_owned),
            image: book.image().map(CoverImage::to_data_url),
            status: book.status().kind(),
            reserved_by: book.status().holder().map(ToString::to_string),
            actions,
        }
    }
}

/// Descriptive fields for create and update.
///
/// On update an absent or undecodable `image` keeps the current cover.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[schema(example = "Dune")]
    pub title: String,
    #[schema(example = "Frank Herbert")]
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    /// `data:` URL or bare base64.
    #[serde(default)]
    pub image: Option<String>,
}

impl BookRequest {
    fn into_parts(self) -> ApiResult<(BookDetails, Option<CoverImage>)> {
        let details = BookDetails::try_new(&self.title, &self.author, self.isbn.as_deref())
            .map_err(map_book_validation_error)?;
        let image = self.image.as_deref().and_then(CoverImage::from_data_url);
        Ok((details, image))
    }
}

/// One entry of a book's loan history.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub book_id: String,
    #[schema(example = "alice")]
    pub holder: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            book_id: loan.book_id.to_string(),
            holder: loan.holder.to_string(),
            borrowed_at: loan.borrowed_at,
            returned_at: loan.returned_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring of the title or author.
    pub search: Option<String>,
}

async fn current_requester(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Option<Requester>> {
    session.requester(state.sessions.as_ref()).await
}

fn respond(state: &HttpState, book: &Book, requester: Option<&Requester>) -> BookResponse {
    BookResponse::new(book, state.lifecycle.allowed_actions(book, requester))
}

/// List books, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(SearchParams),
    responses(
        (status = 200, description = "Books in catalogue order", body = [BookResponse]),
        (status = 503, description = "Catalogue unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBooks",
    security((), ("SessionCookie" = []))
)]
#[get("/books")]
pub async fn list_books(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<BookResponse>>> {
    let requester = current_requester(&state, &session).await?;
    let books = state.catalog.search(query.search.as_deref()).await?;
    Ok(web::Json(
        books
            .iter()
            .map(|book| respond(&state, book, requester.as_ref()))
            .collect(),
    ))
}

/// Fetch one book.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "getBook",
    security((), ("SessionCookie" = []))
)]
#[get("/books/{id}")]
pub async fn get_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookResponse>> {
    let id = parse_book_id(&path)?;
    let requester = current_requester(&state, &session).await?;
    let book = state.catalog.get(&id).await?;
    Ok(web::Json(respond(&state, &book, requester.as_ref())))
}

/// Add a book. Admin only; new books are available.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "createBook"
)]
#[post("/books")]
pub async fn create_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookRequest>,
) -> ApiResult<HttpResponse> {
    let requester = current_requester(&state, &session).await?;
    let (details, image) = payload.into_inner().into_parts()?;
    let book = state
        .admin
        .create(requester.as_ref(), BookDraft { details, image })
        .await?;
    Ok(HttpResponse::Created().json(respond(&state, &book, requester.as_ref())))
}

/// Edit a book's descriptive fields. Admin only; status is untouched.
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "updateBook"
)]
#[put("/books/{id}")]
pub async fn update_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BookRequest>,
) -> ApiResult<web::Json<BookResponse>> {
    let id = parse_book_id(&path)?;
    let requester = current_requester(&state, &session).await?;
    let (details, image) = payload.into_inner().into_parts()?;
    let book = state
        .admin
        .update(requester.as_ref(), &id, BookEdit { details, image })
        .await?;
    Ok(web::Json(respond(&state, &book, requester.as_ref())))
}

/// Remove a book outright. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "deleteBook"
)]
#[delete("/books/{id}")]
pub async fn delete_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_book_id(&path)?;
    let requester = current_requester(&state, &session).await?;
    state.admin.delete(requester.as_ref(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn run_action(
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    action: BookAction,
) -> ApiResult<web::Json<BookResponse>> {
    let id = parse_book_id(raw_id)?;
    let requester = current_requester(state, session).await?;
    let lifecycle = state.lifecycle.as_ref();
    let book = match action {
        BookAction::Reserve => lifecycle.reserve(&id, requester.as_ref()).await?,
        BookAction::Borrow => lifecycle.borrow(&id, requester.as_ref()).await?,
        BookAction::Return => lifecycle.return_book(&id, requester.as_ref()).await?,
    };
    Ok(web::Json(respond(state, &book, requester.as_ref())))
}

/// Reserve a book for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/reserve",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Reserved", body = BookResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Book is not available", body = ErrorSchema),
        (status = 503, description = "Catalogue unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "reserveBook"
)]
#[post("/books/{id}/reserve")]
pub async fn reserve_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookResponse>> {
    run_action(&state, &session, &path, BookAction::Reserve).await
}

/// Borrow a book that is available or reserved by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/borrow",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Borrowed", body = BookResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Held by someone else or already on loan", body = ErrorSchema),
        (status = 503, description = "Catalogue unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "borrowBook"
)]
#[post("/books/{id}/borrow")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookResponse>> {
    run_action(&state, &session, &path, BookAction::Borrow).await
}

/// Return a held book, or cancel a reservation.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/return",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Back on the shelf", body = BookResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Held by someone else", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Book is already available", body = ErrorSchema),
        (status = 503, description = "Catalogue unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "returnBook"
)]
#[post("/books/{id}/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookResponse>> {
    run_action(&state, &session, &path, BookAction::Return).await
}

/// Force a book back to available. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/release",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book available", body = BookResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "releaseBook"
)]
#[post("/books/{id}/release")]
pub async fn release_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookResponse>> {
    let id = parse_book_id(&path)?;
    let requester = current_requester(&state, &session).await?;
    let book = state.admin.force_available(requester.as_ref(), &id).await?;
    Ok(web::Json(respond(&state, &book, requester.as_ref())))
}

/// Loan history of a book, oldest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}/loans",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Loans", body = [LoanResponse]),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listBookLoans"
)]
#[get("/books/{id}/loans")]
pub async fn list_loans(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<LoanResponse>>> {
    let id = parse_book_id(&path)?;
    let requester = current_requester(&state, &session).await?;
    let loans = state.admin.loan_history(requester.as_ref(), &id).await?;
    Ok(web::Json(loans.into_iter().map(LoanResponse::from).collect()))
}

#[cfg(test)]
#[path = "books_tests.rs"]
mod tests;
