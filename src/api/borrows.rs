//! Borrow and return endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowDetails, BorrowQuery, BorrowRecord, CreateBorrow},
        pagination::Paginated,
    },
    AppState,
};

/// List borrow records, most recent first
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    params(BorrowQuery),
    responses(
        (status = 200, description = "Page of borrow records", body = Paginated<BorrowDetails>),
        (status = 400, description = "Invalid filter, page or limit", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_borrows(
    State(state): State<AppState>,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<Paginated<BorrowDetails>>> {
    query.validate()?;

    let page = state
        .services
        .borrows
        .list(&query.filter(), &query.page_query())
        .await?;
    Ok(Json(page))
}

/// Get a borrow record by ID
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Borrow record details", body = BorrowDetails),
        (status = 404, description = "Borrow record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrow(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowDetails>> {
    let borrow = state.services.borrows.get(id).await?;
    Ok(Json(borrow))
}

/// Borrow a book for a member
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Book unavailable or member inactive", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    Json(request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    request.validate()?;

    let record = state.services.borrows.borrow(&request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    patch,
    path = "/borrows/{id}/return",
    tag = "borrows",
    params(("id" = i32, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Book returned", body = BorrowDetails),
        (status = 400, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrow record or book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowDetails>> {
    let borrow = state.services.borrows.return_borrow(id).await?;
    Ok(Json(borrow))
}
