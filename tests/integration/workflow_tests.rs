//! Service-level tests against a real PostgreSQL database.
//!
//! Each test gets a fresh database with migrations applied.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use library_server::{
    config::CatalogConfig,
    error::AppError,
    models::{
        book::{CreateBook, UpdateBook},
        borrow::{BorrowFilter, CreateBorrow},
        member::{CreateMember, UpdateMember},
        pagination::PageQuery,
    },
    repository::Repository,
    services::Services,
};
use sqlx::PgPool;

fn services(pool: PgPool) -> Services {
    Services::new(Repository::new(pool), CatalogConfig::default())
}

fn page(page: i64, limit: i64) -> PageQuery {
    PageQuery {
        page: Some(page),
        limit: Some(limit),
    }
}

fn new_book(title: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: "George Orwell".to_string(),
        published_year: Some(1949),
    }
}

fn new_member(email: &str) -> CreateMember {
    CreateMember {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        phone: None,
    }
}

async fn count_borrows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records")
        .fetch_one(pool)
        .await
        .expect("count borrow records")
}

fn assert_invalid_operation(err: AppError, expected: &str) {
    match err {
        AppError::InvalidOperation(msg) => {
            assert!(msg.contains(expected), "message {msg:?} should contain {expected:?}")
        }
        other => panic!("expected InvalidOperation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn borrow_and_return_flip_availability(pool: PgPool) {
    let services = services(pool);
    let book = services.books.create(&new_book("1984")).await.unwrap();
    let member = services.members.create(&new_member("a@b.com")).await.unwrap();

    let record = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: member.id,
        })
        .await
        .unwrap();
    assert!(record.returned_at.is_none());
    assert!(!services.books.get(book.id).await.unwrap().available);

    let returned = services.borrows.return_borrow(record.id).await.unwrap();
    assert!(returned.returned_at.is_some());
    assert_eq!(returned.book.id, book.id);
    assert_eq!(returned.member.email, "a@b.com");
    assert!(services.books.get(book.id).await.unwrap().available);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn borrowing_a_book_on_loan_fails(pool: PgPool) {
    let services = services(pool.clone());
    let book = services.books.create(&new_book("1984")).await.unwrap();
    let first = services.members.create(&new_member("first@example.com")).await.unwrap();
    let second = services.members.create(&new_member("second@example.com")).await.unwrap();

    services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: first.id,
        })
        .await
        .unwrap();

    let err = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: second.id,
        })
        .await
        .unwrap_err();
    assert_invalid_operation(err, "not available");
    assert_eq!(count_borrows(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn second_return_is_rejected(pool: PgPool) {
    let services = services(pool);
    let book = services.books.create(&new_book("Dune")).await.unwrap();
    let member = services.members.create(&new_member("a@b.com")).await.unwrap();
    let record = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: member.id,
        })
        .await
        .unwrap();

    let first = services.borrows.return_borrow(record.id).await.unwrap();
    let err = services.borrows.return_borrow(record.id).await.unwrap_err();
    assert_invalid_operation(err, "already been returned");

    let after = services.borrows.get(record.id).await.unwrap();
    assert_eq!(after.returned_at, first.returned_at);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn preconditions_are_checked_in_order_without_writes(pool: PgPool) {
    let services = services(pool.clone());
    let book = services.books.create(&new_book("Emma")).await.unwrap();
    let member = services.members.create(&new_member("a@b.com")).await.unwrap();

    // Missing book wins over missing member
    let err = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: 9999,
            member_id: 9999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg.starts_with("Book")));

    let err = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: 9999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg.starts_with("Member")));

    services
        .members
        .update(
            member.id,
            &UpdateMember {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: member.id,
        })
        .await
        .unwrap_err();
    assert_invalid_operation(err, "not active");

    assert_eq!(count_borrows(&pool).await, 0);
    assert!(services.books.get(book.id).await.unwrap().available);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn unknown_borrow_is_not_found(pool: PgPool) {
    let services = services(pool);
    let err = services.borrows.return_borrow(42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = services.borrows.get(42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn duplicate_email_is_a_business_rule_violation(pool: PgPool) {
    let services = services(pool);
    services.members.create(&new_member("a@b.com")).await.unwrap();

    let err = services.members.create(&new_member("a@b.com")).await.unwrap_err();
    assert_invalid_operation(err, "already exists");

    let other = services.members.create(&new_member("c@d.com")).await.unwrap();
    let err = services
        .members
        .update(
            other.id,
            &UpdateMember {
                email: Some("a@b.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_invalid_operation(err, "already exists");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn book_patch_changes_only_sent_fields(pool: PgPool) {
    let services = services(pool);
    let book = services.books.create(&new_book("Animal Farm")).await.unwrap();

    let updated = services
        .books
        .update(
            book.id,
            &UpdateBook {
                title: Some("Animal Farm: A Fairy Story".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Animal Farm: A Fairy Story");
    assert_eq!(updated.author, "George Orwell");
    assert_eq!(updated.published_year, Some(1949));

    let cleared = services
        .books
        .update(
            book.id,
            &UpdateBook {
                published_year: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.published_year, None);

    let err = services
        .books
        .update(
            book.id,
            &UpdateBook {
                published_year: Some(Some(2100)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_invalid_operation(err, "future");

    let err = services
        .books
        .update(9999, &UpdateBook::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn empty_listing_has_zero_pages(pool: PgPool) {
    let services = services(pool);
    let result = services
        .borrows
        .list(&BorrowFilter::default(), &page(1, 10))
        .await
        .unwrap();

    assert!(result.data.is_empty());
    assert_eq!(result.pagination.total, 0);
    assert_eq!(result.pagination.page, 1);
    assert_eq!(result.pagination.limit, 10);
    assert_eq!(result.pagination.pages, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn listing_pages_and_filters(pool: PgPool) {
    let services = services(pool);
    let member = services.members.create(&new_member("a@b.com")).await.unwrap();

    let mut record_ids = Vec::new();
    for i in 0..5 {
        let book = services.books.create(&new_book(&format!("Book {i}"))).await.unwrap();
        let record = services
            .borrows
            .borrow(&CreateBorrow {
                book_id: book.id,
                member_id: member.id,
            })
            .await
            .unwrap();
        record_ids.push(record.id);
    }
    services.borrows.return_borrow(record_ids[0]).await.unwrap();

    let books = services.books.list(&page(2, 2)).await.unwrap();
    assert_eq!(books.data.len(), 2);
    assert_eq!(books.pagination.pages, 3);

    let last = services.books.list(&page(3, 2)).await.unwrap();
    assert_eq!(last.data.len(), 1);

    let err = services.books.list(&page(4, 2)).await.unwrap_err();
    assert_invalid_operation(err, "exceeds total pages");

    let all = services
        .borrows
        .list(&BorrowFilter::default(), &page(1, 10))
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 5);
    // Most recent first
    assert_eq!(all.data[0].id, *record_ids.last().unwrap());

    let on_loan = services
        .borrows
        .list(
            &BorrowFilter {
                returned: Some(false),
                member_id: Some(member.id),
                book_id: None,
            },
            &page(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(on_loan.pagination.total, 4);
    assert!(on_loan.data.iter().all(|r| r.returned_at.is_none()));

    // `returned=true` is the listing default: every record
    let everything = services
        .borrows
        .list(
            &BorrowFilter {
                returned: Some(true),
                ..Default::default()
            },
            &page(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(everything.pagination.total, 5);
    assert!(everything.data.iter().any(|r| r.id == record_ids[0]));

    let err = services
        .borrows
        .list(&BorrowFilter::default(), &page(2, 5))
        .await
        .unwrap_err();
    assert_invalid_operation(err, "Page 2 exceeds total pages 1");

    let err = services.members.list(&page(2, 10)).await.unwrap_err();
    assert_invalid_operation(err, "Page 2 exceeds total pages 1");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn huge_page_is_a_business_rule_violation(pool: PgPool) {
    let services = services(pool);
    let book = services.books.create(&new_book("Dune")).await.unwrap();
    let member = services.members.create(&new_member("a@b.com")).await.unwrap();
    services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: member.id,
        })
        .await
        .unwrap();

    let huge = page(i64::MAX, 10);
    let expected = format!("Page {} exceeds total pages 1", i64::MAX);

    let err = services.books.list(&huge).await.unwrap_err();
    assert_invalid_operation(err, &expected);
    let err = services.members.list(&huge).await.unwrap_err();
    assert_invalid_operation(err, &expected);
    let err = services
        .borrows
        .list(&BorrowFilter::default(), &huge)
        .await
        .unwrap_err();
    assert_invalid_operation(err, &expected);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn huge_page_over_empty_table_is_empty(pool: PgPool) {
    let services = services(pool);
    let result = services.books.list(&page(i64::MAX, 10)).await.unwrap();
    assert!(result.data.is_empty());
    assert_eq!(result.pagination.pages, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn new_books_are_lendable_whatever_the_client_sends(pool: PgPool) {
    let services = services(pool);
    let request: CreateBook = serde_json::from_value(serde_json::json!({
        "title": "Brave New World",
        "author": "Aldous Huxley",
        "available": false
    }))
    .unwrap();
    let book = services.books.create(&request).await.unwrap();
    assert!(book.available);

    let member = services.members.create(&new_member("a@b.com")).await.unwrap();
    let record = services
        .borrows
        .borrow(&CreateBorrow {
            book_id: book.id,
            member_id: member.id,
        })
        .await
        .unwrap();
    assert_eq!(record.book_id, book.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn concurrent_borrows_of_one_book_admit_one(pool: PgPool) {
    let services = services(pool.clone());
    let book = services.books.create(&new_book("Middlemarch")).await.unwrap();
    let a = services.members.create(&new_member("a@b.com")).await.unwrap();
    let b = services.members.create(&new_member("c@d.com")).await.unwrap();

    let for_a = CreateBorrow {
        book_id: book.id,
        member_id: a.id,
    };
    let for_b = CreateBorrow {
        book_id: book.id,
        member_id: b.id,
    };
    let (first, second) = tokio::join!(
        services.borrows.borrow(&for_a),
        services.borrows.borrow(&for_b),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    assert_eq!(count_borrows(&pool).await, 1);
}
