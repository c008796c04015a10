use cinelib_dal::Error;
use cinelib_dal::genre::{CreateGenre, GenreRepositoryImpl};
use futures::TryStreamExt as _;
use sqlx::Executor;
use time::macros::date;

const TEST_DATA: &str = r#"
INSERT INTO genre (id, title, latest_update) VALUES (1, 'Crime', '2024-03-01');
INSERT INTO genre (id, title, latest_update) VALUES (2, 'Sci-Fi', '2024-03-01');
INSERT INTO genre (id, title, latest_update) VALUES (3, 'Fantasy', '2024-03-02');
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    sqlx::migrate!("../../migrations").run(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

#[tokio::test]
async fn test_genre_create_then_get() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let created = repo
        .create(CreateGenre {
            title: "Thriller".to_string(),
            latest_update: date!(2024 - 05 - 01),
        })
        .await
        .unwrap();
    assert!(created.id > 3);

    let fetched = repo.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, "Thriller");
    assert_eq!(fetched.latest_update, date!(2024 - 05 - 01));

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn test_genre_get_missing_is_none() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    assert!(repo.get(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_genre_update() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let updated = repo
        .update(
            2,
            CreateGenre {
                title: "Science Fiction".to_string(),
                latest_update: date!(2024 - 06 - 01),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Science Fiction");

    let err = repo
        .update(
            999,
            CreateGenre {
                title: "Nope".to_string(),
                latest_update: date!(2024 - 06 - 01),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_genre_delete() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    repo.delete(1).await.unwrap();
    assert!(repo.get(1).await.unwrap().is_none());

    let err = repo.delete(1).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_genre_delete_record() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let genre = repo.get(3).await.unwrap().unwrap();
    repo.delete_record(&genre).await.unwrap();
    assert!(repo.get(3).await.unwrap().is_none());

    let err = repo.delete_record(&genre).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_genre_search() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let found = repo.search("sci").await.unwrap().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Sci-Fi");

    // query gets trimmed before matching
    let found = repo.search("  crime  ").await.unwrap().unwrap();
    assert_eq!(found.len(), 1);

    let no_match = repo.search("western").await.unwrap().unwrap();
    assert!(no_match.is_empty());

    // empty query is absent, not an empty list
    assert!(repo.search("").await.unwrap().is_none());
}

#[tokio::test]
async fn test_genre_select_items() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    let items = repo.select_items().await.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].label, "Crime");
    assert_eq!(items[0].value, 1);
}

#[tokio::test]
async fn test_genre_count_saturates() {
    let conn = init_db().await;
    let repo = GenreRepositoryImpl::new(conn);

    assert_eq!(repo.count().await.unwrap(), 3);

    for i in 0..300 {
        repo.create(CreateGenre {
            title: format!("Genre {i}"),
            latest_update: date!(2024 - 01 - 01),
        })
        .await
        .unwrap();
    }
    // 303 records, reported count stops at the range ceiling
    assert_eq!(repo.count().await.unwrap(), 255);
}
