use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire as _, Pool};
use tracing::debug;

use crate::{Error, PageRequest, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateMovie {
    #[garde(length(min = 1, max = 320))]
    pub title: String,

    /// Age-rating label.
    #[garde(length(min = 1, max = 12))]
    pub rate: String,

    #[garde(skip)]
    pub release_date: time::Date,

    #[garde(length(min = 25))]
    pub description: String,

    #[garde(skip)]
    pub latest_update: time::Date,

    /// Genres to link the movie to, replacing any previous set on update.
    #[garde(skip)]
    pub genres: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub rate: String,
    pub release_date: time::Date,
    pub description: String,
    pub latest_update: time::Date,
    pub genres: Vec<i64>,
}

/// Page projection of a movie.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub genres: Vec<i64>,
    pub release_date: time::Date,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MoviePage {
    pub rows: Vec<MovieListItem>,
    /// Requested page number, echoed back unclamped.
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    rate: String,
    release_date: time::Date,
    description: String,
    latest_update: time::Date,
    genre_ids: Option<String>,
}

fn parse_genre_ids(genre_ids: Option<String>) -> Vec<i64> {
    genre_ids
        .map(|s| {
            s.split(',')
                .filter(|v| !v.is_empty())
                .filter_map(|v| v.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            rate: row.rate,
            release_date: row.release_date,
            description: row.description,
            latest_update: row.latest_update,
            genres: parse_genre_ids(row.genre_ids),
        }
    }
}

impl From<MovieRow> for MovieListItem {
    fn from(row: MovieRow) -> Self {
        MovieListItem {
            id: row.id,
            title: row.title,
            genres: parse_genre_ids(row.genre_ids),
            release_date: row.release_date,
            description: row.description,
        }
    }
}

const MOVIE_COLUMNS: &str = "m.id, m.title, m.rate, m.release_date, m.description, m.latest_update,
    group_concat(mg.genre_id) AS genre_ids";

pub type MovieRepository = MovieRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>
        + sqlx::Acquire<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list(&self, page: PageRequest) -> Result<MoviePage> {
        self.page_query(None, page).await
    }

    /// Substring match of the trimmed query against trimmed titles.
    /// Unlike genre search an empty query is not special cased here:
    /// it matches every movie.
    pub async fn search(&self, title: &str, page: PageRequest) -> Result<MoviePage> {
        self.page_query(Some(title), page).await
    }

    async fn page_query(&self, title: Option<&str>, page: PageRequest) -> Result<MoviePage> {
        let (total, rows) = match title {
            Some(title) => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT count(*) FROM movie WHERE trim(title) LIKE '%' || trim(?) || '%'",
                )
                .bind(title)
                .fetch_one(&self.executor)
                .await?;

                let sql = format!(
                    "SELECT {MOVIE_COLUMNS}
                    FROM movie m
                    LEFT JOIN movie_genres mg ON mg.movie_id = m.id
                    WHERE trim(m.title) LIKE '%' || trim(?) || '%'
                    GROUP BY m.id
                    ORDER BY m.id DESC
                    LIMIT ? OFFSET ?"
                );
                let rows = sqlx::query_as::<_, MovieRow>(&sql)
                    .bind(title)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.executor)
                    .await?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT count(*) FROM movie")
                    .fetch_one(&self.executor)
                    .await?;

                let sql = format!(
                    "SELECT {MOVIE_COLUMNS}
                    FROM movie m
                    LEFT JOIN movie_genres mg ON mg.movie_id = m.id
                    GROUP BY m.id
                    ORDER BY m.id DESC
                    LIMIT ? OFFSET ?"
                );
                let rows = sqlx::query_as::<_, MovieRow>(&sql)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.executor)
                    .await?;
                (total, rows)
            }
        };

        Ok(MoviePage {
            rows: rows.into_iter().map(MovieListItem::from).collect(),
            page: page.page,
            total_pages: page.pages_for(total as u64),
        })
    }

    /// Insert the movie and its genre links as one unit of work; a failing
    /// link rolls the movie back as well.
    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        let mut conn = self.executor.acquire().await?;
        let mut transaction = conn.begin().await?;

        let result = sqlx::query(
            "INSERT INTO movie (title, rate, release_date, description, latest_update) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(&payload.rate)
        .bind(payload.release_date)
        .bind(&payload.description)
        .bind(payload.latest_update)
        .execute(&mut *transaction)
        .await?;

        let id = result.last_insert_rowid();
        insert_links(id, &payload.genres, &mut transaction).await?;

        let record = get(id, &mut *transaction)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Movie {id}")))?;
        transaction.commit().await?;
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: CreateMovie) -> Result<Movie> {
        let mut conn = self.executor.acquire().await?;
        let mut transaction = conn.begin().await?;

        // Old edges go first, so the new set can never overlap leftovers.
        sqlx::query("DELETE FROM movie_genres WHERE movie_id = ?")
            .bind(id)
            .execute(&mut *transaction)
            .await?;

        let result = sqlx::query(
            "UPDATE movie SET title = ?, rate = ?, release_date = ?, description = ?, latest_update = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(&payload.rate)
        .bind(payload.release_date)
        .bind(&payload.description)
        .bind(payload.latest_update)
        .bind(id)
        .execute(&mut *transaction)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Movie {id}")));
        }

        insert_links(id, &payload.genres, &mut transaction).await?;
        debug!("Relinked movie {id} to {} genres", payload.genres.len());

        let record = get(id, &mut *transaction)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Movie {id}")))?;
        transaction.commit().await?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM movie")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        // Missing id is an error here, not a no-op
        let movie = self
            .get(id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Movie {id}")))?;
        self.delete_record(&movie).await
    }

    /// Delete the given record directly, without the lookup of [`delete`](Self::delete).
    /// Genre links are removed in the same unit of work.
    pub async fn delete_record(&self, movie: &Movie) -> Result<()> {
        let mut conn = self.executor.acquire().await?;
        let mut transaction = conn.begin().await?;

        sqlx::query("DELETE FROM movie_genres WHERE movie_id = ?")
            .bind(movie.id)
            .execute(&mut *transaction)
            .await?;

        let res = sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(movie.id)
            .execute(&mut *transaction)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::RecordNotFound(format!("Movie {}", movie.id)));
        }
        transaction.commit().await?;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Movie>> {
        get(id, &self.executor).await
    }
}

async fn get<'c, E>(id: i64, executor: E) -> Result<Option<Movie>>
where
    E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    let sql = format!(
        "SELECT {MOVIE_COLUMNS}
        FROM movie m
        LEFT JOIN movie_genres mg ON mg.movie_id = m.id
        WHERE m.id = ?
        GROUP BY m.id"
    );
    let record = sqlx::query_as::<_, MovieRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(record.map(Movie::from))
}

/// The join table carries no unique pair constraint, so the requested id
/// set is deduplicated here before linking.
async fn insert_links(
    movie_id: i64,
    genre_ids: &[i64],
    transaction: &mut sqlx::Transaction<'_, crate::ChosenDB>,
) -> Result<()> {
    let mut linked: Vec<i64> = Vec::with_capacity(genre_ids.len());
    for genre_id in genre_ids {
        if linked.contains(genre_id) {
            continue;
        }
        sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut **transaction)
            .await?;
        linked.push(*genre_id);
    }
    Ok(())
}
