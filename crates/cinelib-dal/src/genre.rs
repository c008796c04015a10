use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;

use crate::{Error, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateGenre {
    #[garde(length(min = 1, max = 150))]
    pub title: String,
    #[garde(skip)]
    pub latest_update: time::Date,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub title: String,
    pub latest_update: time::Date,
}

/// Label/value pair for populating a choice widget.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct SelectItem {
    pub label: String,
    pub value: i64,
}

pub type GenreRepository = GenreRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("INSERT INTO genre (title, latest_update) VALUES (?, ?)")
            .bind(&payload.title)
            .bind(payload.latest_update)
            .execute(&self.executor)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Genre {id}")))
    }

    pub async fn update(&self, id: i64, payload: CreateGenre) -> Result<Genre> {
        let result = sqlx::query("UPDATE genre SET title = ?, latest_update = ? WHERE id = ?")
            .bind(&payload.title)
            .bind(payload.latest_update)
            .bind(id)
            .execute(&self.executor)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Genre {id}")))
        } else {
            self.get(id)
                .await?
                .ok_or_else(|| Error::RecordNotFound(format!("Genre {id}")))
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Genre>> {
        let records =
            sqlx::query_as::<_, Genre>("SELECT id, title, latest_update FROM genre")
                .fetch(&self.executor)
                .take(crate::MAX_LIMIT)
                .try_collect::<Vec<_>>()
                .await?;
        Ok(records)
    }

    pub async fn select_items(&self) -> Result<Vec<SelectItem>> {
        let records =
            sqlx::query_as::<_, SelectItem>("SELECT title AS label, id AS value FROM genre")
                .fetch(&self.executor)
                .take(crate::MAX_LIMIT)
                .try_collect::<Vec<_>>()
                .await?;
        Ok(records)
    }

    /// Substring match of the trimmed query against trimmed titles.
    /// An empty query yields `None`, which is distinct from `Some` of an
    /// empty list on no matches - callers rely on the difference.
    pub async fn search(&self, name: &str) -> Result<Option<Vec<Genre>>> {
        if name.is_empty() {
            return Ok(None);
        }
        let records = sqlx::query_as::<_, Genre>(
            "SELECT id, title, latest_update FROM genre WHERE trim(title) LIKE '%' || trim(?) || '%'",
        )
        .bind(name)
        .fetch(&self.executor)
        .take(crate::MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(Some(records))
    }

    /// Count in the historical 0-255 range, saturating at 255.
    pub async fn count(&self) -> Result<u8> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM genre")
            .fetch_one(&self.executor)
            .await?;
        Ok(u8::try_from(count).unwrap_or(u8::MAX))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        // First check if the genre exists
        match sqlx::query_scalar::<_, i64>("SELECT id FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
        {
            Some(id) => {
                sqlx::query("DELETE FROM genre WHERE id = ?")
                    .bind(id)
                    .execute(&self.executor)
                    .await?;

                Ok(())
            }
            None => Err(Error::RecordNotFound(format!("Genre {id}"))),
        }
    }

    /// Delete the given record directly, without the lookup of [`delete`](Self::delete).
    pub async fn delete_record(&self, genre: &Genre) -> Result<()> {
        let res = sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(genre.id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Genre {}", genre.id)))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Genre>> {
        let record = sqlx::query_as::<_, Genre>(
            "SELECT id, title, latest_update FROM genre WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?;
        Ok(record)
    }
}
