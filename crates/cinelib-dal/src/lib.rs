pub mod error;
pub mod genre;
pub mod movie;

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

/// Hard cap on unpaged listings.
pub const MAX_LIMIT: usize = 10_000;

pub const DEFAULT_PAGE_SIZE: u32 = 32;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Offset-paged slice request. The page number is 1-based and is echoed
/// back unclamped, so a page past the end yields an empty slice.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1) as i64 * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn pages_for(&self, total: u64) -> u32 {
        total.div_ceil(self.page_size.max(1) as u64) as u32
    }
}
