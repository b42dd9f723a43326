use async_trait::async_trait;
use bookmark_core::filter::{SortDirection, SortField};
use bookmark_core::repository::{ListPage, ReadRepository, Repository, Result};
use bookmark_core::{Bookmark, BookmarkId, BookmarkPatch, ListQuery, Predicate, StorageError};
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use tracing::{debug, trace};

const COLUMNS: &str = "id, link, description, favorites, created_at, updated_at";

/// MySQL implementation of the repository contract.
///
/// Timestamps are stored as microseconds since the Unix epoch. The schema is
/// managed by the versioned migrations in `migrations/`, applied with
/// [`MySqlRepository::migrate`].
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Applies all pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Operation(format!("migration failed: {e}")))
    }
}

fn parse_timestamp(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn row_to_bookmark(row: &MySqlRow) -> Result<Bookmark> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let id = BookmarkId::parse(&id)
        .map_err(|_| StorageError::InvalidData(format!("invalid bookmark id '{id}'")))?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    Ok(Bookmark {
        id,
        link: row.try_get("link").map_err(map_sqlx_error)?,
        description: row.try_get("description").map_err(map_sqlx_error)?,
        favorites: row.try_get("favorites").map_err(map_sqlx_error)?,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
    })
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::Favorites => "favorites",
        SortField::Link => "link",
    }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Appends the `WHERE` clause for `predicate`, if any.
fn push_predicate(builder: &mut QueryBuilder<'_, MySql>, predicate: Option<&Predicate>) {
    let Some(predicate) = predicate else {
        return;
    };

    match *predicate {
        Predicate::Favorites(value) => {
            builder.push(" WHERE favorites = ").push_bind(value);
        }
        Predicate::CreatedAt { equals, range } => {
            builder.push(" WHERE (");
            let mut first = true;
            if let Some(equals) = equals {
                builder
                    .push("created_at = ")
                    .push_bind(equals.as_microsecond());
                first = false;
            }
            if let Some(range) = range {
                if !first {
                    builder.push(" OR ");
                }
                builder
                    .push("created_at BETWEEN ")
                    .push_bind(range.from.as_microsecond())
                    .push(" AND ")
                    .push_bind(range.to.as_microsecond());
            }
            builder.push(")");
        }
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, id: &BookmarkId) -> Result<Option<Bookmark>> {
        let row = sqlx::query(
            r#"
            SELECT id, link, description, favorites, created_at, updated_at
            FROM bookmarks
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_bookmark).transpose()
    }

    async fn list(&self, query: &ListQuery) -> Result<ListPage> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) AS total FROM bookmarks");
        push_predicate(&mut count, query.predicate.as_ref());
        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .try_get("total")
            .map_err(map_sqlx_error)?;

        let mut select = QueryBuilder::<MySql>::new(format!("SELECT {COLUMNS} FROM bookmarks"));
        push_predicate(&mut select, query.predicate.as_ref());
        select
            .push(" ORDER BY ")
            .push(sort_column(query.sort.field))
            .push(" ")
            .push(sort_keyword(query.sort.direction))
            .push(", id ASC LIMIT ")
            .push_bind(query.pagination.limit)
            .push(" OFFSET ")
            .push_bind(query.pagination.offset);

        trace!(sql = select.sql(), "listing bookmarks");

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let items = rows.iter().map(row_to_bookmark).collect::<Result<Vec<_>>>()?;

        debug!(total, returned = items.len(), "listed bookmarks");

        Ok(ListPage {
            total: u64::try_from(total).unwrap_or_default(),
            items,
        })
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, bookmark: Bookmark) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (id, link, description, favorites, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bookmark.id.to_string())
        .bind(bookmark.link)
        .bind(bookmark.description)
        .bind(bookmark.favorites)
        .bind(bookmark.created_at.as_microsecond())
        .bind(bookmark.updated_at.as_microsecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(bookmark.id.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update(
        &self,
        id: &BookmarkId,
        patch: BookmarkPatch,
        updated_at: Timestamp,
    ) -> Result<bool> {
        // `updated_at` always changes, so the affected row count equals the
        // matched row count even though MySQL reports changed rows.
        let result = sqlx::query(
            r#"
            UPDATE bookmarks
            SET link = COALESCE(?, link),
                description = COALESCE(?, description),
                favorites = COALESCE(?, favorites),
                updated_at = GREATEST(?, updated_at + 1)
            WHERE id = ?
            "#,
        )
        .bind(patch.link)
        .bind(patch.description)
        .bind(patch.favorites)
        .bind(updated_at.as_microsecond())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &BookmarkId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM bookmarks
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
