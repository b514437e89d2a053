use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use uuid::Uuid;

use crate::{
    domain::{
        errors::{RecordResult, RecordStoreError},
        models::{BucketItem, BucketItemUpdate, NewBucketItem},
        value_objects::{ImageKey, ItemId, Title, Username},
    },
    ports::repositories::BucketItemRepository,
};

/// SQL-based implementation of BucketItemRepository using PostgreSQL.
///
/// The database assigns `id` and `created_at`.
#[derive(Clone)]
pub struct SqlBucketItemRepository {
    pool: PgPool,
}

impl SqlBucketItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a small connection pool against `connection_string`
    pub async fn connect(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        Ok(Self::new(pool))
    }

    /// Initialize database tables
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bucket_items (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                owner VARCHAR NOT NULL,
                title TEXT NOT NULL,
                image_key VARCHAR,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bucket_items_owner_created ON bucket_items(owner, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_item(row: &PgRow) -> RecordResult<BucketItem> {
        let id: Uuid = row.try_get("id").map_err(database_error("reading id"))?;
        let title: String = row.try_get("title").map_err(database_error("reading title"))?;
        let image_key: Option<String> = row
            .try_get("image_key")
            .map_err(database_error("reading image_key"))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(database_error("reading created_at"))?;

        let corrupt = |message: String| RecordStoreError::CorruptRecord {
            id: id.to_string(),
            message,
        };

        Ok(BucketItem {
            id: ItemId::from(id),
            title: Title::new(&title).map_err(|e| corrupt(e.to_string()))?,
            image_key: image_key
                .map(ImageKey::new)
                .transpose()
                .map_err(|e| corrupt(e.to_string()))?,
            created_at,
        })
    }
}

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> RecordStoreError {
    move |e| RecordStoreError::Unavailable {
        message: format!("Database error {}: {}", context, e),
        detail: Some(e.to_string()),
    }
}

/// Ids that are not UUIDs can never have been issued by this store
fn parse_id(id: &ItemId, owner: &Username) -> RecordResult<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| RecordStoreError::ItemNotFound {
        id: id.clone(),
        owner: owner.clone(),
    })
}

#[async_trait]
impl BucketItemRepository for SqlBucketItemRepository {
    async fn list_items(&self, owner: &Username) -> RecordResult<Vec<BucketItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, image_key, created_at
            FROM bucket_items
            WHERE owner = $1
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("listing items"))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn create_item(&self, owner: &Username, item: NewBucketItem) -> RecordResult<BucketItem> {
        let row = sqlx::query(
            r#"
            INSERT INTO bucket_items (owner, title, image_key)
            VALUES ($1, $2, $3)
            RETURNING id, title, image_key, created_at
            "#,
        )
        .bind(owner.as_str())
        .bind(item.title.as_str())
        .bind(item.image_key.as_ref().map(ImageKey::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("creating item"))?;

        Self::row_to_item(&row)
    }

    async fn update_item(
        &self,
        owner: &Username,
        update: BucketItemUpdate,
    ) -> RecordResult<BucketItem> {
        let id = parse_id(&update.id, owner)?;

        let row = sqlx::query(
            r#"
            UPDATE bucket_items
            SET title = $1, image_key = $2
            WHERE id = $3 AND owner = $4
            RETURNING id, title, image_key, created_at
            "#,
        )
        .bind(update.title.as_str())
        .bind(update.image_key.as_ref().map(ImageKey::as_str))
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("updating item"))?;

        match row {
            Some(row) => Self::row_to_item(&row),
            None => Err(RecordStoreError::ItemNotFound {
                id: update.id,
                owner: owner.clone(),
            }),
        }
    }

    async fn delete_item(&self, owner: &Username, id: &ItemId) -> RecordResult<()> {
        let uuid = parse_id(id, owner)?;

        let result = sqlx::query(
            r#"
            DELETE FROM bucket_items
            WHERE id = $1 AND owner = $2
            "#,
        )
        .bind(uuid)
        .bind(owner.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error("deleting item"))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::ItemNotFound {
                id: id.clone(),
                owner: owner.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_uuid_ids_are_not_found() {
        let owner = Username::new("alice".to_string()).unwrap();
        let id = ItemId::new("not-a-uuid".to_string()).unwrap();

        assert!(matches!(
            parse_id(&id, &owner),
            Err(RecordStoreError::ItemNotFound { .. })
        ));

        let uuid = Uuid::new_v4();
        assert_eq!(parse_id(&ItemId::from(uuid), &owner).unwrap(), uuid);
    }

    #[test]
    fn test_database_error_keeps_context() {
        let err = database_error("listing items")(sqlx::Error::PoolTimedOut);
        match err {
            RecordStoreError::Unavailable { message, detail } => {
                assert!(message.starts_with("Database error listing items"));
                assert!(detail.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
