use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::contact::repo_types::{ContactMessage, NewContactMessage};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, new: NewContactMessage) -> anyhow::Result<ContactMessage>;
    async fn count(&self) -> anyhow::Result<i64>;
}

#[derive(Clone)]
pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, new: NewContactMessage) -> anyhow::Result<ContactMessage> {
        let msg = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (id, name, email, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, message, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.message)
        .fetch_one(&self.db)
        .await
        .context("insert contact message")?;
        Ok(msg)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(&self.db)
            .await
            .context("count contact messages")?;
        Ok(n)
    }
}
