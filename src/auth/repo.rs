use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserChanges};
use crate::db::StoreError;

const USER_COLUMNS: &str = "id, email, username, password_hash, phone_number, address, \
                            is_farmer, is_active, created_at, updated_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Whether another user (not `except`) already holds this email.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, StoreError>;
    /// Whether another user (not `except`) already holds this username.
    async fn username_taken(&self, username: &str, except: Option<Uuid>)
        -> Result<bool, StoreError>;
    /// Insert a user; duplicates surface as `StoreError::Duplicate`.
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn username_taken(
        &self,
        username: &str,
        except: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE username = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(username)
        .bind(except)
        .fetch_one(&self.db)
        .await?;
        Ok(taken)
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, username, password_hash, phone_number, address, is_farmer)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.phone_number)
        .bind(&new.address)
        .bind(new.is_farmer)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email        = COALESCE($2, email),
                   username     = COALESCE($3, username),
                   phone_number = COALESCE($4, phone_number),
                   address      = COALESCE($5, address),
                   is_farmer    = COALESCE($6, is_farmer),
                   updated_at   = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.email)
        .bind(changes.username)
        .bind(changes.phone_number)
        .bind(changes.address)
        .bind(changes.is_farmer)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }
}
