//! Identity tables: users and refresh tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{RefreshToken, RefreshTokenStore, Result, User, UserStore};
use sqlx::FromRow;

use super::{db_error, PgStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: &User) -> Result<()> {
        // users.email carries a UNIQUE constraint; a violation becomes a Conflict
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to create user", e))?;

        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch user", e))?;

        Ok(row.map(User::from))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch user", e))?;

        Ok(row.map(User::from))
    }
}

#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    jti: String,
    user_id: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            jti: row.jti,
            user_id: row.user_id,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (jti, user_id, expires_at, revoked_at, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&token.jti)
        .bind(&token.user_id)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to store refresh token", e))?;

        Ok(())
    }

    async fn get_by_jti(&self, jti: &str) -> Result<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT jti, user_id, expires_at, revoked_at, created_at FROM refresh_tokens WHERE jti = $1",
        )
        .bind(jti)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch refresh token", e))?;

        Ok(row.map(RefreshToken::from))
    }

    async fn revoke(&self, jti: &str) -> Result<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE jti = $1 AND revoked_at IS NULL",
        )
        .bind(jti)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to revoke refresh token", e))?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete expired refresh tokens", e))?;

        Ok(result.rows_affected())
    }
}

/// These run against a live server: `DATABASE_URL=... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use folio_core::FolioError;
    use uuid::Uuid;

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PgStore::connect(&url, 2).await.unwrap();

        // Concurrent CREATE ... IF NOT EXISTS can still collide in the catalog
        let mut tx = store.pool().begin().await.unwrap();
        sqlx::query("SELECT pg_advisory_xact_lock(7105)")
            .execute(&mut *tx)
            .await
            .unwrap();
        sqlx::raw_sql(include_str!("../../sql/schema.sql"))
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        store
    }

    async fn user(store: &PgStore) -> User {
        let id = Uuid::new_v4().to_string();
        let user = User::new(id.clone(), format!("{id}@folio.test"), "salt:digest".to_string());
        UserStore::create(store, &user).await.unwrap();
        user
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_email_is_conflict() {
        let store = store().await;
        let existing = user(&store).await;

        let twin = User::new(
            Uuid::new_v4().to_string(),
            existing.email.clone(),
            "salt:digest".to_string(),
        );
        let err = UserStore::create(&store, &twin).await.unwrap_err();
        assert!(matches!(err, FolioError::Conflict(_)));

        let found = store.get_by_email(&existing.email).await.unwrap().unwrap();
        assert_eq!(found.id, existing.id);
    }

    #[tokio::test]
    #[ignore]
    async fn test_revoke_keeps_first_timestamp() {
        let store = store().await;
        let owner = user(&store).await;
        let jti = Uuid::new_v4().to_string();

        RefreshTokenStore::create(
            &store,
            &RefreshToken::new(jti.clone(), owner.id.clone(), Utc::now() + Duration::hours(1)),
        )
        .await
        .unwrap();

        store.revoke(&jti).await.unwrap();
        let first = store.get_by_jti(&jti).await.unwrap().unwrap().revoked_at;
        assert!(first.is_some());

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        store.revoke(&jti).await.unwrap();
        let second = store.get_by_jti(&jti).await.unwrap().unwrap().revoked_at;
        assert_eq!(first, second);

        // unknown JTI is a no-op
        store.revoke("no-such-jti").await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_delete_expired_keeps_live_tokens() {
        let store = store().await;
        let owner = user(&store).await;
        let expired = Uuid::new_v4().to_string();
        let live = Uuid::new_v4().to_string();

        RefreshTokenStore::create(
            &store,
            &RefreshToken::new(expired.clone(), owner.id.clone(), Utc::now() - Duration::minutes(1)),
        )
        .await
        .unwrap();
        RefreshTokenStore::create(
            &store,
            &RefreshToken::new(live.clone(), owner.id.clone(), Utc::now() + Duration::hours(1)),
        )
        .await
        .unwrap();

        // other expired rows in a shared database count too
        let purged = store.delete_expired().await.unwrap();
        assert!(purged >= 1);

        assert!(store.get_by_jti(&expired).await.unwrap().is_none());
        assert!(store.get_by_jti(&live).await.unwrap().is_some());
    }
}
