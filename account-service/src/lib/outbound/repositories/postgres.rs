use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::PageSlice;
use crate::domain::account::models::Username;
use crate::domain::account::ports::CredentialStore;

const USERNAME_CONSTRAINT: &str = "accounts_username_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

/// PostgreSQL-backed account store.
///
/// The `accounts` table carries unique constraints on username and email, so
/// this adapter is the authoritative uniqueness guard; constraint violations
/// racing past the service's pre-checks surface as the same duplicate errors.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn translate_write_error(e: sqlx::Error, username: &str, email: &str) -> AccountError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                if db_err.constraint() == Some(USERNAME_CONSTRAINT) {
                    return AccountError::DuplicateUsername(username.to_string());
                }
                if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                    return AccountError::DuplicateEmail(email.to_string());
                }
            }
        }
        AccountError::StorageFailure(e.to_string())
    }
}

fn storage_error(e: sqlx::Error) -> AccountError {
    AccountError::StorageFailure(e.to_string())
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountError> {
    let failed_attempts: i32 = row.try_get("failed_attempts").map_err(storage_error)?;

    Ok(Account {
        id: AccountId(row.try_get::<Uuid, _>("id").map_err(storage_error)?),
        username: Username::new(row.try_get::<String, _>("username").map_err(storage_error)?)?,
        email: EmailAddress::new(row.try_get::<String, _>("email").map_err(storage_error)?)?,
        password_hash: row.try_get("password_hash").map_err(storage_error)?,
        active: row.try_get("active").map_err(storage_error)?,
        failed_attempts: failed_attempts.max(0) as u32,
        locked: row.try_get("locked").map_err(storage_error)?,
        last_login_at: row
            .try_get::<Option<DateTime<Utc>>, _>("last_login_at")
            .map_err(storage_error)?,
        created_at: row.try_get("created_at").map_err(storage_error)?,
        updated_at: row.try_get("updated_at").map_err(storage_error)?,
    })
}

const SELECT_COLUMNS: &str = "id, username, email, password_hash, active, failed_attempts, \
                              locked, last_login_at, created_at, updated_at";

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError> {
        let id = AccountId::new();

        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, username, email, password_hash, active, failed_attempts,
                 locked, last_login_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.active)
        .bind(account.failed_attempts as i32)
        .bind(account.locked)
        .bind(account.last_login_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Self::translate_write_error(e, account.username.as_str(), account.email.as_str())
        })?;

        Ok(account.into_account(id))
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AccountError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn list_where_active(&self) -> Result<Vec<Account>, AccountError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts WHERE active = TRUE"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(account_from_row).collect()
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<PageSlice<Account>, AccountError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        // Secondary sort on id keeps pages stable for rows created in the
        // same instant.
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM accounts ORDER BY created_at DESC, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(PageSlice {
            items: rows.iter().map(account_from_row).collect::<Result<_, _>>()?,
            total: total.max(0) as u64,
        })
    }

    async fn update(&self, account: Account) -> Result<Account, AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, password_hash = $3, active = $4, failed_attempts = $5,
                locked = $6, last_login_at = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.active)
        .bind(account.failed_attempts as i32)
        .bind(account.locked)
        .bind(account.last_login_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Self::translate_write_error(e, account.username.as_str(), account.email.as_str())
        })?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(account.id.to_string()));
        }

        Ok(account)
    }

    async fn delete_by_id(&self, id: &AccountId) -> Result<(), AccountError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
