use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::Page;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::account::ports::CredentialStore;

/// Per-account mutual exclusion for mutating operations.
///
/// Two concurrent failed logins must not both read `failed_attempts == 2`
/// and both write 3; every read-modify-write flow takes the account's lock
/// and re-reads the record inside it. Guards are per account id, so the
/// expensive password check never blocks operations on other accounts.
#[derive(Default)]
struct AccountLocks {
    inner: Mutex<HashMap<AccountId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    fn for_account(&self, id: &AccountId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(*id).or_default())
    }
}

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    password_hasher: Arc<PasswordHasher>,
    locks: AccountLocks,
}

impl<S> AccountService<S>
where
    S: CredentialStore,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Account persistence implementation
    /// * `password_hasher` - Process-wide hasher instance
    ///
    /// # Returns
    /// Configured account service instance
    pub fn new(store: Arc<S>, password_hasher: Arc<PasswordHasher>) -> Self {
        Self {
            store,
            password_hasher,
            locks: AccountLocks::default(),
        }
    }

    async fn find_required(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<S> AccountServicePort for AccountService<S>
where
    S: CredentialStore,
{
    async fn create_account(&self, command: CreateAccountCommand) -> Result<Account, AccountError> {
        tracing::info!(username = %command.username, "Creating account");

        // Best-effort pre-checks for friendly errors; the store's unique
        // constraints remain the authoritative guard against races.
        if self.store.exists_by_username(command.username.as_str()).await? {
            return Err(AccountError::DuplicateUsername(
                command.username.to_string(),
            ));
        }
        if self.store.exists_by_email(command.email.as_str()).await? {
            return Err(AccountError::DuplicateEmail(
                command.email.as_str().to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&command.password)?;

        let now = Utc::now();
        let account = self
            .store
            .insert(NewAccount {
                username: command.username,
                email: command.email,
                password_hash,
                active: true,
                failed_attempts: 0,
                locked: false,
                last_login_at: None,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(id = %account.id, "Account created");
        Ok(account)
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        tracing::debug!(id = %id, "Looking up account by id");
        self.store.find_by_id(id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        tracing::debug!(username, "Looking up account by username");
        self.store.find_by_username(username).await
    }

    async fn list_active(&self) -> Result<Vec<Account>, AccountError> {
        self.store.list_where_active().await
    }

    async fn list_active_newest_first(&self) -> Result<Vec<Account>, AccountError> {
        let mut accounts = self.store.list_where_active().await?;
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn list_paginated(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<Account>, AccountError> {
        let page_size = u64::from(page_size.max(1));
        let offset = u64::from(page_index) * page_size;

        let slice = self.store.list_page(offset, page_size).await?;

        Ok(Page {
            items: slice.items,
            total_elements: slice.total,
            total_pages: slice.total.div_ceil(page_size),
        })
    }

    async fn update_email_and_password(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError> {
        tracing::info!(id = %id, "Updating account");

        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        let mut account = self.find_required(id).await?;

        if let Some(new_email) = command.email {
            if new_email != account.email {
                if self.store.exists_by_email(new_email.as_str()).await? {
                    return Err(AccountError::DuplicateEmail(
                        new_email.as_str().to_string(),
                    ));
                }
                tracing::debug!(id = %id, "Email updated");
                account.email = new_email;
            }
        }

        if let Some(new_password) = command.password {
            if !new_password.is_empty() {
                account.password_hash = self.password_hasher.hash(&new_password)?;
                tracing::debug!(username = %account.username, "Password updated");
            }
        }

        account.updated_at = Utc::now();
        self.store.update(account).await
    }

    async fn deactivate(&self, id: &AccountId) -> Result<Account, AccountError> {
        tracing::info!(id = %id, "Deactivating account (logical delete)");

        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        let mut account = self.find_required(id).await?;
        account.deactivate();
        account.updated_at = Utc::now();
        self.store.update(account).await
    }

    async fn activate(&self, id: &AccountId) -> Result<Account, AccountError> {
        tracing::info!(id = %id, "Reactivating account");

        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        let mut account = self.find_required(id).await?;
        account.activate();
        account.updated_at = Utc::now();
        self.store.update(account).await
    }

    async fn delete_hard(&self, id: &AccountId) -> Result<(), AccountError> {
        tracing::warn!(id = %id, "Deleting account (physical delete)");

        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        self.store.delete_by_id(id).await?;
        tracing::info!(id = %id, "Account permanently deleted");
        Ok(())
    }

    async fn login_with_lockout(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let Some(found) = self.store.find_by_username(username).await? else {
            tracing::warn!(username, "Login attempt for unknown username");
            return Ok(None);
        };

        let lock = self.locks.for_account(&found.id);
        let _guard = lock.lock().await;

        // Re-read inside the lock; the lookup above may be stale by now.
        let Some(mut account) = self.store.find_by_id(&found.id).await? else {
            return Ok(None);
        };

        // Locked and inactive accounts are rejected before the password is
        // checked; the counter must not move again once the lock is in place.
        if !account.active || account.locked {
            tracing::warn!(username, "Login attempt for locked or deactivated account");
            return Ok(None);
        }

        if self
            .password_hasher
            .verify(password, &account.password_hash)
        {
            let now = Utc::now();
            account.record_successful_login(now);
            account.updated_at = now;
            let account = self.store.update(account).await?;
            tracing::info!(username, "Login successful");
            return Ok(Some(account));
        }

        account.register_failed_attempt();
        account.updated_at = Utc::now();
        let account = self.store.update(account).await?;

        if account.locked {
            tracing::warn!(
                username,
                attempts = account.failed_attempts,
                "Account locked after repeated failed logins"
            );
        } else {
            tracing::warn!(
                username,
                attempts = account.failed_attempts,
                "Failed login attempt"
            );
        }

        Ok(None)
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        tracing::debug!(username, "Verifying credentials");

        let Some(found) = self.store.find_by_username(username).await? else {
            tracing::warn!(username, "Credential check for unknown username");
            return Ok(None);
        };

        if !found.active {
            tracing::warn!(username, "Credential check for deactivated account");
            return Ok(None);
        }

        if !self
            .password_hasher
            .verify(password, &found.password_hash)
        {
            tracing::warn!(username, "Wrong password for account");
            return Ok(None);
        }

        let lock = self.locks.for_account(&found.id);
        let _guard = lock.lock().await;

        let Some(mut account) = self.store.find_by_id(&found.id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        account.last_login_at = Some(now);
        account.updated_at = now;
        let account = self.store.update(account).await?;

        tracing::info!(username, "Credentials verified");
        Ok(Some(account))
    }

    async fn change_password(
        &self,
        id: &AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<Account, AccountError> {
        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        let mut account = self.find_required(id).await?;

        if !self
            .password_hasher
            .verify(current_password, &account.password_hash)
        {
            tracing::warn!(username = %account.username, "Password change with wrong current password");
            return Err(AccountError::InvalidCredentials);
        }

        // Lock and attempt counters stay as they are; reset_failed_attempts
        // is the unlock path.
        account.password_hash = self.password_hasher.hash(new_password)?;
        account.updated_at = Utc::now();
        let account = self.store.update(account).await?;

        tracing::info!(username = %account.username, "Password changed");
        Ok(account)
    }

    async fn reset_failed_attempts(&self, id: &AccountId) -> Result<Account, AccountError> {
        let lock = self.locks.for_account(id);
        let _guard = lock.lock().await;

        let mut account = self.find_required(id).await?;
        account.reset_failed_attempts();
        account.updated_at = Utc::now();
        let account = self.store.update(account).await?;

        tracing::info!(username = %account.username, "Failed-attempt counter reset, account unlocked");
        Ok(account)
    }
}
