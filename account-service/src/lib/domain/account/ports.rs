use async_trait::async_trait;

use crate::domain::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::CreateAccountCommand;
use crate::domain::account::models::NewAccount;
use crate::domain::account::models::Page;
use crate::domain::account::models::PageSlice;
use crate::domain::account::models::UpdateAccountCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Create a new account with validated credentials.
    ///
    /// The password is hashed before anything reaches storage; the created
    /// account starts active, unlocked, with a zero failed-attempt counter.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created account entity
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken (active or inactive holder)
    /// * `DuplicateEmail` - Email is already registered
    /// * `Password` - Password rejected by the hasher (empty/oversized)
    /// * `StorageFailure` - Store operation failed
    async fn create_account(&self, command: CreateAccountCommand) -> Result<Account, AccountError>;

    /// Retrieve an account by unique identifier.
    ///
    /// Pure lookup with no side effects; includes inactive accounts.
    ///
    /// # Returns
    /// The account, or `None` if the id is unknown
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve an account by unique username (exact, case-sensitive match).
    ///
    /// Pure lookup with no side effects; includes inactive accounts.
    ///
    /// # Returns
    /// The account, or `None` if the username is unknown
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AccountError>;

    /// List all active accounts, in store order.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn list_active(&self) -> Result<Vec<Account>, AccountError>;

    /// List all active accounts ordered by creation time, newest first.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn list_active_newest_first(&self) -> Result<Vec<Account>, AccountError>;

    /// Retrieve one page of all accounts (active and inactive).
    ///
    /// # Arguments
    /// * `page_index` - Zero-based page number
    /// * `page_size` - Page length; the contract requires `page_size >= 1`
    ///   (raw caller input is validated by the presentation layer)
    ///
    /// # Returns
    /// The requested page plus total element and page counts
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn list_paginated(
        &self,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page<Account>, AccountError>;

    /// Update email and/or password of an existing account.
    ///
    /// The email field is a no-op when absent or unchanged; the password is
    /// rehashed only when present and non-empty.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DuplicateEmail` - New email differs from the current one and is taken
    /// * `StorageFailure` - Store operation failed
    async fn update_email_and_password(
        &self,
        id: &AccountId,
        command: UpdateAccountCommand,
    ) -> Result<Account, AccountError>;

    /// Logically delete an account.
    ///
    /// The record persists and keeps its username/email reserved; it can no
    /// longer authenticate. Idempotent.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StorageFailure` - Store operation failed
    async fn deactivate(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Restore a logically deleted account. Idempotent.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StorageFailure` - Store operation failed
    async fn activate(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Permanently remove an account from storage.
    ///
    /// Irreversible. Callers are expected to confirm with the operator first;
    /// the service does not.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StorageFailure` - Store operation failed
    async fn delete_hard(&self, id: &AccountId) -> Result<(), AccountError>;

    /// Authenticate with full lockout accounting. Use this for interactive
    /// login.
    ///
    /// The only operation that mutates `failed_attempts` and `locked`: a
    /// wrong password increments the counter (locking at the threshold), a
    /// correct one resets it and stamps `last_login_at`. Locked or inactive
    /// accounts are rejected before the password is checked, without any
    /// field changing. All failures look alike to the caller (`Ok(None)`);
    /// lock state is not leaked.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn login_with_lockout(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError>;

    /// Check credentials without lockout accounting. Use this for one-off
    /// verification where lockout side effects are unwanted.
    ///
    /// Checks active status and password validity and stamps `last_login_at`
    /// on success, but never touches `failed_attempts` or `locked` in either
    /// direction: it neither counts failures nor consults the lock.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError>;

    /// Replace an account's password after proving knowledge of the current
    /// one.
    ///
    /// Allowed on locked accounts, since verifying the current password is
    /// itself proof of identity. Does not clear `locked` or `failed_attempts`;
    /// [`reset_failed_attempts`](Self::reset_failed_attempts) is the unlock
    /// path.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `InvalidCredentials` - Current password does not verify
    /// * `Password` - New password rejected by the hasher (empty/oversized)
    /// * `StorageFailure` - Store operation failed
    async fn change_password(
        &self,
        id: &AccountId,
        current_password: &str,
        new_password: &str,
    ) -> Result<Account, AccountError>;

    /// Operator reset: zero the failed-attempt counter and clear the lock.
    ///
    /// The only transition out of the locked state.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StorageFailure` - Store operation failed
    async fn reset_failed_attempts(&self, id: &AccountId) -> Result<Account, AccountError>;
}

/// Persistence boundary for account records.
///
/// The store is the authority for username/email uniqueness: adapters back
/// these rules with unique constraints and report violations as
/// `DuplicateUsername`/`DuplicateEmail`, closing the service's
/// check-then-insert window.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new account, assigning its identifier.
    ///
    /// # Returns
    /// The stored account with its assigned id
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `StorageFailure` - Store operation failed
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError>;

    /// Retrieve an account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve an account by exact username.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError>;

    /// Retrieve an account by exact email address.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Check whether a username is taken.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn exists_by_username(&self, username: &str) -> Result<bool, AccountError>;

    /// Check whether an email address is registered.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError>;

    /// Retrieve all accounts with `active == true`.
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn list_where_active(&self) -> Result<Vec<Account>, AccountError>;

    /// Retrieve a window over all accounts plus the overall record count.
    ///
    /// # Arguments
    /// * `offset` - Records to skip
    /// * `limit` - Maximum records to return
    ///
    /// # Errors
    /// * `StorageFailure` - Store operation failed
    async fn list_page(&self, offset: u64, limit: u64) -> Result<PageSlice<Account>, AccountError>;

    /// Write back an existing account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DuplicateEmail` - Updated email is already registered
    /// * `StorageFailure` - Store operation failed
    async fn update(&self, account: Account) -> Result<Account, AccountError>;

    /// Remove an account from storage.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `StorageFailure` - Store operation failed
    async fn delete_by_id(&self, id: &AccountId) -> Result<(), AccountError>;
}
