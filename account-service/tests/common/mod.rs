use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::account::errors::AccountError;
use account_service::domain::account::models::Account;
use account_service::domain::account::models::AccountId;
use account_service::domain::account::models::CreateAccountCommand;
use account_service::domain::account::models::EmailAddress;
use account_service::domain::account::models::NewAccount;
use account_service::domain::account::models::PageSlice;
use account_service::domain::account::models::Username;
use account_service::domain::account::ports::AccountServicePort;
use account_service::domain::account::ports::CredentialStore;
use account_service::domain::account::service::AccountService;
use async_trait::async_trait;
use auth::PasswordHasher;

/// In-memory account store for integration tests.
///
/// Enforces the same uniqueness rules as the real store (exact,
/// case-sensitive matches on username and email), so the service's
/// check-then-insert flow is exercised against an authoritative guard.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(AccountError::DuplicateUsername(
                account.username.to_string(),
            ));
        }
        if accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Err(AccountError::DuplicateEmail(
                account.email.as_str().to_string(),
            ));
        }

        let account = account.into_account(AccountId::new());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|account| account.username.as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .find(|account| account.email.as_str() == email)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AccountError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AccountError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn list_where_active(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .values()
            .filter(|account| account.active)
            .cloned()
            .collect())
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<PageSlice<Account>, AccountError> {
        let accounts = self.accounts.lock().unwrap();

        let mut all: Vec<Account> = accounts.values().cloned().collect();
        // Same ordering as the production adapter: newest first, id as
        // tiebreaker for rows created in the same instant.
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });

        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(PageSlice { items, total })
    }

    async fn update(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        if !accounts.contains_key(&account.id) {
            return Err(AccountError::NotFound(account.id.to_string()));
        }
        if accounts
            .values()
            .any(|existing| existing.id != account.id && existing.email == account.email)
        {
            return Err(AccountError::DuplicateEmail(
                account.email.as_str().to_string(),
            ));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_by_id(&self, id: &AccountId) -> Result<(), AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AccountError::NotFound(id.to_string()))
    }
}

/// Service wired to an in-memory store and a cheap test hasher.
pub fn test_service() -> Arc<AccountService<InMemoryCredentialStore>> {
    let hasher = Arc::new(PasswordHasher::with_params(1024, 1, 1).expect("valid test params"));
    Arc::new(AccountService::new(
        Arc::new(InMemoryCredentialStore::default()),
        hasher,
    ))
}

pub async fn create_account(
    service: &impl AccountServicePort,
    username: &str,
    email: &str,
    password: &str,
) -> Account {
    service
        .create_account(CreateAccountCommand::new(
            Username::new(username.to_string()).expect("valid username"),
            EmailAddress::new(email.to_string()).expect("valid email"),
            password.to_string(),
        ))
        .await
        .expect("account creation failed")
}
