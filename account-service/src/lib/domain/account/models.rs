use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::UsernameError;

/// Account aggregate entity.
///
/// Identity and authentication state for one registered user.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    /// False means logically deleted: excluded from active listings but the
    /// record persists and keeps occupying the username/email namespace.
    pub active: bool,
    pub failed_attempts: u32,
    pub locked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Consecutive failed logins after which the account locks.
    pub const MAX_FAILED_ATTEMPTS: u32 = 3;

    /// Count a failed login attempt, locking the account once the counter
    /// reaches [`Self::MAX_FAILED_ATTEMPTS`].
    pub fn register_failed_attempt(&mut self) {
        self.failed_attempts += 1;
        if self.failed_attempts >= Self::MAX_FAILED_ATTEMPTS {
            self.locked = true;
        }
    }

    /// Record a successful authentication: stamps `last_login_at` and resets
    /// the failed-attempt counter.
    pub fn record_successful_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.reset_failed_attempts();
    }

    /// Zero the failed-attempt counter and clear the lock. This is the only
    /// way out of the locked state.
    pub fn reset_failed_attempts(&mut self) {
        self.failed_attempts = 0;
        self.locked = false;
    }

    /// Logical deletion.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Restore a logically deleted account.
    pub fn activate(&mut self) {
        self.active = true;
    }
}

/// Account fields as prepared by the service before the store has assigned
/// an identifier. The store turns this into an [`Account`] on insert.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub active: bool,
    pub failed_attempts: u32,
    pub locked: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewAccount {
    /// Attach the store-assigned identifier.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            active: self.active,
            failed_attempts: self.failed_attempts,
            locked: self.locked,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    ///
    /// # Returns
    /// AccountId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed AccountId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric,
/// underscore, and hyphen. Matching is case-sensitive throughout: `Alice`
/// and `alice` are distinct usernames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// Validates length and character constraints.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Returns
    /// Validated Username value object
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.len();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    /// Get username as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        use std::str::FromStr;

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a new account with validated fields.
#[derive(Debug)]
pub struct CreateAccountCommand {
    pub username: Username,
    pub email: EmailAddress,
    /// Plain text password; hashed by the service before it reaches storage.
    pub password: String,
}

impl CreateAccountCommand {
    pub fn new(username: Username, email: EmailAddress, password: String) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Command to update an existing account.
///
/// Both fields are optional to support partial updates; the username is
/// immutable and has no update path. A `Some("")` password is treated as
/// absent, so callers piping raw input through do not accidentally clear a
/// credential.
#[derive(Debug, Default)]
pub struct UpdateAccountCommand {
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
}

/// One page of results as returned by the service.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// Raw page slice as returned by the store: the requested window plus the
/// overall record count.
#[derive(Debug, Clone)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub total: u64,
}
