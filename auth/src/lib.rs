//! Authentication utilities library
//!
//! Provides reusable password-hashing infrastructure (Argon2id) for services
//! that store user credentials. Services define their own authentication
//! traits and adapt this implementation; the library carries no domain logic.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("wrong_password", &hash));
//! ```
//!
//! ## Cheap parameters for test suites
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
//! let hash = hasher.hash("pw").unwrap();
//! assert!(hasher.verify("pw", &hash));
//! ```

pub mod password;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
