use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Provides cryptographic password hashing (internally uses Argon2id). The
/// default parameter set is the crate's production-strength default; test
/// suites that hash many passwords should construct a cheap instance via
/// [`PasswordHasher::with_params`].
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Longest secret accepted by [`hash`](Self::hash), in bytes.
    pub const MAX_SECRET_LEN: usize = 1024;

    /// Create a password hasher with production-strength parameters.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a password hasher with explicit cost parameters.
    ///
    /// Intended for tests, where the default work factor would dominate the
    /// suite's runtime. Production code should use [`PasswordHasher::new`].
    ///
    /// # Arguments
    /// * `m_cost` - Memory cost in KiB
    /// * `t_cost` - Number of iterations
    /// * `p_cost` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParams` - Parameter combination rejected by Argon2
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password securely.
    ///
    /// Uses Argon2id with random salt generation, so hashing the same secret
    /// twice yields different strings; both verify.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `InvalidInput` - Password is empty or longer than `MAX_SECRET_LEN` bytes
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        if password.len() > Self::MAX_SECRET_LEN {
            return Err(PasswordError::InvalidInput(format!(
                "password exceeds {} bytes",
                Self::MAX_SECRET_LEN
            )));
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails: a malformed stored hash verifies as `false`, the same as
    /// any mismatch. The underlying Argon2 comparison is constant-time.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).expect("valid test params")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        // Verify correct password
        assert!(hasher.verify(password, &hash));

        // Verify incorrect password
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = cheap_hasher();

        let first = hasher.hash("same_password").expect("Failed to hash");
        let second = hasher.hash("same_password").expect("Failed to hash");

        assert_ne!(first, second);
        assert!(hasher.verify("same_password", &first));
        assert!(hasher.verify("same_password", &second));
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_hash_rejects_empty_password() {
        let hasher = cheap_hasher();
        let result = hasher.hash("");
        assert!(matches!(result, Err(PasswordError::InvalidInput(_))));
    }

    #[test]
    fn test_hash_rejects_oversized_password() {
        let hasher = cheap_hasher();
        let oversized = "x".repeat(PasswordHasher::MAX_SECRET_LEN + 1);
        let result = hasher.hash(&oversized);
        assert!(matches!(result, Err(PasswordError::InvalidInput(_))));
    }

    #[test]
    fn test_with_params_rejects_invalid_costs() {
        assert!(PasswordHasher::with_params(0, 0, 0).is_err());
    }

    #[test]
    fn test_default_hasher_output_format() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("pw").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));
    }
}
