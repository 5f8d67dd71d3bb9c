/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: Signed, time-limited session tokens carried in a cookie
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::session::{create_token, validate_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Session token for user 42, valid for one hour
/// let claims = Claims::new(42, Duration::hours(1));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long")?;
/// assert_eq!(validated.sub, 42);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;

/// Name of the cookie that carries the session token
pub const SESSION_COOKIE: &str = "jwt";
