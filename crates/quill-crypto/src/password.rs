use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use rand::{Rng, RngCore};

/// Salt length bounds in bytes, both inclusive.
pub const MIN_SALT_LEN: usize = 16;
pub const MAX_SALT_LEN: usize = 32;

/// Draw a salt of random length in `MIN_SALT_LEN..=MAX_SALT_LEN`.
fn generate_salt() -> Result<SaltString> {
    let mut rng = rand::rng();
    let len = rng.random_range(MIN_SALT_LEN..=MAX_SALT_LEN);

    let mut bytes = [0u8; MAX_SALT_LEN];
    rng.fill_bytes(&mut bytes[..len]);

    SaltString::encode_b64(&bytes[..len]).map_err(|e| anyhow!("Salt encoding failed: {}", e))
}

/// Hash a password with Argon2id. Returns the PHC string to store.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = generate_salt()?;
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored hash. Unparsable hashes never match.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok()
}
