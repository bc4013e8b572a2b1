/// Quill credential helpers.
///
/// Passwords are stored as argon2id PHC strings. Each hash gets a fresh
/// random salt whose length is itself random, so two users with the same
/// password never share a hash or even a hash length.
pub mod password;

pub use password::{hash_password, verify_password};
