use uuid::Uuid;

/// Length of keys produced by [`generate_secret_key`].
pub const SECRET_KEY_LEN: usize = 64;

/// Random 64 character lowercase hex key, suitable for `SECRET_KEY`.
pub fn generate_secret_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
