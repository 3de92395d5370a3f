use base64::{engine::general_purpose, Engine};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AppError;

const TOKEN_BYTES: usize = 32;

// Opaque login token: 32 random bytes, URL-safe base64 without padding.
pub fn generate_session_id() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::SessionToken)?;

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
