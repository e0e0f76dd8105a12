use fernet::Fernet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("invalid decryption key")]
    InvalidKey,
    #[error("ciphertext could not be decrypted")]
    BadCiphertext,
    #[error("decrypted value is not valid UTF-8")]
    NotUtf8,
}

/// Fernet symmetric decryption, the scheme the credentials were encrypted
/// with before being stored in the sheet. A failure here means corrupt data
/// or the wrong key, never a transient condition.
pub fn decrypt(ciphertext: &str, key: &str) -> Result<String, DecryptError> {
    let cipher = Fernet::new(key).ok_or(DecryptError::InvalidKey)?;
    let plain = cipher
        .decrypt(ciphertext)
        .map_err(|_| DecryptError::BadCiphertext)?;
    String::from_utf8(plain).map_err(|_| DecryptError::NotUtf8)
}
