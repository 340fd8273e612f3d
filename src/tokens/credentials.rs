use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Authorization scheme expected on upload requests. The trailing space is
/// part of the marker: everything after it is the credential payload.
pub const BASIC_SCHEME: &str = "Basic ";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential payload is not valid base64 text")]
    Encoding,
    #[error("authorization header is missing")]
    Missing,
    #[error("authorization scheme must be Basic")]
    Scheme,
    #[error("credential payload must be identifier:secret")]
    Shape,
}

/// Split a `Basic` authorization header into the device identifier and
/// session secret it carries.
pub fn parse_basic(header: &str) -> Result<(String, String), CredentialError> {
    let payload = header
        .strip_prefix(BASIC_SCHEME)
        .ok_or(CredentialError::Scheme)?;
    let decoded = STANDARD.decode(payload).map_err(|_| CredentialError::Encoding)?;
    let text = String::from_utf8(decoded).map_err(|_| CredentialError::Encoding)?;

    let mut parts = text.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(identifier), Some(secret), None) => {
            Ok((identifier.to_string(), secret.to_string()))
        }
        _ => Err(CredentialError::Shape),
    }
}

/// Encode a freshly issued secret the way the connect response carries it.
pub fn issued_form(secret: &str) -> String {
    STANDARD.encode(secret)
}
