use rand::Rng;

/// Generate a secure random session secret (32 bytes, hex encoded = 64 characters)
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
