use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore as _};

pub fn random_token_id() -> String {
    random(16)
}

pub fn random(size: usize) -> String {
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(&bytes)
}

#[cfg(test)]
mod test {
    use super::random_token_id;

    #[test]
    fn random_token_ids_are_url_safe_and_distinct() {
        let first = random_token_id();
        let second = random_token_id();

        assert_ne!(first, second);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
