use rand::{Rng, distributions::Alphanumeric};

/// Generates a random alphanumeric password of `length` characters, drawn
/// from A-Z, a-z and 0-9 with the thread-local CSPRNG.
pub fn generate_password(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_requested_length_and_charset() {
        let password = generate_password(16);
        assert_eq!(password.len(), 16);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
