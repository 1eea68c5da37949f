//! Per-claim salt generation
//!
//! Each claim gets its own random salt mixed into its hash input, so a
//! verifier holding a disclosed credential cannot brute-force hidden
//! low-entropy claim values (gender, yes/no flags) from their hashes.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;

/// Length of a generated salt string
pub const SALT_LENGTH: usize = 5;

/// The salt value that marks a claim as hidden rather than salted.
///
/// A disclosed variant of a credential stores the per-claim hash in place
/// of a hidden claim's value and this marker in place of its salt.
pub const HIDDEN_SALT: &str = "0";

/// Generate a single random alphanumeric salt
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate a fresh salt for every key in a claim key set
pub fn generate_salts<'a, I>(keys: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .map(|k| (k.to_string(), generate_salt()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_length_and_charset() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_salts_cover_key_set() {
        let salts = generate_salts(["name", "gender"]);
        assert_eq!(salts.len(), 2);
        assert!(salts.contains_key("name"));
        assert!(salts.contains_key("gender"));
        assert_ne!(salts["name"], HIDDEN_SALT);
    }
}
