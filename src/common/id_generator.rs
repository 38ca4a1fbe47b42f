// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! User ids look like `U_K7NP3XY2QM`. The alphabet leaves out I, L, O and U
//! so ids survive being read aloud or retyped.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

const USER_ID_LENGTH: usize = 10;
const STATE_NONCE_LENGTH: usize = 32;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..32)] as char)
        .collect()
}

pub fn generate_id(prefix: EntityPrefix, length: usize) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(length))
}

/// Generate a User ID (U_XXXXXXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User, USER_ID_LENGTH)
}

/// Random value carried through an OAuth round trip as `state`
pub fn generate_state_nonce() -> String {
    generate_crockford_string(STATE_NONCE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_user_id_format() {
        let id = generate_user_id();
        assert!(id.starts_with("U_"));
        assert_eq!(id.len(), 2 + USER_ID_LENGTH);
        assert!(id[2..]
            .bytes()
            .all(|c| CROCKFORD_ALPHABET.contains(&c)));
    }

    #[test]
    fn test_state_nonce_has_no_ambiguous_characters() {
        let nonce = generate_state_nonce();
        assert_eq!(nonce.len(), STATE_NONCE_LENGTH);
        for c in ['I', 'L', 'O', 'U'] {
            assert!(!nonce.contains(c));
        }
    }

    #[test]
    fn test_user_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_user_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
