//! Session-scoped identifier generation
//!
//! Every addressable entity (question, choice, statement, media item) gets a
//! short opaque token. Tokens only need to be unique within one authoring
//! session; they are not cryptographically secure and carry no cross-session
//! guarantee.

use rand::Rng;

const ID_LEN: usize = 9;
const ID_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a 9-character base36 identifier.
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_CHARS[rng.random_range(0..ID_CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_nine_base36_chars() {
        for _ in 0..100 {
            let id = generate_id();
            assert_eq!(id.len(), 9);
            assert!(id.bytes().all(|b| ID_CHARS.contains(&b)));
        }
    }

    #[test]
    fn ids_do_not_collide_within_a_session() {
        // 36^9 possible tokens; 10k draws colliding would indicate a broken RNG.
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
