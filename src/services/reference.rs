use rand::Rng;

pub const REFERENCE_PREFIX: &str = "MMDT";
pub const SUFFIX_LEN: usize = 6;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A human-shareable booking code: fixed prefix plus an upper-case base-36
/// suffix. Uniqueness is not checked against stored bookings.
pub fn generate_reference_code() -> String {
    generate_with(&mut rand::thread_rng())
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{REFERENCE_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_shape() {
        let code = generate_reference_code();
        assert_eq!(code.len(), REFERENCE_PREFIX.len() + SUFFIX_LEN);
        assert!(code.starts_with(REFERENCE_PREFIX));
        assert!(code[REFERENCE_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = generate_with(&mut StdRng::seed_from_u64(7));
        let b = generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_collisions_at_test_volume() {
        let codes: HashSet<String> = (0..200).map(|_| generate_reference_code()).collect();
        assert_eq!(codes.len(), 200);
    }
}
