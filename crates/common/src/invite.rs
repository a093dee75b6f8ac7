//! Group invite code generation

use rand::Rng;

/// Unambiguous alphabet: no 0/O, 1/I/L
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const CODE_LEN: usize = 6;

/// Generate a random 6-character invite code
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length() {
        assert_eq!(generate_invite_code().len(), CODE_LEN);
    }

    #[test]
    fn test_code_uses_unambiguous_alphabet() {
        for _ in 0..100 {
            let code = generate_invite_code();
            for c in code.chars() {
                assert!(
                    ALPHABET.contains(&(c as u8)),
                    "unexpected character {:?} in code {}",
                    c,
                    code
                );
                assert!(!"0O1IL".contains(c));
            }
        }
    }
}
