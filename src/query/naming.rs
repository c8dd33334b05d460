//! Identifier casing

use convert_case::{Boundary, Case, Casing};

// Digits stay attached to the word before them; only an uppercase letter
// starts a new word
const DIGIT_BOUNDARIES: [Boundary; 3] = [
    Boundary::LowerDigit,
    Boundary::UpperDigit,
    Boundary::DigitLower,
];

/// Convert a field or column name to snake_case (`userName` -> `user_name`)
pub fn snake_case(ident: &str) -> String {
    ident.remove_boundaries(&DIGIT_BOUNDARIES).to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("userName"), "user_name");
        assert_eq!(snake_case("CreatedAt"), "created_at");
        assert_eq!(snake_case("status"), "status");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_snake_case_keeps_digits_attached() {
        assert_eq!(snake_case("line1"), "line1");
        assert_eq!(snake_case("address1"), "address1");
        assert_eq!(snake_case("v2"), "v2");
        assert_eq!(snake_case("address_2"), "address_2");
        assert_eq!(snake_case("line1Name"), "line1_name");
    }
}
