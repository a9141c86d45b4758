use uuid::Uuid;

/// Human-facing booking code, distinct from the row id: `WST-` plus eight
/// uppercase hex characters of v4 entropy. The store enforces uniqueness.
pub fn generate() -> String {
    let entropy = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("WST-{}", &entropy[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_the_expected_shape() {
        let code = generate();
        assert!(code.starts_with("WST-"));
        assert_eq!(code.len(), 12);
        assert!(code[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn codes_do_not_repeat_in_practice() {
        let codes: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(codes.len(), 1000);
    }
}
