use chrono::{Datelike, Utc};
use rand::{Rng, distr::Alphanumeric};

/// Generates a random upper-case alphanumeric string of the given length.
pub fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect::<String>()
}

/// Record numbers handed out when an admin does not supply one,
/// e.g. `STU-2026-4KQ9ZD`.
pub fn generate_record_number(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().year(),
        generate_random_string(6)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_numbers_have_prefix_year_and_suffix() {
        let number = generate_record_number("STU");
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "STU");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn random_strings_differ() {
        assert_ne!(generate_random_string(16), generate_random_string(16));
    }
}
