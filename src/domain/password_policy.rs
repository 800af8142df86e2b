//! Password-strength policy - the credential validator.
//!
//! A pure rule set evaluated against a candidate password and the identity
//! attributes of the account it would protect. Every failing rule is
//! collected so a single response can report all violations at once.

use crate::config::{MIN_PASSWORD_LENGTH, PASSWORD_SIMILARITY_THRESHOLD};

/// Frequently used passwords rejected outright (compared case-insensitively).
const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "123456789", "1234567890", "qwerty", "qwerty123",
    "qwertyuiop", "abc123", "password1", "password123", "iloveyou", "letmein", "admin",
    "welcome", "welcome1", "monkey", "dragon", "sunshine", "princess", "football",
    "baseball", "superman", "batman", "trustno1", "master", "shadow", "michael",
    "jennifer", "computer", "pokemon", "starwars", "summer", "winter", "secret",
    "freedom", "whatever", "zaq12wsx", "qazwsx", "asdfgh", "zxcvbnm", "112233",
    "123123", "111111", "000000", "654321", "666666", "696969", "121212", "7777777",
    "abcdef", "hello123", "charlie", "donald", "mustang", "access", "flower",
    "passw0rd", "p@ssw0rd", "login", "hottie", "loveme", "ashley", "nicole",
];

/// Password-strength policy over length, common passwords, digit-only
/// candidates and similarity to account identity attributes.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    similarity_threshold: f64,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            similarity_threshold: PASSWORD_SIMILARITY_THRESHOLD,
        }
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize, similarity_threshold: f64) -> Self {
        Self {
            min_length,
            similarity_threshold,
        }
    }

    /// Validate a candidate password.
    ///
    /// `hints` pairs a human-readable attribute name with its value, e.g.
    /// `[("username", "jdoe"), ("email address", "jdoe@example.com")]`.
    /// Returns every violated rule, not just the first.
    pub fn validate(&self, candidate: &str, hints: &[(&str, &str)]) -> Result<(), Vec<String>> {
        let mut reasons = Vec::new();

        if candidate.chars().count() < self.min_length {
            reasons.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }

        let lowered = candidate.to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            reasons.push("This password is too common.".to_string());
        }

        if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit()) {
            reasons.push("This password is entirely numeric.".to_string());
        }

        for (attribute, value) in hints {
            if self.too_similar(&lowered, value) {
                reasons.push(format!("The password is too similar to the {}.", attribute));
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons)
        }
    }

    /// Compare against the whole attribute value and each of its
    /// separator-delimited parts (this covers the email local-part).
    fn too_similar(&self, candidate_lower: &str, value: &str) -> bool {
        if candidate_lower.is_empty() || value.is_empty() {
            return false;
        }
        let value_lower = value.to_lowercase();
        let parts = value_lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|p| !p.is_empty())
            .chain(std::iter::once(value_lower.as_str()));

        for part in parts {
            if similarity(candidate_lower, part) >= self.similarity_threshold {
                return true;
            }
        }
        false
    }
}

/// Normalized edit-distance ratio in `[0, 1]`; 1.0 means identical.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("username", "testuser"),
            ("email address", "testuser@example.com"),
        ]
    }

    #[test]
    fn test_strong_password_accepted() {
        let policy = PasswordPolicy::default();
        assert!(policy.validate("StrongP@ssw0rd123", &hints()).is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let policy = PasswordPolicy::default();
        let reasons = policy.validate("short", &hints()).unwrap_err();
        assert!(reasons
            .iter()
            .any(|r| r.contains("too short") && r.contains("8 characters")));
    }

    #[test]
    fn test_empty_password_rejected_as_too_short() {
        let policy = PasswordPolicy::default();
        let reasons = policy.validate("", &hints()).unwrap_err();
        assert!(reasons.iter().any(|r| r.contains("too short")));
        // Empty input must not trip the numeric or similarity rules
        assert_eq!(reasons.len(), 1);
    }

    #[test]
    fn test_common_password_rejected() {
        let policy = PasswordPolicy::default();
        let reasons = policy.validate("password", &hints()).unwrap_err();
        assert!(reasons.contains(&"This password is too common.".to_string()));
    }

    #[test]
    fn test_numeric_password_rejected() {
        let policy = PasswordPolicy::default();
        let reasons = policy.validate("983475029384", &hints()).unwrap_err();
        assert_eq!(
            reasons,
            vec!["This password is entirely numeric.".to_string()]
        );
    }

    #[test]
    fn test_password_equal_to_username_rejected() {
        let policy = PasswordPolicy::default();
        let reasons = policy.validate("testuser", &hints()).unwrap_err();
        assert!(reasons
            .contains(&"The password is too similar to the username.".to_string()));
    }

    #[test]
    fn test_password_similar_to_email_local_part_rejected() {
        let policy = PasswordPolicy::default();
        let reasons = policy
            .validate("NotAPwd1", &[("email address", "notapwd1@example.com")])
            .unwrap_err();
        assert!(reasons
            .contains(&"The password is too similar to the email address.".to_string()));
    }

    #[test]
    fn test_violations_accumulate() {
        let policy = PasswordPolicy::default();
        // Short AND common AND entirely numeric
        let reasons = policy.validate("123456", &hints()).unwrap_err();
        assert!(reasons.len() >= 3, "expected all rules reported: {reasons:?}");
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!(similarity("testuser1", "testuser") > 0.7);
        assert!(similarity("kittens", "sitting") > 0.5);
    }
}
