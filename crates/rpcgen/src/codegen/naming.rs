//! Language-neutral identifier helpers.
//!
//! Casing treats every non-alphanumeric character as a word boundary, so
//! characters of [`DISALLOWED_CHARS`] never reach an identifier. The
//! per-language `ident` modules add digit and keyword escaping on top.

use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Characters that may appear in schema names but never in identifiers.
pub const DISALLOWED_CHARS: &str = ".!@#$%^&*()-+=\\][{}'\";?";

/// Removes disallowed characters and anything else that cannot appear in an
/// identifier.
pub fn strip_disallowed(input: &str) -> String {
    input
        .chars()
        .filter(|c| !DISALLOWED_CHARS.contains(*c))
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

pub fn pascal_case(input: &str) -> String {
    strip_disallowed(&input.to_upper_camel_case())
}

pub fn snake_case(input: &str) -> String {
    strip_disallowed(&input.to_snake_case())
}

pub fn camel_case(input: &str) -> String {
    strip_disallowed(&input.to_lower_camel_case())
}

/// Prefixes identifiers that start with a digit, and turns an empty
/// identifier into the prefix alone.
pub fn escape_leading_digit(ident: String, prefix: &str) -> String {
    match ident.chars().next() {
        None => prefix.to_string(),
        Some(first) if first.is_ascii_digit() => format!("{}{}", prefix, ident),
        Some(_) => ident,
    }
}

/// Identifiers handed out within one scope (a struct, an enum, a service).
#[derive(Debug, Default)]
pub struct IdentScope {
    used: HashSet<String>,
}

impl IdentScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `ident`, appending `{separator}2`, `{separator}3`, ... when it
    /// is already taken.
    pub fn claim(&mut self, ident: String, separator: &str) -> String {
        if self.used.insert(ident.clone()) {
            return ident;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}{}", ident, separator, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casing() {
        assert_eq!(pascal_case("/User/home_address"), "UserHomeAddress");
        assert_eq!(pascal_case("/Shape/CIRCLE/[element]"), "ShapeCircleElement");
        assert_eq!(snake_case("userId"), "user_id");
        assert_eq!(camel_case("user_id"), "userId");
    }

    #[test]
    fn test_disallowed_characters_never_survive() {
        let names = [
            "a.b", "a!b", "a@b", "a#b", "a$b", "a%b", "a^b", "a&b", "a*b", "a(b)", "a-b", "a+b",
            "a=b", "a\\b", "a]b[", "a{b}", "a'b", "a\"b", "a;b", "a?b",
        ];
        for name in names {
            for ident in [pascal_case(name), snake_case(name), camel_case(name)] {
                assert!(
                    ident.chars().all(|c| !DISALLOWED_CHARS.contains(c)),
                    "{name} produced {ident}"
                );
            }
        }
    }

    #[test]
    fn test_escape_leading_digit() {
        assert_eq!(escape_leading_digit("1st".to_string(), "r_"), "r_1st");
        assert_eq!(escape_leading_digit(String::new(), "R_"), "R_");
        assert_eq!(escape_leading_digit("name".to_string(), "_"), "name");
    }

    #[test]
    fn test_scope_suffixes_collisions() {
        let mut scope = IdentScope::new();
        assert_eq!(scope.claim("user_id".to_string(), "_"), "user_id");
        assert_eq!(scope.claim("user_id".to_string(), "_"), "user_id_2");
        assert_eq!(scope.claim("user_id".to_string(), "_"), "user_id_3");
    }
}
