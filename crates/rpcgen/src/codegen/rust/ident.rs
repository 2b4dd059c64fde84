//! Rust identifiers.

use crate::codegen::naming::{escape_leading_digit, pascal_case, snake_case};

/// Strict and reserved keywords of the 2021 edition.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NOT_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

fn escape_keyword(ident: String) -> String {
    if NOT_RAW.contains(&ident.as_str()) {
        return format!("{}_", ident);
    }
    if KEYWORDS.contains(&ident.as_str()) {
        return format!("r#{}", ident);
    }
    ident
}

/// A struct field, local binding or method name.
pub fn field_identifier(name: &str) -> String {
    escape_keyword(escape_leading_digit(snake_case(name), "r_"))
}

/// A struct, enum or variant name.
pub fn type_identifier(name: &str) -> String {
    escape_keyword(escape_leading_digit(pascal_case(name), "R_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_identifiers() {
        assert_eq!(field_identifier("userId"), "user_id");
        assert_eq!(field_identifier("type"), "r#type");
        assert_eq!(field_identifier("self"), "self_");
        assert_eq!(field_identifier("1stPlace"), "r_1st_place");
        assert_eq!(field_identifier("user-name!"), "user_name");
        assert_eq!(field_identifier(""), "r_");
        assert_eq!(field_identifier("???"), "r_");
    }

    #[test]
    fn test_type_identifiers() {
        assert_eq!(type_identifier("user_settings"), "UserSettings");
        assert_eq!(type_identifier("self"), "Self_");
        assert_eq!(type_identifier("2fa"), "R_2fa");
        assert_eq!(type_identifier(""), "R_");
    }

    #[test]
    fn test_deterministic() {
        for name in ["a.b.c", "match", "Über", "x{y}"] {
            assert_eq!(field_identifier(name), field_identifier(name));
            assert_eq!(type_identifier(name), type_identifier(name));
        }
    }
}
