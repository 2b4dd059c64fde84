//! TypeScript identifiers.

use crate::codegen::naming::{camel_case, escape_leading_digit, pascal_case};

const RESERVED: &[&str] = &[
    "any", "as", "async", "await", "boolean", "break", "case", "catch", "class", "const",
    "constructor", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum",
    "export", "extends", "false", "finally", "for", "from", "function", "get", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "module", "new", "null",
    "number", "of", "package", "private", "protected", "public", "require", "return", "set",
    "static", "string", "super", "switch", "symbol", "this", "throw", "true", "try", "type",
    "typeof", "var", "void", "while", "with", "yield",
];

fn escape_reserved(ident: String) -> String {
    if RESERVED.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// A property or method name.
pub fn field_identifier(name: &str) -> String {
    escape_reserved(escape_leading_digit(camel_case(name), "_"))
}

/// An interface, type or class name.
pub fn type_identifier(name: &str) -> String {
    escape_reserved(escape_leading_digit(pascal_case(name), "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_identifiers() {
        assert_eq!(field_identifier("user_id"), "userId");
        assert_eq!(field_identifier("class"), "class_");
        assert_eq!(field_identifier("constructor"), "constructor_");
        assert_eq!(field_identifier("3d"), "_3d");
        assert_eq!(field_identifier(""), "_");
    }

    #[test]
    fn test_type_identifiers() {
        assert_eq!(type_identifier("user-settings"), "UserSettings");
        assert_eq!(type_identifier("1Password"), "_1password");
        assert_eq!(type_identifier("2fa-code"), "_2faCode");
    }
}
