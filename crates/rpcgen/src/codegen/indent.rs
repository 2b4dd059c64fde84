//! Indentation helpers for generated source.

/// Indents every non-empty line by `width` spaces.
pub fn block(code: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    code.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indents every line but the first, for splicing a multi-line snippet
/// after text that is already indented.
pub fn tail(code: &str, width: usize) -> String {
    match code.split_once('\n') {
        Some((first, rest)) => format!("{}\n{}", first, block(rest, width)),
        None => code.to_string(),
    }
}
