//! Shared clause normalization.

/// Lowercase, collapse runs of whitespace, and drop trailing `.`/`!`.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed.trim_end_matches(['.', '!']).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  If I   feel\tSad!! "), "if i feel sad");
        assert_eq!(normalize("block 30 mins."), "block 30 mins");
        assert_eq!(normalize(""), "");
    }
}
