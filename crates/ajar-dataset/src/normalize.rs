/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(normalize_whitespace("single"), "single");
        assert_eq!(normalize_whitespace(" \r\n\t "), "");
    }
}
