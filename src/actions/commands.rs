//! Workflow command formatting.

/// Escape a message for use as workflow command data.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Format an `::error::` annotation that marks the step as failed in the log.
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("plain"), "plain");
        assert_eq!(escape_data("100%"), "100%25");
        assert_eq!(escape_data("line1\nline2\r"), "line1%0Aline2%0D");
    }

    #[test]
    fn test_error_annotation() {
        let line = error_annotation("Proxy failed to start:\nexhausted");
        assert_eq!(line, "::error::Proxy failed to start:%0Aexhausted");
    }
}
