//! Pulls the JSON object out of raw completion text.
//!
//! Providers with constrained decoding return bare JSON, but others wrap it
//! in markdown fences or surround it with prose.

use serde_json::Value;

use super::output_schema::SchemaValidationError;

/// Maximum accepted completion length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Extracts a JSON object from completion text.
#[derive(Debug, Clone, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts and parses the first JSON object in `response`.
    ///
    /// # Steps
    /// 1. Reject oversized responses
    /// 2. Prefer a fenced code block
    /// 3. Then the whole text as JSON
    /// 4. Otherwise the first balanced `{...}` span
    pub fn extract(&self, response: &str) -> Result<Value, SchemaValidationError> {
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(unparseable(format!(
                "response is {} bytes, maximum is {}",
                response.len(),
                MAX_RESPONSE_LENGTH
            )));
        }

        let trimmed = response.trim();
        if trimmed.is_empty() {
            return Err(unparseable("response was empty"));
        }

        if let Some(block) = self.extract_from_code_block(trimmed) {
            return parse_object(block);
        }
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return require_object(value);
        }

        let candidate = self
            .extract_balanced_object(trimmed)
            .ok_or_else(|| unparseable("no JSON object found"))?;
        parse_object(candidate)
    }

    fn extract_from_code_block<'a>(&self, s: &'a str) -> Option<&'a str> {
        let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

        for pattern in patterns {
            if let Some(start) = s.find(pattern) {
                let body_start = start + pattern.len();
                if let Some(end) = s[body_start..].find("```") {
                    return Some(s[body_start..body_start + end].trim());
                }
            }
        }
        None
    }

    fn extract_balanced_object<'a>(&self, s: &'a str) -> Option<&'a str> {
        let start = s.find('{')?;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;

        for (offset, c) in s[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&s[start..start + offset + 1]);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn parse_object(s: &str) -> Result<Value, SchemaValidationError> {
    let value: Value = serde_json::from_str(s).map_err(|e| unparseable(e.to_string()))?;
    require_object(value)
}

fn require_object(value: Value) -> Result<Value, SchemaValidationError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(unparseable("expected a JSON object"))
    }
}

fn unparseable(message: impl Into<String>) -> SchemaValidationError {
    SchemaValidationError::Unparseable {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_json() {
        let value = ResponseExtractor::new()
            .extract(r#"{"characteristics": "bold"}"#)
            .unwrap();
        assert_eq!(value, json!({"characteristics": "bold"}));
    }

    #[test]
    fn parses_fenced_json() {
        let response = "Here you go:\n```json\n{\"highlights\": \"truffle\"}\n```\nEnjoy!";
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["highlights"], "truffle");
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let response = r#"Certainly! {"a": "x {not a brace}", "b": {"c": "é"}} Let me know."#;
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["a"], "x {not a brace}");
        assert_eq!(value["b"]["c"], "é");
    }

    #[test]
    fn handles_escaped_quotes_inside_strings() {
        let response = r#"prefix {"a": "say \"hi\" }"} suffix"#;
        let value = ResponseExtractor::new().extract(response).unwrap();
        assert_eq!(value["a"], "say \"hi\" }");
    }

    #[test]
    fn rejects_arrays() {
        let err = ResponseExtractor::new().extract(r#"[{"name": "x"}]"#).unwrap_err();
        assert!(matches!(err, SchemaValidationError::Unparseable { .. }));
    }

    #[test]
    fn rejects_plain_prose() {
        let err = ResponseExtractor::new()
            .extract("I'm sorry, I can't help with that.")
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::Unparseable { .. }));
    }

    #[test]
    fn rejects_empty_and_oversized_responses() {
        let extractor = ResponseExtractor::new();
        assert!(extractor.extract("   ").is_err());
        assert!(extractor.extract(&"x".repeat(MAX_RESPONSE_LENGTH + 1)).is_err());
    }
}
