//! Pulls the JSON payload out of free-form model output.
//!
//! The candidate is everything from the first `{` through the last `}`;
//! surrounding prose and code fences are ignored.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model response contains no JSON object")]
    NoJson,
    #[error("JSON parse failed: {0}")]
    Malformed(String),
}

pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(ExtractError::NoJson);
    };

    if end < start {
        return Err(ExtractError::Malformed(
            "closing brace appears before the opening brace".to_string(),
        ));
    }

    // Both braces are single-byte, so these are char boundaries.
    let candidate = &raw[start..=end];
    serde_json::from_str::<Value>(candidate).map_err(|e| ExtractError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn surrounding_prose_and_fences_are_ignored() {
        let raw = "好的，以下是问卷设计：\n```json\n{\"survey_name\": \"信用卡满意度调研\", \"questions\": []}\n```\n希望对您有帮助。";
        assert_eq!(
            extract_json(raw).unwrap(),
            json!({ "survey_name": "信用卡满意度调研", "questions": [] })
        );
    }

    #[test]
    fn nested_objects_span_first_to_last_brace() {
        let raw = r#"{"questions": [{"question_text": "a", "options": ["x"]}]}"#;
        assert_eq!(extract_json(raw).unwrap()["questions"][0]["options"][0], "x");
    }

    #[test]
    fn missing_braces_is_no_json() {
        assert!(matches!(extract_json("抱歉，我无法完成"), Err(ExtractError::NoJson)));
        assert!(matches!(extract_json("only { opening"), Err(ExtractError::NoJson)));
        assert!(matches!(extract_json("only } closing"), Err(ExtractError::NoJson)));
        assert!(matches!(extract_json(""), Err(ExtractError::NoJson)));
    }

    #[test]
    fn reversed_braces_are_malformed() {
        assert!(matches!(extract_json("} then {"), Err(ExtractError::Malformed(_))));
    }

    #[test]
    fn broken_json_between_braces_is_malformed() {
        let err = extract_json(r#"{"survey_name": "x", "questions": [}"#).unwrap_err();
        assert!(matches!(err, ExtractError::Malformed(_)));
        assert!(err.to_string().starts_with("JSON parse failed"));
    }

    #[test]
    fn two_objects_in_one_reply_are_malformed() {
        assert!(matches!(
            extract_json(r#"{"a": 1} and also {"b": 2}"#),
            Err(ExtractError::Malformed(_))
        ));
    }
}
