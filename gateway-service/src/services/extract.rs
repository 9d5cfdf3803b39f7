//! Best-effort extraction of plain text from Gemini response envelopes.

use serde_json::Value;

/// Known locations of the generated text, in priority order. The envelope
/// shape varies across API versions and call paths: a wrapped
/// `response.candidates` envelope, the unwrapped `candidates` form, and a
/// flattened form where `content.text` holds the text directly.
const TEXT_POINTERS: [&str; 3] = [
    "/response/candidates/0/content/parts/0/text",
    "/candidates/0/content/parts/0/text",
    "/response/candidates/0/content/text",
];

/// Extract the generated text from a response of unknown shape.
///
/// The first known path that resolves to a string wins. When none do, the
/// whole value is returned pretty-printed so callers always get something
/// renderable. This never fails: a serialization fault on the fallback path
/// is logged and degrades to the compact rendering.
pub fn extract_text(response: &Value) -> String {
    for pointer in TEXT_POINTERS {
        if let Some(text) = response.pointer(pointer).and_then(Value::as_str) {
            return text.to_string();
        }
    }

    match serde_json::to_string_pretty(response) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::error!("Failed to pretty-print provider response: {}", err);
            response.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::extract_text;
    use serde_json::json;

    #[test]
    fn extracts_from_wrapped_envelope() {
        let response = json!({
            "response": {
                "candidates": [{ "content": { "parts": [{ "text": "hi" }] } }]
            }
        });

        assert_eq!("hi", extract_text(&response));
    }

    #[test]
    fn extracts_from_unwrapped_envelope() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }]
        });

        assert_eq!("hello", extract_text(&response));
    }

    #[test]
    fn extracts_from_flattened_content() {
        let response = json!({
            "response": {
                "candidates": [{ "content": { "text": "flat" } }]
            }
        });

        assert_eq!("flat", extract_text(&response));
    }

    #[test]
    fn wrapped_envelope_takes_priority_over_unwrapped() {
        let response = json!({
            "response": {
                "candidates": [{ "content": { "parts": [{ "text": "outer" }] } }]
            },
            "candidates": [{ "content": { "parts": [{ "text": "inner" }] } }]
        });

        assert_eq!("outer", extract_text(&response));
    }

    #[test]
    fn falls_back_to_pretty_printed_json() {
        let response = json!({ "foo": "bar" });

        assert_eq!(
            serde_json::to_string_pretty(&response).unwrap(),
            extract_text(&response)
        );
    }

    #[test]
    fn non_string_leaf_falls_back() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": 42 }] } }]
        });

        assert_eq!(
            serde_json::to_string_pretty(&response).unwrap(),
            extract_text(&response)
        );
    }
}
