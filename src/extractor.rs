//! Content Extractor
//!
//! Normalizes a Responses API answer into `{text, images}`.

use crate::models::NormalizedAnswer;
use crate::responses::{ImageSource, OutputItem, ResponsesResponse};
use tracing::debug;

/// Collect all text and inline images from the response, in encounter order.
///
/// File-referenced and remote images are skipped; they are never resolved to bytes.
pub fn extract(response: &ResponsesResponse) -> NormalizedAnswer {
    let mut text = String::new();
    let mut images = Vec::new();

    for item in response.items() {
        match item {
            OutputItem::Message { content } => {
                for part in content {
                    if let Some(t) = part.text.as_deref() {
                        text.push_str(t);
                    }
                }
            }
            OutputItem::ToolOutput { outputs } => {
                for output in outputs {
                    match output.image_source() {
                        ImageSource::Inline(data) => images.push(data.to_string()),
                        ImageSource::FileReference(file_id) => {
                            debug!(file_id, "Skipping file-referenced image");
                        }
                        ImageSource::Remote(url) => {
                            debug!(url, "Skipping remote image");
                        }
                        ImageSource::NotAnImage => {}
                    }
                }
            }
            OutputItem::Unknown { kind } => {
                debug!(kind = kind.as_deref().unwrap_or("-"), "Ignoring output item");
            }
        }
    }

    NormalizedAnswer::new(text, images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_RESPONSE_SENTINEL;
    use crate::responses::{ContentPart, ToolOutputEntry};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ResponsesResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_output_yields_sentinel() {
        let answer = extract(&ResponsesResponse::from_items(vec![]));
        assert_eq!(answer.text, NO_RESPONSE_SENTINEL);
        assert!(answer.images.is_empty());

        let answer = extract(&parse(json!({})));
        assert_eq!(answer.text, NO_RESPONSE_SENTINEL);
    }

    #[test]
    fn test_text_items_are_concatenated_in_order() {
        let response = ResponsesResponse::from_items(vec![
            OutputItem::Message {
                content: vec![ContentPart {
                    kind: Some("output_text".into()),
                    text: Some("First. ".into()),
                }],
            },
            OutputItem::Message {
                content: vec![ContentPart {
                    kind: Some("output_text".into()),
                    text: Some("Second.".into()),
                }],
            },
        ]);

        assert_eq!(extract(&response).text, "First. Second.");
    }

    #[test]
    fn test_all_parts_of_an_item_are_kept() {
        let response = parse(json!({
            "output": [{"type": "message", "content": [
                {"type": "output_text", "text": "A"},
                {"type": "refusal", "refusal": "no"},
                {"type": "output_text", "text": "B"}
            ]}]
        }));

        assert_eq!(extract(&response).text, "AB");
    }

    #[test]
    fn test_inline_images_collected_in_order() {
        let response = parse(json!({
            "output": [
                {"type": "code_interpreter_call", "outputs": [
                    {"type": "logs", "logs": "computed"},
                    {"type": "image", "data": "IMG1"},
                    {"type": "image", "file_id": "file-skip"},
                    {"type": "image", "url": "data:image/png;base64,IMG2"}
                ]},
                {"type": "message", "content": [{"type": "output_text", "text": "Chart attached."}]},
                {"type": "code_interpreter_call", "outputs": [{"type": "image", "data": "IMG3"}]}
            ]
        }));

        let answer = extract(&response);
        assert_eq!(answer.text, "Chart attached.");
        assert_eq!(answer.images, vec!["IMG1", "IMG2", "IMG3"]);
    }

    #[test]
    fn test_images_without_text_still_use_sentinel() {
        let response = ResponsesResponse::from_items(vec![OutputItem::ToolOutput {
            outputs: vec![ToolOutputEntry {
                kind: Some("image".into()),
                data: Some("PNGDATA".into()),
                ..Default::default()
            }],
        }]);

        let answer = extract(&response);
        assert_eq!(answer.text, NO_RESPONSE_SENTINEL);
        assert_eq!(answer.images, vec!["PNGDATA"]);
    }

    #[test]
    fn test_unknown_items_contribute_nothing() {
        let response = parse(json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "file_search_call", "queries": ["fees"], "results": null},
                {"type": "message", "content": []},
                {"type": "message"}
            ]
        }));

        let answer = extract(&response);
        assert_eq!(answer.text, NO_RESPONSE_SENTINEL);
        assert!(answer.images.is_empty());
    }

    #[test]
    fn test_odd_tool_output_shape_keeps_the_answer() {
        let response: ResponsesResponse = serde_json::from_slice(
            br#"{"output": [
                {"type": "code_interpreter_call", "outputs": [{"type": "files", "data": {"files": []}}]},
                {"type": "message", "content": [{"type": "output_text", "text": "Answer."}]}
            ]}"#,
        )
        .unwrap();

        let answer = extract(&response);
        assert_eq!(answer.text, "Answer.");
        assert!(answer.images.is_empty());
    }

    #[test]
    fn test_unknown_item_with_string_content_keeps_the_answer() {
        let response: ResponsesResponse = serde_json::from_slice(
            br#"{"output": [
                {"type": "web_search_call", "content": "opaque string payload"},
                {"type": "message", "content": [{"type": "output_text", "text": "Answer."}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(extract(&response).text, "Answer.");
    }

    #[test]
    fn test_reasoning_text_is_not_part_of_the_answer() {
        let response = parse(json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "reasoning_text", "text": "internal notes "}]},
                {"type": "message", "content": [{"type": "output_text", "text": "Answer."}]}
            ]
        }));

        assert_eq!(extract(&response).text, "Answer.");
    }
}
