//! External AI service (Responses API)
//!
//! Wire types for the single outbound call, the backend trait the dispatcher
//! depends on, an HTTP implementation and a scripted mock for tests.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod mock;
pub mod openai;

pub use mock::MockBackend;
pub use openai::OpenAiResponsesClient;

/// Outbound call failures, before they are attributed to a strategy
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unparseable response: {0}")]
    Decode(String),
}

/// Trait for the external AI service
#[async_trait::async_trait]
pub trait ResponsesBackend: Send + Sync {
    async fn create(
        &self,
        request: &ResponsesRequest,
    ) -> std::result::Result<ResponsesResponse, BackendError>;
}

//
// ================= Request =================
//

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    pub instructions: String,
    pub tools: Vec<ToolSpec>,
    pub max_tool_calls: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    FileSearch { vector_store_ids: Vec<String> },
    CodeInterpreter { container: ContainerSpec },
}

impl ToolSpec {
    pub fn file_search(vector_store_id: &str) -> Self {
        ToolSpec::FileSearch {
            vector_store_ids: vec![vector_store_id.to_string()],
        }
    }

    pub fn code_interpreter() -> Self {
        ToolSpec::CodeInterpreter {
            container: ContainerSpec::Auto,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolSpec::FileSearch { .. } => "file_search",
            ToolSpec::CodeInterpreter { .. } => "code_interpreter",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerSpec {
    Auto,
}

//
// ================= Response =================
//

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    output: Option<Vec<OutputItem>>,
}

impl ResponsesResponse {
    pub fn from_items(output: Vec<OutputItem>) -> Self {
        Self {
            id: None,
            model: None,
            output: Some(output),
        }
    }

    pub fn items(&self) -> &[OutputItem] {
        self.output.as_deref().unwrap_or(&[])
    }
}

/// One entry of the response's ordered output list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawOutputItem")]
pub enum OutputItem {
    Message { content: Vec<ContentPart> },
    ToolOutput { outputs: Vec<ToolOutputEntry> },
    Unknown { kind: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// A single tool-execution output. Shapes vary by tool, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolOutputEntry {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImagePayload {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub file_id: Option<String>,
}

/// Accept any JSON value; one that does not fit `T` reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for lists: a non-array reads as absent and elements
/// that do not fit `T` are dropped.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => Ok(Some(
            entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value(entry).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Where an image output's bytes live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Base64 payload carried in the response
    Inline(&'a str),
    /// Stored upstream, only an identifier is present
    FileReference(&'a str),
    /// Remote URL
    Remote(&'a str),
    NotAnImage,
}

impl ToolOutputEntry {
    pub fn image_source(&self) -> ImageSource<'_> {
        if let Some(image) = &self.image {
            if let Some(file_id) = image.file_id.as_deref() {
                return ImageSource::FileReference(file_id);
            }
            if let Some(data) = image.data.as_deref() {
                return ImageSource::Inline(data);
            }
        }

        let is_image = self.kind.as_deref() == Some("image");
        if !is_image {
            return ImageSource::NotAnImage;
        }

        if let Some(file_id) = self.file_id.as_deref() {
            return ImageSource::FileReference(file_id);
        }
        if let Some(data) = self.data.as_deref() {
            return ImageSource::Inline(data);
        }
        match self.url.as_deref() {
            Some(url) => match inline_data_url(url) {
                Some(payload) => ImageSource::Inline(payload),
                None => ImageSource::Remote(url),
            },
            None => ImageSource::NotAnImage,
        }
    }
}

/// Payload of a `data:<mime>;base64,<payload>` URL
fn inline_data_url(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(payload)
}

/// Loose shape of an output item as it arrives on the wire
#[derive(Debug, Default, Deserialize)]
struct RawOutputItem {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    content: Option<Vec<ContentPart>>,
    #[serde(default, deserialize_with = "lenient_list")]
    outputs: Option<Vec<ToolOutputEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    code_interpreter_outputs: Option<Vec<ToolOutputEntry>>,
}

impl From<RawOutputItem> for OutputItem {
    fn from(raw: RawOutputItem) -> Self {
        let outputs = raw.outputs.or(raw.code_interpreter_outputs);

        match raw.kind.as_deref() {
            Some("message") => {
                return OutputItem::Message {
                    content: raw.content.unwrap_or_default(),
                }
            }
            Some("code_interpreter_call") => {
                return OutputItem::ToolOutput {
                    outputs: outputs.unwrap_or_default(),
                }
            }
            Some(other) => {
                return OutputItem::Unknown {
                    kind: Some(other.to_string()),
                }
            }
            None => {}
        }

        // Untyped items are classified by the fields they carry
        match (raw.content, outputs) {
            (Some(content), _) => OutputItem::Message { content },
            (None, Some(outputs)) => OutputItem::ToolOutput { outputs },
            (None, None) => OutputItem::Unknown { kind: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ResponsesRequest {
            model: "gpt-4o".into(),
            input: "What is the Sharpe ratio?".into(),
            instructions: "be precise".into(),
            tools: vec![ToolSpec::file_search("vs_123"), ToolSpec::code_interpreter()],
            max_tool_calls: 10,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "input": "What is the Sharpe ratio?",
                "instructions": "be precise",
                "tools": [
                    {"type": "file_search", "vector_store_ids": ["vs_123"]},
                    {"type": "code_interpreter", "container": {"type": "auto"}}
                ],
                "max_tool_calls": 10
            })
        );
    }

    #[test]
    fn test_output_items_are_classified() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "id": "resp_1",
            "output": [
                {"type": "file_search_call", "id": "fs_1", "queries": ["fees"]},
                {"type": "code_interpreter_call", "outputs": [{"type": "logs", "logs": "ok"}]},
                {"type": "message", "role": "assistant",
                 "content": [{"type": "output_text", "text": "Hello", "annotations": []}]},
                {"id": "no_type"}
            ]
        }))
        .unwrap();

        let items = response.items();
        assert_eq!(items.len(), 4);
        assert!(matches!(&items[0], OutputItem::Unknown { kind: Some(k) } if k == "file_search_call"));
        assert!(matches!(&items[1], OutputItem::ToolOutput { outputs } if outputs.len() == 1));
        assert!(matches!(&items[2], OutputItem::Message { content } if content[0].text.as_deref() == Some("Hello")));
        assert!(matches!(&items[3], OutputItem::Unknown { kind: None }));
    }

    #[test]
    fn test_missing_and_null_fields_are_tolerated() {
        let response: ResponsesResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.items().is_empty());

        let response: ResponsesResponse =
            serde_json::from_value(json!({"output": null})).unwrap();
        assert!(response.items().is_empty());

        let response: ResponsesResponse = serde_json::from_value(json!({
            "output": [{"type": "message", "content": null}]
        }))
        .unwrap();
        assert_eq!(response.items(), &[OutputItem::Message { content: vec![] }]);
    }

    #[test]
    fn test_typed_items_are_not_sniffed() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "output": [
                {"type": "reasoning", "content": [{"type": "reasoning_text", "text": "thinking"}]},
                {"type": "web_search_call", "outputs": [{"type": "image", "data": "x"}]}
            ]
        }))
        .unwrap();

        assert_eq!(
            response.items(),
            &[
                OutputItem::Unknown { kind: Some("reasoning".into()) },
                OutputItem::Unknown { kind: Some("web_search_call".into()) },
            ]
        );
    }

    #[test]
    fn test_unexpected_field_types_do_not_fail_the_body() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "id": 42,
            "output": [
                {"type": "code_interpreter_call", "outputs": [
                    {"type": "files", "data": {"files": []}},
                    "not an object",
                    {"type": "image", "data": "IMG", "url": 7}
                ]},
                {"type": "web_search_call", "content": "opaque string payload"},
                {"type": "message", "content": [
                    {"type": "output_text", "text": {"value": "nested"}},
                    {"type": "output_text", "text": "Answer."}
                ]},
                "stray",
                {"type": 3, "content": [{"text": "untyped"}]}
            ]
        }))
        .unwrap();

        assert_eq!(response.id, None);
        let items = response.items();
        assert_eq!(items.len(), 4);

        match &items[0] {
            OutputItem::ToolOutput { outputs } => {
                assert_eq!(outputs.len(), 2);
                assert_eq!(outputs[0].image_source(), ImageSource::NotAnImage);
                assert_eq!(outputs[1].image_source(), ImageSource::Inline("IMG"));
            }
            other => panic!("unexpected item: {:?}", other),
        }
        assert_eq!(
            items[1],
            OutputItem::Unknown { kind: Some("web_search_call".into()) }
        );
        match &items[2] {
            OutputItem::Message { content } => {
                assert_eq!(content[0].text, None);
                assert_eq!(content[1].text.as_deref(), Some("Answer."));
            }
            other => panic!("unexpected item: {:?}", other),
        }
        // A non-string type is treated as untyped
        assert!(matches!(&items[3], OutputItem::Message { .. }));
    }

    #[test]
    fn test_legacy_tool_output_field() {
        let response: ResponsesResponse = serde_json::from_value(json!({
            "output": [{"code_interpreter_outputs": [{"image": {"data": "iVBORw0"}}]}]
        }))
        .unwrap();

        match &response.items()[0] {
            OutputItem::ToolOutput { outputs } => {
                assert_eq!(outputs[0].image_source(), ImageSource::Inline("iVBORw0"));
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn test_image_sources() {
        let inline: ToolOutputEntry =
            serde_json::from_value(json!({"type": "image", "data": "AAAA"})).unwrap();
        assert_eq!(inline.image_source(), ImageSource::Inline("AAAA"));

        let data_url: ToolOutputEntry = serde_json::from_value(
            json!({"type": "image", "url": "data:image/png;base64,QUJD"}),
        )
        .unwrap();
        assert_eq!(data_url.image_source(), ImageSource::Inline("QUJD"));

        let file_ref: ToolOutputEntry =
            serde_json::from_value(json!({"type": "image", "file_id": "file-1"})).unwrap();
        assert_eq!(file_ref.image_source(), ImageSource::FileReference("file-1"));

        let nested_ref: ToolOutputEntry =
            serde_json::from_value(json!({"image": {"file_id": "file-2", "data": "x"}})).unwrap();
        assert_eq!(nested_ref.image_source(), ImageSource::FileReference("file-2"));

        let remote: ToolOutputEntry = serde_json::from_value(
            json!({"type": "image", "url": "https://files.example/chart.png"}),
        )
        .unwrap();
        assert_eq!(
            remote.image_source(),
            ImageSource::Remote("https://files.example/chart.png")
        );

        let logs: ToolOutputEntry =
            serde_json::from_value(json!({"type": "logs", "logs": "done"})).unwrap();
        assert_eq!(logs.image_source(), ImageSource::NotAnImage);
    }
}
