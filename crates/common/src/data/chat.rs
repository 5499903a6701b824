use faststr::FastStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful learning assistant. Help the user understand concepts deeply by breaking them down, asking clarifying questions, and building on their existing knowledge.";

/// Browser-side chat request. Every field is optional on the wire; absent
/// or `null` fields take their default. Values are kept as raw JSON so the
/// upstream, not the relay, judges their shape.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages:   Option<Value>,
    pub system:     Option<Value>,
    pub model:      Option<Value>,
    pub max_tokens: Option<Value>,
}

/// The two proxied endpoints differ only in streaming and the default
/// output budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    Complete,
    Stream,
}

impl ChatMode {
    pub fn default_max_tokens(self) -> u32 {
        match self {
            ChatMode::Complete => 1024,
            ChatMode::Stream => 2048,
        }
    }

    pub fn is_stream(self) -> bool {
        matches!(self, ChatMode::Stream)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload {
    pub model:      Value,
    pub max_tokens: Value,
    pub system:     Value,
    pub messages:   Value,
    pub stream:     bool,
}

impl ChatRequest {
    pub fn into_payload(self, mode: ChatMode) -> UpstreamPayload {
        UpstreamPayload {
            model:      self.model.unwrap_or_else(|| DEFAULT_MODEL.into()),
            max_tokens: self.max_tokens.unwrap_or_else(|| mode.default_max_tokens().into()),
            system:     self.system.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.into()),
            messages:   self.messages.unwrap_or_else(|| Value::Array(Vec::new())),
            stream:     mode.is_stream(),
        }
    }
}

/// Successful non-streaming reply sent back to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub success: bool,
    pub message: FastStr,
    pub model:   Value,
    pub usage:   Value,
}

impl ChatResult {
    /// Builds the reply from the upstream message object, joining the text
    /// blocks in order and skipping every other block type.
    pub fn from_upstream(result: &Value) -> Self {
        let message: String = result["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|block| block["type"] == "text")
                    .filter_map(|block| block["text"].as_str())
                    .collect()
            })
            .unwrap_or_default();
        Self {
            success: true,
            message: message.into(),
            model:   result["model"].clone(),
            usage:   result["usage"].clone(),
        }
    }
}
