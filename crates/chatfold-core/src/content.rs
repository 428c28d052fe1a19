//! Content carried by updates ([`ContentItem`]) and the folded spans stored on
//! messages ([`ContentBlock`]).

use serde::de::Error as _;
use serde_json::Value;
use tracing::debug;

use crate::usage::UsageDetails;

/// Incremental text output.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    pub text: String,
    /// Citations or other span annotations. Annotated text is never merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Value>>,
}

impl TextContent {
    pub fn has_annotations(&self) -> bool {
        self.annotations.as_ref().is_some_and(|a| !a.is_empty())
    }
}

/// Incremental model reasoning ("thinking") output.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReasoningContent {
    pub text: String,
    /// Opaque provider payload (for example an encrypted signature) that
    /// closes the reasoning span it arrives on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_data: Option<String>,
}

/// Usage counters reported inside the content stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UsageContent {
    #[serde(default)]
    pub counters: UsageDetails,
}

/// Inline binary data or a reference to it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataContent {
    pub media_type: String,
    /// Base64 payload or URI, exactly as the backend sent it.
    pub data: String,
}

/// A tool/function invocation requested by the model.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionCallContent {
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The result of a tool/function invocation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionResultContent {
    pub call_id: String,
    #[serde(default)]
    pub result: Value,
}

/// One content item inside an update.
///
/// Serialized as a JSON object tagged by `"type"`. Unrecognized kinds are kept
/// verbatim as [`ContentItem::Other`] so new backend content kinds fold as
/// opaque items instead of failing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Value", into = "Value")]
#[non_exhaustive]
pub enum ContentItem {
    Text(TextContent),
    Reasoning(ReasoningContent),
    Usage(UsageContent),
    Data(DataContent),
    FunctionCall(FunctionCallContent),
    FunctionResult(FunctionResultContent),
    /// Content kind without a typed representation.
    Other { kind: String, payload: Value },
}

impl ContentItem {
    /// Plain text with no annotations.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextContent {
            text: text.into(),
            annotations: None,
        })
    }

    pub fn annotated_text(text: impl Into<String>, annotations: Vec<Value>) -> Self {
        Self::Text(TextContent {
            text: text.into(),
            annotations: Some(annotations),
        })
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning(ReasoningContent {
            text: text.into(),
            protected_data: None,
        })
    }

    pub fn protected_reasoning(text: impl Into<String>, protected_data: impl Into<String>) -> Self {
        Self::Reasoning(ReasoningContent {
            text: text.into(),
            protected_data: Some(protected_data.into()),
        })
    }

    pub fn usage(counters: UsageDetails) -> Self {
        Self::Usage(UsageContent { counters })
    }

    pub fn data(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Data(DataContent {
            media_type: media_type.into(),
            data: data.into(),
        })
    }

    pub fn function_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: Value,
    ) -> Self {
        Self::FunctionCall(FunctionCallContent {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        })
    }

    pub fn function_result(call_id: impl Into<String>, result: Value) -> Self {
        Self::FunctionResult(FunctionResultContent {
            call_id: call_id.into(),
            result,
        })
    }

    /// Wire tag of this item.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::Reasoning(_) => "reasoning",
            Self::Usage(_) => "usage",
            Self::Data(_) => "data",
            Self::FunctionCall(_) => "function_call",
            Self::FunctionResult(_) => "function_result",
            Self::Other { kind, .. } => kind,
        }
    }
}

/// Writes `kind` as the `type` tag. A payload that is not an object is nested
/// under `value` so the item always serializes as an object.
fn tagged(kind: &str, payload: Value) -> Value {
    let mut map = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".into(), other);
            map
        }
    };
    map.insert("type".into(), Value::String(kind.to_string()));
    Value::Object(map)
}

impl From<ContentItem> for Value {
    fn from(item: ContentItem) -> Self {
        let kind = item.kind().to_string();
        let payload = match item {
            ContentItem::Text(c) => serde_json::to_value(c),
            ContentItem::Reasoning(c) => serde_json::to_value(c),
            ContentItem::Usage(c) => serde_json::to_value(c),
            ContentItem::Data(c) => serde_json::to_value(c),
            ContentItem::FunctionCall(c) => serde_json::to_value(c),
            ContentItem::FunctionResult(c) => serde_json::to_value(c),
            ContentItem::Other { payload, .. } => Ok(payload),
        };
        tagged(&kind, payload.unwrap_or(Value::Null))
    }
}

impl TryFrom<Value> for ContentItem {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(serde_json::Error::custom(
                "content item must be a JSON object",
            ));
        }
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let typed = match kind.as_str() {
            "text" => serde_json::from_value(value.clone()).map(Self::Text),
            "reasoning" => serde_json::from_value(value.clone()).map(Self::Reasoning),
            "usage" => serde_json::from_value(value.clone()).map(Self::Usage),
            "data" => serde_json::from_value(value.clone()).map(Self::Data),
            "function_call" => serde_json::from_value(value.clone()).map(Self::FunctionCall),
            "function_result" => serde_json::from_value(value.clone()).map(Self::FunctionResult),
            _ => return Ok(Self::Other { kind, payload: value }),
        };
        Ok(typed.unwrap_or_else(|err| {
            debug!(kind = %kind, error = %err, "malformed content item kept as opaque");
            Self::Other {
                kind,
                payload: value,
            }
        }))
    }
}

/// A finalized span of content inside a message.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Concatenated text of adjacent mergeable text items.
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        annotations: Option<Vec<Value>>,
    },
    /// Concatenated reasoning text, sealed once `protected_data` is recorded.
    Reasoning {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protected_data: Option<String>,
    },
    /// A single item with no merge rule.
    Opaque(ContentItem),
}

impl ContentBlock {
    /// Text of a text block, `None` for every other kind.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether this block can never accept another merged item.
    ///
    /// Annotated text, protected reasoning, and opaque items are sealed.
    pub fn is_sealed(&self) -> bool {
        match self {
            Self::Text { annotations, .. } => annotations.as_ref().is_some_and(|a| !a.is_empty()),
            Self::Reasoning { protected_data, .. } => protected_data.is_some(),
            Self::Opaque(_) => true,
        }
    }

    /// Converts the block back into the single content item it folds to.
    pub fn into_item(self) -> ContentItem {
        match self {
            Self::Text { text, annotations } => ContentItem::Text(TextContent { text, annotations }),
            Self::Reasoning {
                text,
                protected_data,
            } => ContentItem::Reasoning(ReasoningContent {
                text,
                protected_data,
            }),
            Self::Opaque(item) => item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_item_deserializes_from_tagged_object() {
        let item: ContentItem = serde_json::from_value(json!({"type": "text", "text": "hi"})).unwrap();
        assert_eq!(item, ContentItem::text("hi"));
    }

    #[test]
    fn unknown_kind_is_kept_as_other() {
        let raw = json!({"type": "hosted_file", "file_id": "f-1"});
        let item: ContentItem = serde_json::from_value(raw.clone()).unwrap();
        match &item {
            ContentItem::Other { kind, payload } => {
                assert_eq!(kind, "hosted_file");
                assert_eq!(payload, &raw);
            }
            other => panic!("expected Other, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn malformed_known_kind_degrades_to_other() {
        let item: ContentItem =
            serde_json::from_value(json!({"type": "data", "media_type": 7})).unwrap();
        assert_eq!(item.kind(), "data");
        assert!(matches!(item, ContentItem::Other { .. }));
    }

    #[test]
    fn non_object_item_is_rejected() {
        let err = serde_json::from_value::<ContentItem>(json!("text"));
        assert!(err.is_err());
    }

    #[test]
    fn opaque_block_with_scalar_payload_still_serializes() {
        let item = ContentItem::Other {
            kind: "marker".into(),
            payload: json!(3),
        };
        let value = serde_json::to_value(ContentBlock::Opaque(item)).unwrap();
        assert_eq!(value, json!({"block": "opaque", "type": "marker", "value": 3}));

        let back: ContentBlock = serde_json::from_value(value).unwrap();
        assert_eq!(back.into_item().kind(), "marker");
    }

    #[test]
    fn serialized_item_carries_type_tag() {
        let value = serde_json::to_value(ContentItem::protected_reasoning("a", "sig")).unwrap();
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("reasoning"));
        assert_eq!(value.get("protected_data").and_then(|v| v.as_str()), Some("sig"));
    }

    #[test]
    fn sealed_blocks() {
        let plain = ContentBlock::Text {
            text: "a".into(),
            annotations: Some(vec![]),
        };
        let annotated = ContentBlock::Text {
            text: "a".into(),
            annotations: Some(vec![json!({"url": "https://example.com"})]),
        };
        let protected = ContentBlock::Reasoning {
            text: "r".into(),
            protected_data: Some("pd".into()),
        };
        assert!(!plain.is_sealed());
        assert!(annotated.is_sealed());
        assert!(protected.is_sealed());
        assert!(ContentBlock::Opaque(ContentItem::data("image/png", "AA==")).is_sealed());
    }

    #[test]
    fn opaque_block_serializes_with_item_fields() {
        let block = ContentBlock::Opaque(ContentItem::data("image/png", "AA=="));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value.get("block").and_then(|v| v.as_str()), Some("opaque"));
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("data"));
    }
}
