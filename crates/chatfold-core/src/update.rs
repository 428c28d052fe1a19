use chrono::{DateTime, Utc};

use crate::content::ContentItem;
use crate::model::{Properties, Role};

/// One incremental fragment of a streamed chat response.
///
/// Every optional field is three-valued: absent (`None`, no opinion), blank
/// (`Some("")`, explicitly no value) or present. Blank values carry no opinion
/// for message boundaries and never overwrite a folded value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Content items in the order the backend produced them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Update {
    /// An update with no fields set.
    pub fn new() -> Self {
        Self::default()
    }

    /// An update carrying a single plain text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().content(ContentItem::text(text))
    }

    pub fn role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn response_id(mut self, id: impl Into<String>) -> Self {
        self.response_id = Some(id.into());
        self
    }

    pub fn conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn model_id(mut self, id: impl Into<String>) -> Self {
        self.model_id = Some(id.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }

    /// Appends a content item.
    pub fn content(mut self, item: ContentItem) -> Self {
        self.contents.push(item);
        self
    }

    /// Sets a free-form property.
    pub fn property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Returns the value when it is present, treating blank strings like absent.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_and_blank_survive_serialization() {
        let update = Update::new().author_name("");
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"author_name": ""}));
        let back: Update = serde_json::from_value(value).unwrap();
        assert_eq!(back.author_name.as_deref(), Some(""));
        assert_eq!(back.message_id, None);
    }

    #[test]
    fn present_filters_blank() {
        assert_eq!(present(&Some(String::new())), None);
        assert_eq!(present(&None), None);
        assert_eq!(present(&Some("m1".into())), Some("m1"));
    }

    #[test]
    fn deserializes_minimal_wire_record() {
        let update: Update = serde_json::from_value(json!({
            "role": "assistant",
            "message_id": "m1",
            "created_at": "2024-05-01T10:00:00Z",
            "contents": [{"type": "text", "text": "Hello"}]
        }))
        .unwrap();
        assert_eq!(update.role, Some(Role::assistant()));
        assert_eq!(update.contents, vec![ContentItem::text("Hello")]);
        assert!(update.created_at.is_some());
    }
}
