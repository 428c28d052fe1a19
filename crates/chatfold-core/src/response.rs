use chrono::{DateTime, Utc};

use crate::content::{ContentBlock, ContentItem};
use crate::model::{Properties, Role};
use crate::update::Update;
use crate::usage::UsageDetails;

/// One logical message folded from a run of updates.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role captured from the updates; `None` until an update names one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Content blocks in arrival order.
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
}

impl Message {
    /// Effective role, `assistant` when no update ever named one.
    pub fn role(&self) -> &str {
        self.role.as_ref().map_or("assistant", Role::as_str)
    }

    /// Concatenates all text blocks in order and ignores other blocks.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.contents {
            if let Some(text) = block.as_text() {
                out.push_str(text);
            }
        }
        out
    }
}

/// The folded result of an update sequence.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Backend finish reason when available (for example `stop`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Field-wise sum of every usage item seen; `None` when none arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageDetails>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    /// Messages in the order their first update arrived.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Response {
    /// Concatenates the text of every message in order.
    pub fn text(&self) -> String {
        self.messages.iter().map(Message::text).collect()
    }

    /// The most recently started message, which further updates may extend.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Expands the response back into an update sequence.
    ///
    /// Produces one update per message followed, when the response carries
    /// usage, a finish reason or properties, by a trailing update with those
    /// response-level fields. Folding the result reproduces the messages and
    /// their blocks; the trailing update's properties also land on the last
    /// message.
    pub fn to_updates(&self) -> Vec<Update> {
        let mut updates: Vec<Update> = self
            .messages
            .iter()
            .map(|message| Update {
                role: message.role.clone(),
                author_name: message.author_name.clone(),
                message_id: message.message_id.clone(),
                response_id: self.response_id.clone(),
                conversation_id: self.conversation_id.clone(),
                model_id: self.model_id.clone(),
                created_at: message.created_at,
                finish_reason: None,
                contents: message
                    .contents
                    .iter()
                    .cloned()
                    .map(ContentBlock::into_item)
                    .collect(),
                properties: message.properties.clone(),
            })
            .collect();

        if self.usage.is_some() || self.finish_reason.is_some() || !self.properties.is_empty() {
            updates.push(Update {
                response_id: self.response_id.clone(),
                conversation_id: self.conversation_id.clone(),
                model_id: self.model_id.clone(),
                finish_reason: self.finish_reason.clone(),
                contents: self
                    .usage
                    .iter()
                    .cloned()
                    .map(ContentItem::usage)
                    .collect(),
                properties: self.properties.clone(),
                ..Update::default()
            });
        }
        updates
    }
}
