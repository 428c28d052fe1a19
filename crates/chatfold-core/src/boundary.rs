//! Decides whether an update continues the active message or starts a new one.

use std::fmt;

use crate::model::Role;
use crate::response::Message;
use crate::update::{Update, present};

/// Identity field whose change forced a new message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryReason {
    Role,
    AuthorName,
    MessageId,
}

impl fmt::Display for BoundaryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Role => "role",
            Self::AuthorName => "author_name",
            Self::MessageId => "message_id",
        })
    }
}

/// Outcome of comparing one captured identity field with an incoming value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldChange {
    /// Incoming value is absent or blank.
    Keep,
    /// Incoming value fills an unset field or repeats the captured one.
    Adopt,
    /// Incoming value differs from a captured value.
    Conflict,
}

pub(crate) fn field_change(current: Option<&str>, incoming: Option<&str>) -> FieldChange {
    match (current, incoming) {
        (_, None) => FieldChange::Keep,
        (Some(current), Some(incoming)) if current != incoming => FieldChange::Conflict,
        (_, Some(_)) => FieldChange::Adopt,
    }
}

fn incoming_role(update: &Update) -> Option<&str> {
    update
        .role
        .as_ref()
        .filter(|role| !role.is_blank())
        .map(|role| role.as_str())
}

/// Returns the first identity field that forces `update` into a new message,
/// or `None` when it continues `message`.
pub fn detect_boundary(message: &Message, update: &Update) -> Option<BoundaryReason> {
    let checks = [
        (
            BoundaryReason::Role,
            message.role.as_ref().map(|role| role.as_str()),
            incoming_role(update),
        ),
        (
            BoundaryReason::AuthorName,
            message.author_name.as_deref(),
            present(&update.author_name),
        ),
        (
            BoundaryReason::MessageId,
            message.message_id.as_deref(),
            present(&update.message_id),
        ),
    ];
    checks
        .into_iter()
        .find(|(_, current, incoming)| field_change(*current, *incoming) == FieldChange::Conflict)
        .map(|(reason, _, _)| reason)
}

/// Copies every present identity field of `update` onto `message`.
pub(crate) fn adopt_identity(message: &mut Message, update: &Update) {
    if let Some(role) = incoming_role(update) {
        message.role = Some(role.into());
    }
    if let Some(author) = present(&update.author_name) {
        message.author_name = Some(author.to_string());
    }
    if let Some(id) = present(&update.message_id) {
        message.message_id = Some(id.to_string());
    }
}

/// The first message of a fold. Its role stays unset until an update names one.
pub(crate) fn opening_message(update: &Update) -> Message {
    let mut message = Message::default();
    adopt_identity(&mut message, update);
    message
}

/// A message started at a boundary, seeded with the identity carried by
/// `update`. The role is `assistant` when the update names none.
pub(crate) fn seeded_message(update: &Update) -> Message {
    let mut message = opening_message(update);
    message.role.get_or_insert_with(Role::assistant);
    message
}
