//! Combination rules for scalar response and message fields.

use chrono::{DateTime, Utc};

use crate::model::Properties;
use crate::response::{Message, Response};
use crate::update::{Update, present};

/// Whether `at` is a zero/epoch placeholder rather than a real timestamp.
pub fn is_sentinel_timestamp(at: &DateTime<Utc>) -> bool {
    *at == DateTime::<Utc>::UNIX_EPOCH || *at == DateTime::<Utc>::MIN_UTC
}

/// Folds an incoming timestamp into an existing one.
///
/// Placeholders never win: an absent or sentinel incoming value keeps the
/// current one, a real incoming value replaces an absent or sentinel current
/// one, and between two real values the later instant wins.
pub fn fold_timestamp(
    current: Option<DateTime<Utc>>,
    incoming: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match (current, incoming) {
        (current, None) => current,
        (current, Some(b)) if is_sentinel_timestamp(&b) => current,
        (Some(a), Some(b)) if !is_sentinel_timestamp(&a) => Some(a.max(b)),
        (_, Some(b)) => Some(b),
    }
}

/// Last-present-value-wins: overwrites `slot` only with a non-blank value.
pub fn overwrite_if_present(slot: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = present(incoming) {
        *slot = Some(value.to_string());
    }
}

/// Key-wise merge where later values replace earlier ones.
pub fn merge_properties(target: &mut Properties, incoming: &Properties) {
    for (key, value) in incoming {
        target.insert(key.clone(), value.clone());
    }
}

/// Merges the update's response-level scalars into `response`.
pub(crate) fn fold_response_fields(response: &mut Response, update: &Update) {
    overwrite_if_present(&mut response.response_id, &update.response_id);
    overwrite_if_present(&mut response.conversation_id, &update.conversation_id);
    overwrite_if_present(&mut response.model_id, &update.model_id);
    overwrite_if_present(&mut response.finish_reason, &update.finish_reason);
    response.created_at = fold_timestamp(response.created_at, update.created_at);
    merge_properties(&mut response.properties, &update.properties);
}

/// Merges the update's per-message scalars into the active message.
pub(crate) fn fold_message_fields(message: &mut Message, update: &Update) {
    message.created_at = fold_timestamp(message.created_at, update.created_at);
    merge_properties(&mut message.properties, &update.properties);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn timestamp_absent_keeps_current() {
        assert_eq!(fold_timestamp(Some(at(10)), None), Some(at(10)));
        assert_eq!(fold_timestamp(None, None), None);
    }

    #[test]
    fn epoch_never_overwrites_real_timestamp() {
        assert_eq!(fold_timestamp(Some(at(10)), Some(at(0))), Some(at(10)));
        assert_eq!(
            fold_timestamp(Some(at(10)), Some(DateTime::<Utc>::MIN_UTC)),
            Some(at(10))
        );
    }

    #[test]
    fn real_timestamp_replaces_absent_or_epoch() {
        assert_eq!(fold_timestamp(None, Some(at(5))), Some(at(5)));
        assert_eq!(fold_timestamp(Some(at(0)), Some(at(5))), Some(at(5)));
    }

    #[test]
    fn later_timestamp_wins_between_real_values() {
        assert_eq!(fold_timestamp(Some(at(5)), Some(at(9))), Some(at(9)));
        assert_eq!(fold_timestamp(Some(at(9)), Some(at(5))), Some(at(9)));
    }

    #[test]
    fn blank_does_not_overwrite() {
        let mut slot = Some("r1".to_string());
        overwrite_if_present(&mut slot, &Some(String::new()));
        assert_eq!(slot.as_deref(), Some("r1"));
        overwrite_if_present(&mut slot, &None);
        assert_eq!(slot.as_deref(), Some("r1"));
        overwrite_if_present(&mut slot, &Some("r2".into()));
        assert_eq!(slot.as_deref(), Some("r2"));
    }

    #[test]
    fn properties_merge_later_wins() {
        let mut target = Properties::new();
        target.insert("a".into(), json!(1));
        target.insert("b".into(), json!(2));
        let mut incoming = Properties::new();
        incoming.insert("b".into(), json!(3));
        incoming.insert("c".into(), json!(4));
        merge_properties(&mut target, &incoming);
        assert_eq!(serde_json::Value::Object(target), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn response_fields_use_last_present_value() {
        let mut response = Response::default();
        fold_response_fields(
            &mut response,
            &Update::new().response_id("r1").model_id("m").finish_reason("length"),
        );
        fold_response_fields(&mut response, &Update::new().response_id("").finish_reason("stop"));
        assert_eq!(response.response_id.as_deref(), Some("r1"));
        assert_eq!(response.model_id.as_deref(), Some("m"));
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }
}
