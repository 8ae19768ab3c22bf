//! Read receipts

use chrono::{DateTime, Utc};

use crate::models::Message;

/// A message counts as read once every other participant has entered the
/// conversation after it was sent. With no other participants nothing is read.
pub fn is_read(sent_at: DateTime<Utc>, other_last_entries: &[DateTime<Utc>]) -> bool {
    !other_last_entries.is_empty() && other_last_entries.iter().all(|entry| *entry >= sent_at)
}

/// Messages whose stored flag disagrees with the recomputed one, paired with the new flag
pub fn read_flag_changes(messages: &[Message], other_last_entries: &[DateTime<Utc>]) -> Vec<(i64, bool)> {
    messages
        .iter()
        .filter_map(|m| {
            let read = is_read(m.sent_at, other_last_entries);
            (read != m.is_read).then_some((m.id, read))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message(id: i64, sent_at: DateTime<Utc>, is_read: bool) -> Message {
        Message {
            id,
            conversation_id: 1,
            sender_id: 1,
            content: "hi".to_string(),
            is_read,
            sent_at,
        }
    }

    #[test]
    fn test_is_read() {
        let now = Utc::now();
        assert!(!is_read(now, &[]));
        assert!(is_read(now, &[now, now + Duration::seconds(1)]));
        assert!(!is_read(now, &[now + Duration::seconds(1), now - Duration::seconds(1)]));
    }

    #[test]
    fn test_read_flag_changes() {
        let now = Utc::now();
        let messages = vec![
            message(1, now - Duration::minutes(2), false),
            message(2, now + Duration::minutes(2), true),
            message(3, now - Duration::minutes(1), true),
        ];
        assert_eq!(read_flag_changes(&messages, &[now]), vec![(1, true), (2, false)]);
    }
}
