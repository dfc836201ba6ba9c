//! Properties of chat history ordering

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use nordaun::shared::chat::order_messages;
use nordaun::shared::{ChatItem, Message, Profile};

fn author(id: u8) -> Profile {
    Profile {
        id: Uuid::from_u128(id as u128),
        name: format!("User {id}"),
        username: format!("user_{id}"),
        avatar_url: None,
    }
}

fn messages(offsets: &[(u8, i64)]) -> Vec<Message> {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    offsets
        .iter()
        .enumerate()
        .map(|(i, &(who, minutes))| {
            let at = start + Duration::minutes(minutes);
            Message {
                id: Uuid::from_u128(i as u128 + 1),
                text: Some(format!("text {i}")),
                author: author(who),
                attachments: Vec::new(),
                chat_id: Uuid::nil(),
                created_at: at,
                updated_at: at,
            }
        })
        .collect()
}

fn arb_offsets() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..3, 0i64..60 * 24 * 5), 0..40)
}

proptest! {
    #[test]
    fn test_every_message_appears_once_in_time_order(offsets in arb_offsets()) {
        let input = messages(&offsets);
        let ordered = order_messages(&input);

        let shown: Vec<&Message> = ordered
            .iter()
            .filter_map(|item| match item {
                ChatItem::Message { data, .. } => Some(data),
                ChatItem::Date { .. } => None,
            })
            .collect();
        prop_assert_eq!(shown.len(), input.len());
        prop_assert!(shown.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_one_separator_per_day(offsets in arb_offsets()) {
        let input = messages(&offsets);
        let ordered = order_messages(&input);

        let mut days: Vec<_> = input.iter().map(|m| m.created_at.date_naive()).collect();
        days.sort();
        days.dedup();
        let separators = ordered.iter().filter(|item| matches!(item, ChatItem::Date { .. })).count();
        prop_assert_eq!(separators, days.len());

        if let Some(first) = ordered.first() {
            prop_assert!(matches!(first, ChatItem::Date { .. }));
        }
    }

    #[test]
    fn test_keys_are_unique(offsets in arb_offsets()) {
        let ordered = order_messages(&messages(&offsets));
        let mut keys: Vec<&str> = ordered.iter().map(ChatItem::key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
    }

    #[test]
    fn test_avatar_marks_author_runs(offsets in arb_offsets()) {
        let ordered = order_messages(&messages(&offsets));
        let mut previous: Option<&ChatItem> = None;
        for item in &ordered {
            if let ChatItem::Message { avatar, data, .. } = item {
                let expected = match previous {
                    Some(ChatItem::Message { data: before, .. }) => before.author.id != data.author.id,
                    _ => true,
                };
                prop_assert_eq!(*avatar, expected);
            }
            previous = Some(item);
        }
    }
}
