//! Chat list aggregation.

use std::collections::HashMap;

use crate::models::{ChatSummary, Message, UserId};

/// Collapse a newest-first message list into one summary per partner.
///
/// `messages` must be sorted by creation time descending; the first message
/// seen for a partner becomes that conversation's last message. Summaries are
/// returned in order of first encounter, i.e. most recently active first.
///
/// Messages the viewer is not part of are skipped.
pub fn aggregate_chats<M>(messages: &[M], viewer: &UserId) -> Vec<ChatSummary<M>>
where
    M: AsRef<Message> + Clone,
{
    let mut chats: Vec<ChatSummary<M>> = Vec::new();
    let mut index: HashMap<&UserId, usize> = HashMap::new();

    for item in messages {
        let message = item.as_ref();

        let Some(partner) = message.partner_of(viewer) else {
            log::warn!(
                "skipping message {} ({} -> {}): viewer {} is not a participant",
                message.id,
                message.sender_id,
                message.receiver_id,
                viewer
            );
            continue;
        };

        let slot = *index.entry(partner).or_insert_with(|| {
            chats.push(ChatSummary {
                partner_id: partner.clone(),
                last_message: item.clone(),
                unread_count: 0,
            });
            chats.len() - 1
        });

        if message.is_from(partner) && message.is_unread_for(viewer) {
            chats[slot].unread_count += 1;
        }
    }

    chats
}

/// Total unread messages across all conversations.
pub fn total_unread<M>(chats: &[ChatSummary<M>]) -> u32 {
    chats.iter().map(|c| c.unread_count).sum()
}
