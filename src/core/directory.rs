//! Filtering, sorting and paging for the chat directory

use crate::infrastructure::entities::ChatSummary;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Activity window, either bound may be left open.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Directory filter. Unset fields accept everything; date bounds apply to the
/// chat's last activity, so a chat with no messages never matches a bounded
/// range.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChatFilter {
    pub waiting: Option<bool>,
    pub ai: Option<bool>,
    pub date_range: Option<DateRange>,
}

impl ChatFilter {
    fn accepts(&self, chat: &ChatSummary) -> bool {
        if let Some(waiting) = self.waiting {
            if chat.waiting != waiting {
                return false;
            }
        }
        if let Some(ai) = self.ai {
            if chat.ai != ai {
                return false;
            }
        }
        if let Some(range) = self.date_range {
            if let Some(start) = range.start {
                match chat.last_message_at {
                    Some(at) if at >= start => {}
                    _ => return false,
                }
            }
            if let Some(end) = range.end {
                match chat.last_message_at {
                    Some(at) if at <= end => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Uuid,
    Waiting,
    Ai,
    LastMessageAt,
    MessageCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug)]
pub struct ChatSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Most recent activity first, matching the order the store lists chats in.
impl Default for ChatSort {
    fn default() -> Self {
        Self {
            field: SortField::LastMessageAt,
            order: SortOrder::Desc,
        }
    }
}

/// What one directory page is made of. `page` is 1-based.
#[derive(Clone, Copy, Debug)]
pub struct DirectoryQuery {
    pub page: usize,
    pub page_size: usize,
    pub filter: ChatFilter,
    pub sort: ChatSort,
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            filter: ChatFilter::default(),
            sort: ChatSort::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectoryPage {
    pub items: Vec<ChatSummary>,
    pub total: usize,
}

/// Projects one directory page out of the full chat list. Deterministic for
/// identical inputs. `total` counts the filtered set, not the unfiltered one,
/// and a page past the end comes back empty.
pub fn select_page(chats: &[ChatSummary], query: &DirectoryQuery) -> DirectoryPage {
    let mut filtered: Vec<ChatSummary> = chats
        .iter()
        .filter(|chat| query.filter.accepts(chat))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| {
        let ordering = compare(a, b, query.sort.field);
        match query.sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = filtered.len();
    let start = query.page.saturating_sub(1).saturating_mul(query.page_size);
    let items = filtered
        .into_iter()
        .skip(start)
        .take(query.page_size)
        .collect();
    DirectoryPage { items, total }
}

// `Option` ordering puts chats without messages first ascending, last
// descending.
fn compare(a: &ChatSummary, b: &ChatSummary, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Uuid => a.uuid.cmp(&b.uuid),
        SortField::Waiting => a.waiting.cmp(&b.waiting),
        SortField::Ai => a.ai.cmp(&b.ai),
        SortField::LastMessageAt => a.last_message_at.cmp(&b.last_message_at),
        SortField::MessageCount => a.message_count.cmp(&b.message_count),
    }
}
