//! Display-only projections of a ticket. Nothing here mutates stored
//! state; the sentinels and wording match the dashboard exactly.

use crate::db::{
    ticket::{Category, Status},
    Ticket,
};

/// Shown where a category-dependent size was never filled in.
pub const SIZE_UNFILLED: &str = "未填";

/// Shown for a non-pending ticket without an assigned designer.
pub const UNASSIGNED: &str = "未指派";

/// Default preview length for [`truncate_description`].
pub const DESCRIPTION_LIMIT: usize = 120;

/// Poster pick-list values; anything else is a custom size.
pub const POSTER_SIZES: [&str; 4] = ["A0", "A1", "A2", "A3"];

pub fn size_label(ticket: &Ticket) -> &str {
    match ticket.category {
        Category::PosterOutput => ticket
            .poster_custom_size
            .as_deref()
            .filter(|size| !size.is_empty())
            .or(ticket
                .poster_size
                .as_deref()
                .filter(|size| !size.is_empty()))
            .unwrap_or(SIZE_UNFILLED),
        Category::FlatDesign => ticket
            .flat_size
            .as_deref()
            .filter(|size| !size.is_empty())
            .unwrap_or(SIZE_UNFILLED),
        Category::Video | Category::DigitalPhotography => SIZE_UNFILLED,
    }
}

/// Size fields reconstructed from a display label, the inverse of
/// [`size_label`] for a fixed category.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SizeFields {
    pub poster_size: Option<String>,
    pub poster_custom_size: Option<String>,
    pub flat_size: Option<String>,
}

pub fn size_from_label(category: Category, label: &str) -> SizeFields {
    let mut fields = SizeFields::default();
    if label == SIZE_UNFILLED {
        return fields;
    }
    match category {
        Category::PosterOutput => {
            if POSTER_SIZES.contains(&label) {
                fields.poster_size = Some(label.to_string());
            } else {
                fields.poster_custom_size = Some(label.to_string());
            }
        }
        Category::FlatDesign => {
            fields.flat_size = Some(label.to_string());
        }
        Category::Video | Category::DigitalPhotography => {}
    }
    fields
}

/// Assignment is suppressed while a ticket awaits approval, even if
/// the underlying field happens to be set.
pub fn assignee_label(ticket: &Ticket) -> &str {
    if ticket.status == Status::Pending {
        return "";
    }
    ticket
        .assigned_to_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(UNASSIGNED)
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pending => "待處理",
        Status::InProgress => "進行中",
        Status::Proofing => "校稿中",
        Status::WaitingReply => "待回覆",
        Status::Done => "已完成",
    }
}

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::PosterOutput => "海報輸出",
        Category::Video => "影片製作",
        Category::DigitalPhotography => "數位攝影",
        Category::FlatDesign => "平面設計",
    }
}

/// Returns the preview text and whether it was cut. A text of exactly
/// `limit` characters is returned untouched; one character more gets a
/// `limit`-character prefix plus an ellipsis. Counted in characters,
/// not bytes.
pub fn truncate_description(text: &str, limit: usize) -> (String, bool) {
    if text.chars().count() <= limit {
        return (text.to_string(), false);
    }
    let mut preview = text.chars().take(limit).collect::<String>();
    preview.push('…');
    (preview, true)
}
