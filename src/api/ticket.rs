use serde::{Deserialize, Serialize};

use crate::{db, gateway, view};

pub use crate::db::ticket::{Category, Id, Status};

/// A ticket as served over HTTP: the stored fields plus the projected
/// display labels the dashboard would otherwise compute itself.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub code: String,
    pub unit: String,
    pub applicant_name: String,
    pub role_type: String,
    pub ext: String,
    pub purpose: String,
    pub category: Category,
    pub description: Option<String>,
    pub poster_size: Option<String>,
    pub poster_custom_size: Option<String>,
    pub flat_size: Option<String>,
    pub status: Status,
    pub assigned_to_name: Option<String>,
    pub size_display: String,
    pub status_display: String,
    pub assignee_display: String,
}

impl From<db::Ticket> for Ticket {
    fn from(ticket: db::Ticket) -> Self {
        let size_display = view::size_label(&ticket).to_string();
        let status_display = view::status_label(ticket.status).to_string();
        let assignee_display = view::assignee_label(&ticket).to_string();
        Self {
            id: ticket.id,
            code: ticket.code,
            unit: ticket.unit,
            applicant_name: ticket.applicant_name,
            role_type: ticket.role_type,
            ext: ticket.ext,
            purpose: ticket.purpose,
            category: ticket.category,
            description: ticket.description,
            poster_size: ticket.poster_size,
            poster_custom_size: ticket.poster_custom_size,
            flat_size: ticket.flat_size,
            status: ticket.status,
            assigned_to_name: ticket.assigned_to_name,
            size_display,
            status_display,
            assignee_display,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub tickets: Vec<Ticket>,
    pub total_count: usize,
    pub counts: Counts,
}

/// Summary-card tallies over the caller's visible set, before any
/// status or keyword filter. "In progress" covers proofing as well.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub all: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
    pub waiting: usize,
}

impl Counts {
    pub fn tally<'t>(
        tickets: impl IntoIterator<Item = &'t db::Ticket>,
    ) -> Self {
        let mut counts = Self {
            all: 0,
            pending: 0,
            in_progress: 0,
            done: 0,
            waiting: 0,
        };
        for ticket in tickets {
            counts.all += 1;
            match ticket.status {
                Status::Pending => counts.pending += 1,
                Status::InProgress | Status::Proofing => {
                    counts.in_progress += 1
                }
                Status::Done => counts.done += 1,
                Status::WaitingReply => counts.waiting += 1,
            }
        }
        counts
    }
}

/// Body of `PATCH /tickets/:id`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(content = "data", rename_all = "camelCase", tag = "op")]
pub enum EditOp {
    Edit(gateway::EditRequest),
    ChangeStatus { status: Status },
    Reassign { assignee: Option<String> },
    Resubmit,
}

impl EditOp {
    pub fn into_request(self, id: Id) -> gateway::Request {
        match self {
            Self::Edit(edit) => gateway::Request::Edit { id, edit },
            Self::ChangeStatus { status } => {
                gateway::Request::ChangeStatus { id, status }
            }
            Self::Reassign { assignee } => {
                gateway::Request::Reassign { id, assignee }
            }
            Self::Resubmit => gateway::Request::Resubmit { id },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: Status,
    pub to: Status,
    pub changed_at: i64,
}

impl From<db::StatusChange> for StatusChange {
    fn from(change: db::StatusChange) -> Self {
        Self {
            from: change.from,
            to: change.to,
            changed_at: change.changed_at.unix_timestamp(),
        }
    }
}
