//! Role-visibility and status-transition rules.
//!
//! Everything here is a pure function over a [`db::Ticket`]; the
//! gateway consults these rules before any store write, so a direct
//! API call cannot reach a transition the UI would have disabled.

use serde::{Deserialize, Serialize};

use crate::db::{
    ticket::Status::{self, Done, InProgress, Pending, Proofing, WaitingReply},
    Ticket,
};

/// The caller on whose behalf a request is made. Applicants and
/// approvers are scoped to a requesting unit, designers to their own
/// name on the assignment field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Actor {
    Applicant { unit: String },
    Approver { unit: String },
    Designer { name: String },
    Lead,
}

pub fn visible(actor: &Actor, ticket: &Ticket) -> bool {
    match actor {
        Actor::Applicant { unit } | Actor::Approver { unit } => {
            ticket.unit == *unit
        }
        Actor::Designer { name } => {
            ticket.assigned_to_name.as_deref() == Some(name)
                && ticket.status != Done
        }
        Actor::Lead => true,
    }
}

/// Dashboard sub-views. These are display slices of an already
/// visibility-filtered set, not separate authorization domains.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Queue {
    ApplicantActive,
    ApplicantNeedsAttention,
    ApproverPending,
    ApproverActive,
    LeadToAssign,
    LeadInFlight,
}

pub fn in_queue(queue: Queue, ticket: &Ticket) -> bool {
    match queue {
        Queue::ApplicantActive => {
            matches!(ticket.status, InProgress | Proofing)
        }
        Queue::ApplicantNeedsAttention => {
            matches!(ticket.status, WaitingReply | Pending)
        }
        Queue::ApproverPending => ticket.status == Pending,
        Queue::ApproverActive => {
            matches!(ticket.status, InProgress | Proofing | WaitingReply)
        }
        Queue::LeadToAssign => {
            ticket.status == Pending
                || (ticket.status == InProgress
                    && ticket.assigned_to_name.is_none())
        }
        Queue::LeadInFlight => {
            matches!(ticket.status, InProgress | Proofing | WaitingReply)
                && ticket.assigned_to_name.is_some()
        }
    }
}

/// Whether `actor` may move a ticket from `from` to `to`.
///
/// Approvers decide on pending tickets, applicants may only send a
/// returned ticket back for review, and production roles move freely
/// within the working statuses. The caller clears the assignee on the
/// applicant's resubmission path.
pub fn may_transition(actor: &Actor, from: Status, to: Status) -> bool {
    match actor {
        Actor::Approver { .. } => {
            from == Pending && matches!(to, InProgress | WaitingReply)
        }
        Actor::Applicant { .. } => from == WaitingReply && to == Pending,
        Actor::Designer { .. } | Actor::Lead => {
            is_working(from) && is_working(to)
        }
    }
}

/// Assignment is a lead-only action and is forbidden while a ticket
/// still awaits approval.
pub fn may_assign(actor: &Actor, status: Status) -> bool {
    *actor == Actor::Lead && status != Pending
}

/// Applicants may rework their own unit's tickets while these sit in
/// the review loop; the lead may edit anything, including status and
/// assignee, as an administrative override.
pub fn may_edit(actor: &Actor, ticket: &Ticket) -> bool {
    match actor {
        Actor::Applicant { unit } => {
            ticket.unit == *unit
                && matches!(ticket.status, WaitingReply | Pending)
        }
        Actor::Lead => true,
        Actor::Approver { .. } | Actor::Designer { .. } => false,
    }
}

fn is_working(status: Status) -> bool {
    matches!(status, InProgress | Proofing | WaitingReply | Done)
}
