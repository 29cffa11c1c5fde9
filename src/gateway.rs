//! Validates and applies ticket mutations.
//!
//! Every mutation is a tagged request checked against [`crate::policy`]
//! before the single store write, so an API caller cannot bypass the
//! rules the dashboard enforces by disabling controls. The store and
//! the acting role are passed in explicitly; there is no ambient state.

use std::{
    collections::{HashMap, HashSet},
    error::Error as StdError,
};

use async_trait::async_trait;
use derive_more::{Display, From};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    db::{
        ticket::{self, Category, Status},
        StatusChange, Ticket,
    },
    policy::{self, Actor},
};

/// The store could not be reached or the write failed. Not-found is
/// reported separately, through `Option`/`bool` returns.
#[derive(Debug, Display)]
pub struct StoreError(Box<dyn StdError + Send + Sync>);

impl StoreError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// Durable record storage, as consumed by the gateway. Implemented by
/// the Postgres client and by the in-memory store the tests use.
#[async_trait]
pub trait TicketStore {
    async fn list(&self) -> Result<Vec<Ticket>, StoreError>;

    async fn get(&self, id: ticket::Id)
        -> Result<Option<Ticket>, StoreError>;

    async fn create(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Returns `false` when no record with the ticket's id exists.
    async fn update(&self, ticket: &Ticket) -> Result<bool, StoreError>;

    /// Returns `false` when no record with this id exists.
    async fn delete(&self, id: ticket::Id) -> Result<bool, StoreError>;

    async fn record_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<(), StoreError>;

    async fn status_history(
        &self,
        id: ticket::Id,
    ) -> Result<Vec<StatusChange>, StoreError>;
}

#[derive(Debug, From)]
pub enum Error {
    NotFound,
    PolicyViolation,
    #[from]
    StoreUnavailable(StoreError),
}

/// Per-caller session state: staged status/assignee drafts plus the
/// advisory per-ticket busy flag. Drafts for a ticket are dropped on
/// every successful mutation of that ticket.
#[derive(Debug, Default)]
pub struct Session {
    status_drafts: HashMap<ticket::Id, Status>,
    assignee_drafts: HashMap<ticket::Id, Option<String>>,
    busy: HashSet<ticket::Id>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_status(&mut self, id: ticket::Id, status: Status) {
        self.status_drafts.insert(id, status);
    }

    pub fn stage_assignee(
        &mut self,
        id: ticket::Id,
        assignee: Option<String>,
    ) {
        self.assignee_drafts.insert(id, assignee);
    }

    pub fn staged_status(&self, id: ticket::Id) -> Option<Status> {
        self.status_drafts.get(&id).copied()
    }

    pub fn staged_assignee(&self, id: ticket::Id) -> Option<&Option<String>> {
        self.assignee_drafts.get(&id)
    }

    pub fn has_drafts(&self, id: ticket::Id) -> bool {
        self.status_drafts.contains_key(&id)
            || self.assignee_drafts.contains_key(&id)
    }

    /// Advisory debounce, not a mutual-exclusion primitive: the caller
    /// marks a ticket busy while a submission is in flight and the
    /// gateway turns duplicate submissions into no-ops.
    pub fn mark_busy(&mut self, id: ticket::Id) {
        self.busy.insert(id);
    }

    pub fn clear_busy(&mut self, id: ticket::Id) {
        self.busy.remove(&id);
    }

    pub fn is_busy(&self, id: ticket::Id) -> bool {
        self.busy.contains(&id)
    }

    fn invalidate(&mut self, id: ticket::Id) {
        self.status_drafts.remove(&id);
        self.assignee_drafts.remove(&id);
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub applicant_name: String,
    pub role_type: String,
    pub ext: String,
    pub purpose: String,
    pub category: Category,
    pub poster_size: Option<String>,
    pub poster_custom_size: Option<String>,
    pub flat_size: Option<String>,
    pub description: Option<String>,
}

/// Field edits for a ticket in the review loop. `status` and
/// `assigned_to_name` are the lead's administrative override and are
/// rejected for any other actor.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub applicant_name: Option<String>,
    pub role_type: Option<String>,
    pub ext: Option<String>,
    pub purpose: Option<String>,
    pub category: Option<Category>,
    pub poster_size: Option<String>,
    pub poster_custom_size: Option<String>,
    pub flat_size: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub assigned_to_name: Option<Option<String>>,
}

#[derive(Clone, Debug)]
pub enum Request {
    Create(CreateRequest),
    Edit { id: ticket::Id, edit: EditRequest },
    ChangeStatus { id: ticket::Id, status: Status },
    Reassign { id: ticket::Id, assignee: Option<String> },
    Resubmit { id: ticket::Id },
    Delete { id: ticket::Id },
}

impl Request {
    fn ticket_id(&self) -> Option<ticket::Id> {
        match self {
            Self::Create(_) => None,
            Self::Edit { id, .. }
            | Self::ChangeStatus { id, .. }
            | Self::Reassign { id, .. }
            | Self::Resubmit { id }
            | Self::Delete { id } => Some(*id),
        }
    }
}

/// What a mutation did, with the confirmation text the dashboard
/// shows. `applied` is `false` for no-ops (duplicate submission while
/// busy, or drafts equal to the stored values).
#[derive(Clone, Debug)]
pub struct Outcome {
    pub ticket: Option<Ticket>,
    pub message: &'static str,
    pub applied: bool,
}

impl Outcome {
    fn applied(ticket: Ticket, message: &'static str) -> Self {
        Self {
            ticket: Some(ticket),
            message,
            applied: true,
        }
    }

    fn noop(ticket: Option<Ticket>, message: &'static str) -> Self {
        Self {
            ticket,
            message,
            applied: false,
        }
    }
}

const MSG_SUBMITTED: &str = "申請已送出，請盡快請主管審核";
const MSG_EDITED: &str = "修改已確認，請再送出審核";
const MSG_APPROVED: &str = "案件已核准，將由多媒體組派工";
const MSG_RETURNED: &str = "案件已退回，請申請人補件";
const MSG_UPDATED: &str = "案件已更新";
const MSG_DELETED: &str = "案件已刪除";
const MSG_BUSY: &str = "處理中";

pub struct Gateway<S> {
    store: S,
}

impl<S: TicketStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn apply(
        &self,
        session: &mut Session,
        actor: &Actor,
        request: Request,
    ) -> Result<Outcome, Error> {
        if let Some(id) = request.ticket_id() {
            if session.is_busy(id) {
                return Ok(Outcome::noop(None, MSG_BUSY));
            }
        }

        match request {
            Request::Create(create) => {
                self.create(session, actor, create).await
            }
            Request::Edit { id, edit } => {
                self.edit(session, actor, id, edit).await
            }
            Request::ChangeStatus { id, status } => {
                self.change_status(session, actor, id, status).await
            }
            Request::Reassign { id, assignee } => {
                self.reassign(session, actor, id, assignee).await
            }
            Request::Resubmit { id } => {
                self.resubmit(session, actor, id).await
            }
            Request::Delete { id } => self.delete(session, actor, id).await,
        }
    }

    /// Applies the session's staged status/assignee drafts to one
    /// ticket as a single worklist action. Drafts matching the stored
    /// values are a no-op; drafts the policy forbids are discarded and
    /// the action is rejected.
    pub async fn apply_drafts(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
    ) -> Result<Outcome, Error> {
        if session.is_busy(id) {
            return Ok(Outcome::noop(None, MSG_BUSY));
        }

        let mut ticket = self.fetch(id).await?;
        if !policy::visible(actor, &ticket) {
            session.invalidate(id);
            return Err(Error::PolicyViolation);
        }

        let next_status =
            session.staged_status(id).unwrap_or(ticket.status);
        let next_assignee = session
            .staged_assignee(id)
            .cloned()
            .unwrap_or_else(|| ticket.assigned_to_name.clone());

        let status_changed = next_status != ticket.status;
        let assignee_changed = next_assignee != ticket.assigned_to_name;
        if !status_changed && !assignee_changed {
            return Ok(Outcome::noop(Some(ticket), MSG_UPDATED));
        }

        let status_ok = !status_changed
            || policy::may_transition(actor, ticket.status, next_status);
        let assignee_ok = !assignee_changed
            || policy::may_assign(actor, ticket.status);
        if !status_ok || !assignee_ok {
            session.invalidate(id);
            return Err(Error::PolicyViolation);
        }

        let from = ticket.status;
        ticket.status = next_status;
        ticket.assigned_to_name = next_assignee;
        self.write(&ticket).await?;
        if status_changed {
            self.log_transition(&ticket, from).await;
        }
        session.invalidate(id);
        Ok(Outcome::applied(ticket, MSG_UPDATED))
    }

    async fn create(
        &self,
        session: &mut Session,
        actor: &Actor,
        create: CreateRequest,
    ) -> Result<Outcome, Error> {
        let Actor::Applicant { unit } = actor else {
            return Err(Error::PolicyViolation);
        };

        let ticket = Ticket {
            id: ticket::Id::new(),
            code: new_code(),
            unit: unit.clone(),
            applicant_name: create.applicant_name,
            role_type: create.role_type,
            ext: create.ext,
            purpose: create.purpose,
            category: create.category,
            description: non_empty(create.description),
            poster_size: non_empty(create.poster_size),
            poster_custom_size: non_empty(create.poster_custom_size),
            flat_size: non_empty(create.flat_size),
            status: Status::Pending,
            assigned_to_name: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.create(&ticket).await?;
        session.invalidate(ticket.id);
        Ok(Outcome::applied(ticket, MSG_SUBMITTED))
    }

    async fn edit(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
        edit: EditRequest,
    ) -> Result<Outcome, Error> {
        let mut ticket = self.fetch(id).await?;
        if !policy::may_edit(actor, &ticket) {
            return Err(Error::PolicyViolation);
        }
        let is_override =
            edit.status.is_some() || edit.assigned_to_name.is_some();
        if is_override && *actor != Actor::Lead {
            return Err(Error::PolicyViolation);
        }

        if let Some(applicant_name) = edit.applicant_name {
            ticket.applicant_name = applicant_name;
        }
        if let Some(role_type) = edit.role_type {
            ticket.role_type = role_type;
        }
        if let Some(ext) = edit.ext {
            ticket.ext = ext;
        }
        if let Some(purpose) = edit.purpose {
            ticket.purpose = purpose;
        }
        if let Some(category) = edit.category {
            ticket.category = category;
        }
        if let Some(poster_size) = edit.poster_size {
            ticket.poster_size = non_empty(Some(poster_size));
        }
        if let Some(poster_custom_size) = edit.poster_custom_size {
            ticket.poster_custom_size = non_empty(Some(poster_custom_size));
        }
        if let Some(flat_size) = edit.flat_size {
            ticket.flat_size = non_empty(Some(flat_size));
        }
        if let Some(description) = edit.description {
            ticket.description = non_empty(Some(description));
        }

        // Administrative override: the lead sets these directly,
        // outside the transition table.
        let from = ticket.status;
        if let Some(status) = edit.status {
            ticket.status = status;
        }
        if let Some(assignee) = edit.assigned_to_name {
            ticket.assigned_to_name = non_empty(assignee);
        }

        self.write(&ticket).await?;
        if ticket.status != from {
            self.log_transition(&ticket, from).await;
        }
        session.invalidate(id);
        Ok(Outcome::applied(ticket, MSG_EDITED))
    }

    async fn change_status(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
        status: Status,
    ) -> Result<Outcome, Error> {
        let mut ticket = self.fetch(id).await?;
        if !policy::visible(actor, &ticket)
            || !policy::may_transition(actor, ticket.status, status)
        {
            return Err(Error::PolicyViolation);
        }

        let from = ticket.status;
        ticket.status = status;
        if matches!(actor, Actor::Applicant { .. })
            && status == Status::Pending
        {
            ticket.assigned_to_name = None;
        }
        self.write(&ticket).await?;
        if from != status {
            self.log_transition(&ticket, from).await;
        }
        session.invalidate(id);

        let message = match (actor, status) {
            (Actor::Approver { .. }, Status::InProgress) => MSG_APPROVED,
            (Actor::Approver { .. }, Status::WaitingReply) => MSG_RETURNED,
            _ => MSG_UPDATED,
        };
        Ok(Outcome::applied(ticket, message))
    }

    async fn reassign(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
        assignee: Option<String>,
    ) -> Result<Outcome, Error> {
        let mut ticket = self.fetch(id).await?;
        if !policy::visible(actor, &ticket)
            || !policy::may_assign(actor, ticket.status)
        {
            return Err(Error::PolicyViolation);
        }

        ticket.assigned_to_name = non_empty(assignee);
        self.write(&ticket).await?;
        session.invalidate(id);
        Ok(Outcome::applied(ticket, MSG_UPDATED))
    }

    async fn resubmit(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
    ) -> Result<Outcome, Error> {
        let mut ticket = self.fetch(id).await?;
        if !policy::visible(actor, &ticket)
            || !policy::may_transition(
                actor,
                ticket.status,
                Status::Pending,
            )
        {
            return Err(Error::PolicyViolation);
        }

        let from = ticket.status;
        ticket.status = Status::Pending;
        ticket.assigned_to_name = None;
        self.write(&ticket).await?;
        self.log_transition(&ticket, from).await;
        session.invalidate(id);
        Ok(Outcome::applied(ticket, MSG_SUBMITTED))
    }

    async fn delete(
        &self,
        session: &mut Session,
        actor: &Actor,
        id: ticket::Id,
    ) -> Result<Outcome, Error> {
        let ticket = self.fetch(id).await?;
        if !policy::visible(actor, &ticket) {
            return Err(Error::PolicyViolation);
        }

        if !self.store.delete(id).await? {
            return Err(Error::NotFound);
        }
        session.invalidate(id);
        Ok(Outcome {
            ticket: None,
            message: MSG_DELETED,
            applied: true,
        })
    }

    async fn fetch(&self, id: ticket::Id) -> Result<Ticket, Error> {
        self.store.get(id).await?.ok_or(Error::NotFound)
    }

    async fn write(&self, ticket: &Ticket) -> Result<(), Error> {
        if !self.store.update(ticket).await? {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// History is best effort: a failed append never rolls back the
    /// ticket write.
    async fn log_transition(&self, ticket: &Ticket, from: Status) {
        let change = StatusChange {
            ticket_id: ticket.id,
            from,
            to: ticket.status,
            changed_at: OffsetDateTime::now_utc(),
        };
        if let Err(e) = self.store.record_status_change(&change).await {
            tracing::warn!("failed to record status change: {e}");
        }
    }
}

fn new_code() -> String {
    let year = OffsetDateTime::now_utc().year();
    // Best-effort uniqueness, matching the reference generator; codes
    // are display identifiers, the UUID is the real key.
    let suffix = rand::rng().random_range(1000..10000);
    format!("E170-{year}-{suffix}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
