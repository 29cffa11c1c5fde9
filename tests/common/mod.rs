#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use reqsys::{
    db::{
        ticket::{Category, Id, Status},
        StatusChange, Ticket,
    },
    gateway::{StoreError, TicketStore},
    policy::Actor,
};
use time::OffsetDateTime;

/// In-memory ticket store. Flip `set_unavailable` to make every call
/// fail the way a dropped database connection would.
#[derive(Default)]
pub struct MemStore {
    tickets: Mutex<Vec<Ticket>>,
    history: Mutex<Vec<StatusChange>>,
    unavailable: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: Mutex::new(tickets),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.lock().unwrap().len()
    }

    pub fn history(&self) -> Vec<StatusChange> {
        self.history.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::new("store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TicketStore for MemStore {
    async fn list(&self) -> Result<Vec<Ticket>, StoreError> {
        self.check()?;
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn get(&self, id: Id) -> Result<Option<Ticket>, StoreError> {
        self.check()?;
        let tickets = self.tickets.lock().unwrap();
        Ok(tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.check()?;
        self.tickets.lock().unwrap().push(ticket.clone());
        Ok(())
    }

    async fn update(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.check()?;
        let mut tickets = self.tickets.lock().unwrap();
        match tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(slot) => {
                *slot = ticket.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Id) -> Result<bool, StoreError> {
        self.check()?;
        let mut tickets = self.tickets.lock().unwrap();
        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        Ok(tickets.len() < before)
    }

    async fn record_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        self.check()?;
        self.history.lock().unwrap().push(change.clone());
        Ok(())
    }

    async fn status_history(
        &self,
        ticket_id: Id,
    ) -> Result<Vec<StatusChange>, StoreError> {
        self.check()?;
        let history = self.history.lock().unwrap();
        Ok(history
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}

pub fn ticket(code: &str, unit: &str, status: Status) -> Ticket {
    Ticket {
        id: Id::new(),
        code: code.to_owned(),
        unit: unit.to_owned(),
        applicant_name: "林小姐".to_owned(),
        role_type: "護理師".to_owned(),
        ext: "2211".to_owned(),
        purpose: "衛教宣導".to_owned(),
        category: Category::PosterOutput,
        description: None,
        poster_size: Some("A1".to_owned()),
        poster_custom_size: None,
        flat_size: None,
        status,
        assigned_to_name: None,
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn assigned(mut ticket: Ticket, name: &str) -> Ticket {
    ticket.assigned_to_name = Some(name.to_owned());
    ticket
}

pub fn applicant(unit: &str) -> Actor {
    Actor::Applicant {
        unit: unit.to_owned(),
    }
}

pub fn approver(unit: &str) -> Actor {
    Actor::Approver {
        unit: unit.to_owned(),
    }
}

pub fn designer(name: &str) -> Actor {
    Actor::Designer {
        name: name.to_owned(),
    }
}
