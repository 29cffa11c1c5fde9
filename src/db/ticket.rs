use std::error::Error as StdError;

use async_trait::async_trait;
use derive_more::Display;
use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Error, Row,
};
use uuid::Uuid;

use crate::gateway::{StoreError, TicketStore};

use super::{Client, StatusChange};

#[derive(Clone, Debug)]
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
    pub created_at: OffsetDateTime,
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    pub fn new() -> Self {
        Id(Uuid::new_v4())
    }
}

impl From<u128> for Id {
    fn from(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl FromSql<'_> for Id {
    accepts!(UUID);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Uuid::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for Id {
    accepts!(UUID);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Status {
    /// Submitted by the applicant, waiting for the approver's decision.
    Pending = 1,

    /// Approved, production work may proceed.
    InProgress = 2,

    /// A proof is with the applicant for review.
    Proofing = 3,

    /// Returned to the applicant for more information.
    WaitingReply = 4,

    /// Production finished and delivered.
    Done = 5,
}

impl FromSql<'_> for Status {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let status = Self::try_from(repr).map_err(|_| "invalid status")?;
        Ok(status)
    }
}

impl ToSql for Status {
    accepts!(INT2);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from((*self) as u8);
        repr.to_sql(ty, out)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, TryFromRepr, PartialEq, Serialize,
)]
#[repr(u8)]
pub enum Category {
    #[serde(rename = "海報輸出")]
    PosterOutput = 1,

    #[serde(rename = "影片製作")]
    Video = 2,

    #[serde(rename = "數位攝影")]
    DigitalPhotography = 3,

    #[serde(rename = "平面設計")]
    FlatDesign = 4,
}

impl FromSql<'_> for Category {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let category = Self::try_from(repr).map_err(|_| "invalid category")?;
        Ok(category)
    }
}

impl ToSql for Category {
    accepts!(INT2);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from((*self) as u8);
        repr.to_sql(ty, out)
    }
}

fn from_row(row: &Row) -> Ticket {
    Ticket {
        id: row.get("id"),
        code: row.get("code"),
        unit: row.get("unit"),
        applicant_name: row.get("applicant_name"),
        role_type: row.get("role_type"),
        ext: row.get("ext"),
        purpose: row.get("purpose"),
        category: row.get("category"),
        description: row.get("description"),
        poster_size: row.get("poster_size"),
        poster_custom_size: row.get("poster_custom_size"),
        flat_size: row.get("flat_size"),
        status: row.get("status"),
        assigned_to_name: row.get("assigned_to_name"),
        created_at: row.get("created_at"),
    }
}

impl Client {
    pub async fn get_ticket_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Ticket>, Error> {
        const SQL: &str = "\
            SELECT id, code, unit, applicant_name, role_type, ext, purpose, \
                   category, description, poster_size, poster_custom_size, \
                   flat_size, status, assigned_to_name, created_at \
            FROM tickets \
            WHERE id = $1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.as_ref().map(from_row))
    }

    pub async fn get_tickets(&self) -> Result<Vec<Ticket>, Error> {
        const SQL: &str = "\
            SELECT id, code, unit, applicant_name, role_type, ext, purpose, \
                   category, description, poster_size, poster_custom_size, \
                   flat_size, status, assigned_to_name, created_at \
            FROM tickets";
        Ok(self
            .0
            .query(SQL, &[])
            .await?
            .iter()
            .map(from_row)
            .collect())
    }

    pub async fn insert_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO tickets (id, code, unit, applicant_name, role_type, \
                                 ext, purpose, category, description, \
                                 poster_size, poster_custom_size, flat_size, \
                                 status, assigned_to_name, created_at) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                    $9, $10, $11, $12, $13, $14, $15)";

        self.0
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.code,
                    &ticket.unit,
                    &ticket.applicant_name,
                    &ticket.role_type,
                    &ticket.ext,
                    &ticket.purpose,
                    &ticket.category,
                    &ticket.description,
                    &ticket.poster_size,
                    &ticket.poster_custom_size,
                    &ticket.flat_size,
                    &ticket.status,
                    &ticket.assigned_to_name,
                    &ticket.created_at,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn update_ticket(&self, ticket: &Ticket) -> Result<u64, Error> {
        const SQL: &str = "\
            UPDATE tickets \
            SET unit = $2, \
                applicant_name = $3, \
                role_type = $4, \
                ext = $5, \
                purpose = $6, \
                category = $7, \
                description = $8, \
                poster_size = $9, \
                poster_custom_size = $10, \
                flat_size = $11, \
                status = $12, \
                assigned_to_name = $13 \
            WHERE id = $1";

        self.0
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.unit,
                    &ticket.applicant_name,
                    &ticket.role_type,
                    &ticket.ext,
                    &ticket.purpose,
                    &ticket.category,
                    &ticket.description,
                    &ticket.poster_size,
                    &ticket.poster_custom_size,
                    &ticket.flat_size,
                    &ticket.status,
                    &ticket.assigned_to_name,
                ],
            )
            .await
    }

    pub async fn delete_ticket(&self, id: Id) -> Result<u64, Error> {
        const SQL: &str = "DELETE FROM tickets WHERE id = $1";
        self.0.execute(SQL, &[&id]).await
    }
}

#[async_trait]
impl TicketStore for Client {
    async fn list(&self) -> Result<Vec<Ticket>, StoreError> {
        self.get_tickets().await.map_err(StoreError::new)
    }

    async fn get(&self, id: Id) -> Result<Option<Ticket>, StoreError> {
        self.get_ticket_by_id(id).await.map_err(StoreError::new)
    }

    async fn create(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.insert_ticket(ticket).await.map_err(StoreError::new)
    }

    async fn update(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        self.update_ticket(ticket)
            .await
            .map(|rows| rows > 0)
            .map_err(StoreError::new)
    }

    async fn delete(&self, id: Id) -> Result<bool, StoreError> {
        self.delete_ticket(id)
            .await
            .map(|rows| rows > 0)
            .map_err(StoreError::new)
    }

    async fn record_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        self.insert_status_change(change)
            .await
            .map_err(StoreError::new)
    }

    async fn status_history(
        &self,
        id: Id,
    ) -> Result<Vec<StatusChange>, StoreError> {
        self.get_status_history(id).await.map_err(StoreError::new)
    }
}
