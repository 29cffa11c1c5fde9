use time::OffsetDateTime;
use tokio_postgres::Error;

use super::{ticket, Client};

/// One recorded status transition of a ticket. Append-only; rows are
/// removed together with the ticket.
#[derive(Clone, Debug)]
pub struct StatusChange {
    pub ticket_id: ticket::Id,
    pub from: ticket::Status,
    pub to: ticket::Status,
    pub changed_at: OffsetDateTime,
}

impl Client {
    pub async fn insert_status_change(
        &self,
        change: &StatusChange,
    ) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO ticket_status_history (ticket_id, status_from, \
                                               status_to, changed_at) \
            VALUES ($1, $2, $3, $4)";

        self.0
            .execute(
                SQL,
                &[
                    &change.ticket_id,
                    &change.from,
                    &change.to,
                    &change.changed_at,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn get_status_history(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<StatusChange>, Error> {
        const SQL: &str = "\
            SELECT ticket_id, status_from, status_to, changed_at \
            FROM ticket_status_history \
            WHERE ticket_id = $1 \
            ORDER BY changed_at";
        Ok(self
            .0
            .query(SQL, &[&ticket_id])
            .await?
            .into_iter()
            .map(|row| StatusChange {
                ticket_id: row.get("ticket_id"),
                from: row.get("status_from"),
                to: row.get("status_to"),
                changed_at: row.get("changed_at"),
            })
            .collect())
    }
}
