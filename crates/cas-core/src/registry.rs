//! In-memory service ticket registry
//!
//! Records are kept in insertion order and every lookup returns the first
//! match. All operations, including the read-then-write `find_or_issue`, run
//! under a single lock acquisition.

use cas_types::{ServiceTicket, TicketRecord};
use tokio::sync::Mutex;

/// Authoritative set of live service tickets
#[derive(Debug, Default)]
pub struct TicketRegistry {
    records: Mutex<Vec<TicketRecord>>,
}

impl TicketRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and store a new ticket for `username` at `service`
    pub async fn issue(&self, username: &str, service: &str) -> ServiceTicket {
        let record = TicketRecord::mint(username, service);
        let ticket = record.ticket.clone();
        self.records.lock().await.push(record);
        tracing::debug!(username, service, "Issued service ticket");
        ticket
    }

    /// First ticket issued to `username` for `service`
    pub async fn find_by_principal(&self, username: &str, service: &str) -> Option<TicketRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.is_for_principal(username, service))
            .cloned()
    }

    /// First record matching both `ticket` and `service` exactly
    ///
    /// A ticket presented for a service other than the one it was minted for
    /// is indistinguishable from an unknown ticket.
    pub async fn find_by_ticket(&self, ticket: &str, service: &str) -> Option<TicketRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.matches_ticket(ticket, service))
            .cloned()
    }

    /// Reuse the ticket `username` already holds for `service`, or issue one
    ///
    /// Returns the ticket and whether it was newly minted.
    pub async fn find_or_issue(&self, username: &str, service: &str) -> (ServiceTicket, bool) {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.iter().find(|r| r.is_for_principal(username, service)) {
            return (existing.ticket.clone(), false);
        }

        let record = TicketRecord::mint(username, service);
        let ticket = record.ticket.clone();
        records.push(record);
        tracing::debug!(username, service, "Issued service ticket");
        (ticket, true)
    }

    /// Remove every ticket issued to `username`, returning how many were removed
    pub async fn revoke_by_principal(&self, username: &str) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.username != username);
        let revoked = before - records.len();
        if revoked > 0 {
            tracing::debug!(username, revoked, "Revoked service tickets");
        }
        revoked
    }

    /// Number of live tickets
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no tickets are live
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
