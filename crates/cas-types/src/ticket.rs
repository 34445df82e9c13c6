//! Service ticket types

use uuid::Uuid;

/// Opaque service ticket token
///
/// Tickets are `ST-` followed by the simple (hyphenless) form of a random v4
/// UUID, which gives 122 bits of entropy from the OS random source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceTicket(String);

impl ServiceTicket {
    /// Prefix every service ticket carries
    pub const PREFIX: &'static str = "ST-";

    /// Mint a new random ticket
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4().simple()))
    }

    /// Get the ticket as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ServiceTicket {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceTicket {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ServiceTicket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A ticket bound to the principal and service it was minted for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    /// The opaque token handed to the browser
    pub ticket: ServiceTicket,
    /// Authenticated principal the ticket asserts
    pub username: String,
    /// Service URL, exactly as supplied at login
    pub service: String,
}

impl TicketRecord {
    /// Create a record with a freshly minted ticket
    pub fn mint(username: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            ticket: ServiceTicket::generate(),
            username: username.into(),
            service: service.into(),
        }
    }

    /// Whether this record was issued to `username` for `service`
    pub fn is_for_principal(&self, username: &str, service: &str) -> bool {
        self.username == username && self.service == service
    }

    /// Whether this record matches a `(ticket, service)` validation request
    pub fn matches_ticket(&self, ticket: &str, service: &str) -> bool {
        self.service == service && self.ticket.as_str() == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ticket_format() {
        let ticket = ServiceTicket::generate();
        let s = ticket.as_str();
        assert!(s.starts_with("ST-"));
        assert_eq!(s.len(), 3 + 32);
        assert!(s[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_tickets_differ() {
        assert_ne!(ServiceTicket::generate(), ServiceTicket::generate());
    }

    #[test]
    fn test_record_matching() {
        let record = TicketRecord::mint("alice", "http://svc.example/cb");
        let ticket = record.ticket.to_string();

        assert!(record.is_for_principal("alice", "http://svc.example/cb"));
        assert!(!record.is_for_principal("bob", "http://svc.example/cb"));
        assert!(!record.is_for_principal("alice", "http://other.example/"));

        assert!(record.matches_ticket(&ticket, "http://svc.example/cb"));
        assert!(!record.matches_ticket(&ticket, "http://svc.example/cb/"));
        assert!(!record.matches_ticket("ST-unknown", "http://svc.example/cb"));
    }
}
