//! CAS protocol vocabulary

/// Failure codes returned by `/serviceValidate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCode {
    /// The `service` parameter was missing or empty
    NoService,
    /// The `ticket` parameter was missing or empty
    NoTicket,
    /// No live ticket matches the `(ticket, service)` pair
    InvalidTicket,
}

impl FailureCode {
    /// Wire form of the code, as it appears in the `code` attribute
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoService => "NO_SERVICE",
            Self::NoTicket => "NO_TICKET",
            Self::InvalidTicket => "INVALID_TICKET",
        }
    }

    /// Human readable message sent as the element body
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NoService => "no service provided",
            Self::NoTicket => "no ticket provided",
            Self::InvalidTicket => "invalid ticket",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_code_wire_form() {
        assert_eq!(FailureCode::NoService.as_str(), "NO_SERVICE");
        assert_eq!(FailureCode::NoTicket.as_str(), "NO_TICKET");
        assert_eq!(FailureCode::InvalidTicket.as_str(), "INVALID_TICKET");
    }

    #[test]
    fn test_failure_code_messages() {
        assert_eq!(FailureCode::NoService.message(), "no service provided");
        assert_eq!(FailureCode::NoTicket.message(), "no ticket provided");
        assert_eq!(FailureCode::InvalidTicket.message(), "invalid ticket");
        assert_eq!(FailureCode::InvalidTicket.to_string(), "INVALID_TICKET");
    }
}
