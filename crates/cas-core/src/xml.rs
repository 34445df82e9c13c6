//! CAS 2.0 `serviceResponse` documents

use cas_types::FailureCode;

/// XML namespace of CAS protocol responses
pub const CAS_NAMESPACE: &str = "http://www.yale.edu/tp/cas";

/// Content type of validation responses
pub const CAS_CONTENT_TYPE: &str = "text/xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>"#;

/// Outcome of a `/serviceValidate` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceResponse {
    /// The ticket is valid for the service and asserts `user`
    Success { user: String },
    /// Validation failed
    Failure { code: FailureCode },
}

impl ServiceResponse {
    /// Create a failure response
    pub fn failure(code: FailureCode) -> Self {
        Self::Failure { code }
    }

    /// Whether validation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// HTTP status the response is sent with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Failure { .. } => 400,
        }
    }

    /// Render the XML document
    pub fn to_xml(&self) -> String {
        let body = match self {
            Self::Success { user } => format!(
                "<cas:authenticationSuccess><cas:user>{}</cas:user></cas:authenticationSuccess>",
                escape(user)
            ),
            Self::Failure { code } => format!(
                r#"<cas:authenticationFailure code="{}">{}</cas:authenticationFailure>"#,
                code.as_str(),
                escape(code.message())
            ),
        };

        format!(
            "{XML_DECLARATION}\n<cas:serviceResponse xmlns:cas=\"{CAS_NAMESPACE}\">\n  {body}\n</cas:serviceResponse>\n"
        )
    }
}

/// Escape text for XML/HTML element content and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
