use thiserror::Error;

/// Which response code a failure is reported with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// FORMERR: the request (or the reply built for it) is malformed.
    FormatError,
    /// SERVFAIL: a well-formed request could not be answered.
    ServerFailure,
}

/// Every way a query can fail inside the gateway pipeline.
///
/// These never reach the transport: the pipeline converts each one into a
/// reply message carrying the matching response code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Failed to decode DNS message: {0}")]
    Decode(String),

    #[error("Invalid inbound message: {0}")]
    InboundValidation(String),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Malformed JSON from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Cannot convert JSON answer to DNS reply: {0}")]
    Conversion(String),

    #[error("Invalid reply message: {0}")]
    OutboundValidation(String),

    #[error("Failed to encode DNS reply: {0}")]
    Encode(String),
}

impl GatewayError {
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::Decode(_)
            | Self::InboundValidation(_)
            | Self::OutboundValidation(_)
            | Self::Encode(_) => FailureClass::FormatError,
            Self::Fetch { .. } | Self::Parse { .. } | Self::Conversion(_) => {
                FailureClass::ServerFailure
            }
        }
    }

    /// Short tag used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::InboundValidation(_) => "inbound_validation",
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::Conversion(_) => "conversion",
            Self::OutboundValidation(_) => "outbound_validation",
            Self::Encode(_) => "encode",
        }
    }
}
