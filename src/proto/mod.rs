//! Remediation-protocol surface: the parsed response tree received from the
//! server and the collaborator interfaces that produce it. The engine never
//! sees wire bytes; transports implement [`client::ProtocolClient`] and hand
//! over [`response::RemediationResponse`] trees.

pub mod client;
pub mod response;
