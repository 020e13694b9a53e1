//! Inbound webhook authenticity checks.
//!
//! The only component in this module is the [`SignatureVerifier`]; parsing of
//! a verified delivery into a typed event lives in [`crate::events`].

mod signature;

pub use signature::SignatureVerifier;
