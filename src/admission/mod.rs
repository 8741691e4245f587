//! Admission review protocol: envelope decoding, schema checks and
//! response encoding.

pub mod encoder;
pub mod error;
pub mod review;
pub mod schema;
pub mod scheme;

pub use error::{AdmissionError, Failure, Stage};
pub use review::{ReviewEnvelope, ReviewRequest, ReviewResponse};
pub use schema::{ResourceKind, SchemaIdentity};
pub use scheme::{Decoder, Scheme};
