//! Movie catalog data model shared across Phimdex crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod kind;
pub mod lenient;
pub mod movie;

pub use kind::MovieKind;
pub use movie::{MovieRecord, Taxon};
