//! Provider selection and the resolution engine.
//!
//! [`Resolver`] searches for providers over a registry snapshot and records
//! its choices in a [`ResolutionTransaction`]. [`ResolutionEngine`] owns the
//! registry behind a single lock and commits successful transactions.

mod engine;
mod policy;
mod resolver;
mod transaction;


pub use engine::{Resolution, ResolutionEngine};
pub use policy::ProviderPolicy;
pub use resolver::Resolver;
pub use transaction::{Checkpoint, CommittedTransaction, ResolutionTransaction};
