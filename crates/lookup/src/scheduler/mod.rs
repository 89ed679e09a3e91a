//! Launch scheduling for lookup tasks.
//!
//! This module decides when each identifier's task may send its first
//! request:
//! - [`LaunchPolicy`] describes the rate-limit policy (staggered start or
//!   fixed-interval admission)
//! - [`LaunchScheduler`] hands identifiers to workers in input order, each
//!   with the earliest instant it may start

mod launch;
mod policy;

pub use launch::{Admission, LaunchScheduler};
pub use policy::LaunchPolicy;
