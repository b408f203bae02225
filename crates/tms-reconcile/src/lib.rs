//! Username reconciliation for spreadsheet imports.
//!
//! The e-learning export identifies people by username only. [`reconcile`]
//! matches those usernames against the `ilias_name` of known students and
//! reports what is left over on both sides. Manual corrections are kept as
//! [`Override`]s and survive a [`Reconciliation::refresh`] as long as the
//! username and the student still exist.

#![deny(unsafe_code)]

mod mapping;
mod reconcile;

pub use mapping::IliasNameMapping;
pub use reconcile::{Override, ReconcileSummary, Reconciliation, reconcile};
