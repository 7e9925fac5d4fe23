//! Router Module Index
//!
//! Routes are split by audience so each module's access rules can be read in one place.

/// Routes accessible to anonymous clients.
pub mod public;

/// The card resource. Every route resolves the current user.
pub mod cards;
