//! API request handlers.
//!
//! Every protected handler runs its authorization check before any storage
//! read or write for the target resource.

use crate::auth::guard::Access;
use crate::types::Result;

/// Login handler.
pub mod auth;
/// Character creation and retrieval handlers.
pub mod characters;
/// Player account handlers (register, profile, password, deletion).
pub mod players;

/// Turns a denied check into a 403, logging who was refused what.
pub(crate) fn enforce(access: Access, caller: &str, resource: &str) -> Result<()> {
    if !access.is_allowed() {
        tracing::warn!(%caller, %resource, "access denied");
    }
    access.require()
}
