//! Token secrets and the mutable-by-replacement token state.

pub mod secret;
pub mod state;
