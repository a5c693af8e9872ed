//! Credential shapes, scope sets, clocks, and token state.

pub mod assertion;
pub mod clock;
pub mod kind;
pub mod scope;
pub mod token;

pub use assertion::*;
pub use clock::*;
pub use kind::*;
pub use scope::*;
pub use token::{secret::*, state::*};
