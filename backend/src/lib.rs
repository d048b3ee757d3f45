//! Community membership and admin-succession core for the MealFlow backend.
//!
//! The crate is laid out as a hexagon: [`domain`] holds the model, the
//! services and the ports they depend on, [`outbound`] holds adapters and
//! [`config`] resolves runtime settings.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
