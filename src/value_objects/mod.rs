// Copyright 2025 Cowboy AI, LLC.

//! Immutable numeric value objects
//!
//! Every type here validates on construction and never exposes a way to
//! reach an invalid state afterwards. Operations return new values.

mod money;
mod period;
mod rate;

pub use money::{Currency, Money};
pub use period::Period;
pub use rate::Rate;

