//! Application services for transition validation.

mod validator;

pub use validator::{TransitionError, TransitionResult, TransitionValidator};
