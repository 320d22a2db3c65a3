//! Unit tests for the transition context.
