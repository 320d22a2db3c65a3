//! Unit tests for the artifact context.
