//! Review session and jury consensus context.

pub mod domain;

#[cfg(test)]
mod tests;
