//! Coordinator test suite.

mod helpers;

mod aggregation;
mod lifecycle;
