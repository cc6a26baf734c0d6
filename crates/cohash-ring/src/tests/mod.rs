//! Behavioral tests for the ring as a whole.

mod helpers;
