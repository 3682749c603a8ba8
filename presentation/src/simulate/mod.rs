//! Turn-by-turn negotiation simulation

pub mod runner;
