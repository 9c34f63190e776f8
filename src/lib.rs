pub mod acp;
pub mod agent;
pub mod cli;
pub mod core;
