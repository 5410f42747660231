//! Debt Collector Pro - Collections Conversation Training Simulator
//!
//! This crate runs a single role-play session between a trainee collections
//! agent and a model-simulated customer, then asks the model for a
//! supervisor-style evaluation of the finished transcript.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
