//! aas-agent — a chat front-end that edits Asset Administration Shells.
//!
//! Messages arrive on a comms channel (Telegram or the console), are routed
//! to the conversation's [`agent::AasAgent`], which asks an LLM which AAS
//! operations to run via function calling and applies them to its
//! [`aas::AasWorkspace`]. Shells are persisted as AAS v3.0 JSON.

pub mod aas;
pub mod agent;
pub mod comms;
pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
