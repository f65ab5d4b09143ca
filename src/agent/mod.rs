//! Agent surface
//!
//! Rig `Tool` implementations exposing the platform operations to an LLM
//! agent. Every tool shares one [`crate::cf::OperationsCache`], so tool
//! calls against the same org/space reuse a single operations handle and
//! `set_target`/`clear_target` affect all subsequent context-free calls.

pub mod tools;
