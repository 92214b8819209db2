//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the prompt building, LLM calls and post-processing so
//! route handlers can stay focused on request parsing and status codes.

pub mod chat;
pub mod estimate;
