//! Schoolmate keeps user-authored tutoring chatbots on the local machine and
//! talks to the Schoolmate chat service on their behalf.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chatbot profile model, the versioned profile store and
//!   its key-value substrates, configuration, and the anonymous session id.
//! - [`api`] defines the chat service payloads and a small HTTP client.
//! - [`cli`] parses arguments and runs the commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
