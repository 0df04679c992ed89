//! Neta - AI-powered ffmpeg command generation library.
//!
//! This library turns a natural-language description of a media operation
//! plus a set of selected files into a ready-to-run ffmpeg command, and can
//! optionally execute it. It provides:
//!
//! - **Prompt construction** that deterministically renders the instruction
//!   and file list for the generation backend
//! - **Command generation** via the OpenAI API (with an offline mock)
//! - **Tokenization** of the generated free-text command into a safe
//!   argument vector, honoring quoting and escaping
//! - **Execution** of the tokenized command with captured output
//! - **Credential storage** with a lazy process-wide key-value store
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`paths`] - Path display names and separator normalization
//! - [`selection`] - Current file selection, fed by picker/drop events
//! - [`prompt`] - Validated requests and deterministic prompt rendering
//! - [`llm_generator`] - Command generation against the backend
//! - [`http_client`] - HTTP client abstraction
//! - [`tokenizer`] - Shell-like command line tokenization
//! - [`executor`] - Process execution with captured output
//! - [`pipeline`] - The request lifecycle state machine
//! - [`credential_store`] - Durable API key storage
//! - [`config`] - Configuration management
//! - [`error`] - The pipeline error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use neta::executor::Executor;
//! use neta::llm_generator::OpenAiGenerator;
//! use neta::pipeline::Pipeline;
//! use neta::selection::Selection;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let selection = Selection::from_paths(&["/media/clip.mp4".to_string()]);
//!     let mut pipeline = Pipeline::new(Box::new(OpenAiGenerator::new()), Executor::new());
//!
//!     // Generate the command, then execute it on demand
//!     let command = pipeline
//!         .submit("Extract audio and save as MP3", &selection, Some("sk-..."))
//!         .await?;
//!     println!("{}", command);
//!     let output = pipeline.run().await?;
//!     println!("{}", output);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credential_store;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod llm_generator;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod selection;
pub mod tokenizer;
