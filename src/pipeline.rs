//! The end-to-end request lifecycle state machine.
//!
//! One pipeline drives one request at a time: submit generates a command,
//! run tokenizes and executes it. Overlapping submissions are rejected by the
//! state guard rather than by locking; the single-threaded model makes the
//! guard sufficient. Every failure is terminal for its attempt and requires
//! an explicit re-submission, no retries happen anywhere.

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::llm_generator::CommandGenerator;
use crate::prompt::PromptRequest;
use crate::selection::Selection;
use crate::tokenizer;
use tracing::{info, warn};

/// Observable pipeline state.
///
/// `Completed` and `Failed` are terminal: no further transition happens
/// without a new submit, which discards the previous result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating,
    /// Holds the raw generated command text, untrusted until tokenized.
    Ready(String),
    Running,
    /// Holds the captured process output.
    Completed(String),
    /// Holds a human-readable failure reason.
    Failed(String),
}

impl PipelineState {
    /// A request is in flight; new submissions are rejected.
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineState::Generating | PipelineState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Completed(_) | PipelineState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Generating => "generating",
            PipelineState::Ready(_) => "ready",
            PipelineState::Running => "running",
            PipelineState::Completed(_) => "completed",
            PipelineState::Failed(_) => "failed",
        }
    }
}

/// Drives generation and execution for one request at a time.
pub struct Pipeline {
    state: PipelineState,
    generator: Box<dyn CommandGenerator>,
    executor: Executor,
}

impl Pipeline {
    pub fn new(generator: Box<dyn CommandGenerator>, executor: Executor) -> Self {
        Self {
            state: PipelineState::Idle,
            generator,
            executor,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Submits an instruction against the current selection and credential.
    ///
    /// The credential and file paths are snapshotted when the submit is
    /// accepted and never re-read mid-flight. On success the state is
    /// `Ready` and the generated text is returned.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Precondition`] without entering `Generating` when
    /// a request is already in flight, the credential is missing, or no files
    /// are selected; with [`Error::InvalidRequest`] when the instruction is
    /// empty; and with the generator's error (moving to `Failed`) when
    /// generation itself fails.
    pub async fn submit(
        &mut self,
        instruction: &str,
        selection: &Selection,
        api_key: Option<&str>,
    ) -> Result<String> {
        if self.state.is_busy() {
            warn!("Submit rejected: pipeline is {}", self.state.name());
            return Err(Error::Precondition(
                "a request is already in flight".to_string(),
            ));
        }

        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key.to_string(),
            _ => {
                return Err(Error::Precondition(
                    "no API key configured".to_string(),
                ));
            }
        };
        if selection.is_empty() {
            return Err(Error::Precondition("no files selected".to_string()));
        }

        // Snapshot taken here; guards above run before entering Generating.
        let request = PromptRequest::new(instruction, selection.file_paths())?;

        info!("Generating command for: {}", instruction);
        self.state = PipelineState::Generating;

        match self.generator.generate(&api_key, &request).await {
            Ok(text) => {
                info!("Command ready");
                self.state = PipelineState::Ready(text.clone());
                Ok(text)
            }
            Err(err) => {
                warn!("Generation failed: {}", err);
                self.state = PipelineState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Tokenizes the ready command and executes it.
    ///
    /// Tokenization happens synchronously before dispatch; a tokenizer
    /// failure moves straight to `Failed` without invoking any process.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Precondition`] (state unchanged) when no command
    /// is ready, [`Error::MalformedCommand`] when tokenization fails, or
    /// [`Error::Execution`] when the process fails.
    pub async fn run(&mut self) -> Result<String> {
        let text = match &self.state {
            PipelineState::Ready(text) => text.clone(),
            _ => {
                return Err(Error::Precondition(
                    "no generated command is ready to run".to_string(),
                ));
            }
        };

        let parsed = match tokenizer::tokenize(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Tokenization failed: {}", err);
                self.state = PipelineState::Failed(err.to_string());
                return Err(err);
            }
        };

        info!("Running: {}", parsed.to_command_line());
        self.state = PipelineState::Running;

        match self.executor.run_parsed(&parsed).await {
            Ok(output) => {
                self.state = PipelineState::Completed(output.clone());
                Ok(output)
            }
            Err(err) => {
                warn!("Execution failed: {}", err);
                self.state = PipelineState::Failed(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ProcessRunner;
    use crate::llm_generator::MockGenerator;
    use async_trait::async_trait;
    use std::os::unix::process::ExitStatusExt;
    use std::process::{ExitStatus, Output};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Generator that always fails with a transport error.
    struct FailingGenerator;

    #[async_trait]
    impl CommandGenerator for FailingGenerator {
        async fn generate(&self, _api_key: &str, _request: &PromptRequest) -> Result<String> {
            Err(Error::Transport("connection refused".to_string()))
        }
    }

    /// Generator that answers with prose and no ffmpeg command.
    struct ProseGenerator;

    #[async_trait]
    impl CommandGenerator for ProseGenerator {
        async fn generate(&self, _api_key: &str, _request: &PromptRequest) -> Result<String> {
            Ok("I am sorry, I cannot help with that.".to_string())
        }
    }

    /// Process runner counting invocations.
    struct CountingRunner {
        invocations: Arc<AtomicUsize>,
        succeed: bool,
    }

    impl CountingRunner {
        fn new(succeed: bool) -> (Self, Arc<AtomicUsize>) {
            let invocations = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    invocations: Arc::clone(&invocations),
                    succeed,
                },
                invocations,
            )
        }
    }

    impl ProcessRunner for CountingRunner {
        fn run(&self, _program: &str, _args: &[&str]) -> std::io::Result<Output> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            let status = if self.succeed {
                ExitStatus::from_raw(0)
            } else {
                ExitStatus::from_raw(1 << 8)
            };
            Ok(Output {
                status,
                stdout: b"converted\n".to_vec(),
                stderr: if self.succeed {
                    vec![]
                } else {
                    b"boom\n".to_vec()
                },
            })
        }

        fn program_exists(&self, _program: &str) -> bool {
            true
        }
    }

    fn selection() -> Selection {
        Selection::from_paths(&["/media/clip.mp4".to_string()])
    }

    fn mock_pipeline(succeed: bool) -> (Pipeline, Arc<AtomicUsize>) {
        let (runner, invocations) = CountingRunner::new(succeed);
        let pipeline = Pipeline::new(
            Box::new(MockGenerator::new()),
            Executor::with_runner(Box::new(runner)),
        );
        (pipeline, invocations)
    }

    #[tokio::test]
    async fn submit_without_key_fails_before_generating() {
        let (mut pipeline, _) = mock_pipeline(true);
        let result = pipeline.submit("Extract audio", &selection(), None).await;

        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn submit_without_files_fails_before_generating() {
        let (mut pipeline, _) = mock_pipeline(true);
        let result = pipeline
            .submit("Extract audio", &Selection::new(), Some("sk-test"))
            .await;

        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn submit_with_empty_instruction_is_invalid() {
        let (mut pipeline, _) = mock_pipeline(true);
        let result = pipeline.submit("  ", &selection(), Some("sk-test")).await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn successful_submit_reaches_ready() {
        let (mut pipeline, _) = mock_pipeline(true);
        let text = pipeline
            .submit("Extract audio as MP3", &selection(), Some("sk-test"))
            .await
            .unwrap();

        assert!(text.starts_with("ffmpeg"));
        assert_eq!(*pipeline.state(), PipelineState::Ready(text));
    }

    #[tokio::test]
    async fn generator_failure_reaches_failed() {
        let (runner, _) = CountingRunner::new(true);
        let mut pipeline = Pipeline::new(
            Box::new(FailingGenerator),
            Executor::with_runner(Box::new(runner)),
        );

        let result = pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(matches!(pipeline.state(), PipelineState::Failed(_)));
    }

    #[tokio::test]
    async fn submit_while_generating_is_rejected() {
        let (mut pipeline, _) = mock_pipeline(true);
        pipeline.state = PipelineState::Generating;

        let result = pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await;

        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(*pipeline.state(), PipelineState::Generating);
    }

    #[tokio::test]
    async fn submit_while_running_is_rejected() {
        let (mut pipeline, _) = mock_pipeline(true);
        pipeline.state = PipelineState::Running;

        let result = pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await;

        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(*pipeline.state(), PipelineState::Running);
    }

    #[tokio::test]
    async fn run_without_ready_command_is_a_precondition_error() {
        let (mut pipeline, invocations) = mock_pipeline(true);
        let result = pipeline.run().await;

        assert!(matches!(result, Err(Error::Precondition(_))));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_command_fails_without_invoking_a_process() {
        let (runner, invocations) = CountingRunner::new(true);
        let mut pipeline = Pipeline::new(
            Box::new(ProseGenerator),
            Executor::with_runner(Box::new(runner)),
        );

        pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await
            .unwrap();
        let result = pipeline.run().await;

        assert!(matches!(result, Err(Error::MalformedCommand(_))));
        assert!(matches!(pipeline.state(), PipelineState::Failed(_)));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_run_reaches_completed_with_output() {
        let (mut pipeline, invocations) = mock_pipeline(true);
        pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await
            .unwrap();

        let output = pipeline.run().await.unwrap();

        assert_eq!(output, "converted\n");
        assert_eq!(*pipeline.state(), PipelineState::Completed(output));
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_run_reaches_failed_with_reason() {
        let (mut pipeline, _) = mock_pipeline(false);
        pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await
            .unwrap();

        let result = pipeline.run().await;

        assert!(matches!(result, Err(Error::Execution(_))));
        match pipeline.state() {
            PipelineState::Failed(reason) => assert!(reason.contains("boom")),
            state => panic!("expected failed state, got {}", state.name()),
        }
    }

    #[tokio::test]
    async fn terminal_state_accepts_a_new_submit() {
        let (mut pipeline, _) = mock_pipeline(true);
        pipeline
            .submit("Extract audio", &selection(), Some("sk-test"))
            .await
            .unwrap();
        pipeline.run().await.unwrap();
        assert!(pipeline.state().is_terminal());

        let text = pipeline
            .submit("Convert to gif", &selection(), Some("sk-test"))
            .await
            .unwrap();

        // The previous result is discarded wholesale.
        assert_eq!(*pipeline.state(), PipelineState::Ready(text));
    }
}
