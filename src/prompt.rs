//! Deterministic prompt construction for the generation backend.
//!
//! The prompt restates the user's operation, lists every input file exactly
//! once in input order, and appends a fixed block of generation constraints.
//! Rendering performs no I/O and is byte-stable for identical inputs.

use crate::error::{Error, Result};
use crate::paths;
use std::fmt::Write;

/// Model identifier sent to the generation backend.
pub const MODEL: &str = "gpt-4";

/// Fixed system instruction for every generation request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an FFMPEG expert. Generate precise FFMPEG commands based on user requirements.";

/// Temperature pinned near zero so identical prompts yield identical commands.
pub const TEMPERATURE: f64 = 0.0;

/// Response token ceiling.
pub const MAX_TOKENS: u32 = 1000;

/// A validated generation request: a non-empty instruction plus a non-empty,
/// ordered list of input file paths. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    instruction: String,
    file_paths: Vec<String>,
}

impl PromptRequest {
    /// Validates and builds a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the instruction is empty or
    /// whitespace-only, or when no file paths are given. This guard runs
    /// before the generation client is ever invoked.
    pub fn new(instruction: &str, file_paths: Vec<String>) -> Result<Self> {
        if instruction.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "instruction must not be empty".to_string(),
            ));
        }
        if file_paths.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one input file is required".to_string(),
            ));
        }
        Ok(Self {
            instruction: instruction.to_string(),
            file_paths,
        })
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn file_paths(&self) -> &[String] {
        &self.file_paths
    }

    /// Renders the user prompt. Paths are embedded with forward slashes only;
    /// the constraint block is fixed and not user-configurable.
    pub fn render(&self) -> String {
        let mut listing = String::new();
        for (index, path) in self.file_paths.iter().enumerate() {
            let _ = writeln!(
                listing,
                "{}. {}",
                index + 1,
                paths::normalize_separators(path)
            );
        }

        format!(
            "Generate an FFMPEG command for the following operation:\n\
Operation: {}\n\
\n\
Input files:\n\
{}\n\
Requirements:\n\
1. Return ONLY the FFMPEG command, nothing else\n\
2. Quote every file path and use forward slashes in paths\n\
3. Include all necessary parameters for the operation\n\
4. Make sure the output file has \"_neta\" suffix\n\
5. If multiple outputs are needed, use numbered suffixes (_neta_1, _neta_2, etc.)\n\
6. Prioritize speed and performance. Use the fastest options available that do not compromise the requested operation.\n\
7. If the user is asking to convert a .ts (MPEG-TS) file, use the -c copy option to avoid re-encoding unless otherwise specified.\n\
\n\
Example format:\n\
ffmpeg -i \"input.mp4\" -vf scale=1280:720 -c:v libx264 -crf 23 \"input_neta.mp4\"\n\
\n\
Example for .ts file conversion (no re-encoding):\n\
ffmpeg -i \"input.ts\" -c copy \"input_neta.mp4\"",
            self.instruction, listing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(instruction: &str, paths: &[&str]) -> Result<PromptRequest> {
        PromptRequest::new(instruction, paths.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn empty_instruction_is_rejected() {
        let result = request("   ", &["/media/clip.mp4"]);
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let result = request("Extract audio", &[]);
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn render_is_deterministic() {
        let a = request("Extract audio", &["/media/clip.mp4"]).unwrap();
        let b = request("Extract audio", &["/media/clip.mp4"]).unwrap();
        assert_eq!(a.render(), b.render());
    }

    #[test]
    fn render_lists_every_path_once_in_order() {
        let req = request(
            "Concatenate these",
            &["/media/b.mp4", "/media/a.mp4", "/media/c.mp4"],
        )
        .unwrap();
        let prompt = req.render();

        assert_eq!(prompt.matches("/media/b.mp4").count(), 1);
        assert_eq!(prompt.matches("/media/a.mp4").count(), 1);
        assert_eq!(prompt.matches("/media/c.mp4").count(), 1);

        let pos_b = prompt.find("/media/b.mp4").unwrap();
        let pos_a = prompt.find("/media/a.mp4").unwrap();
        let pos_c = prompt.find("/media/c.mp4").unwrap();
        assert!(pos_b < pos_a && pos_a < pos_c);
    }

    #[test]
    fn render_numbers_the_file_listing() {
        let req = request("Merge", &["/a.mp4", "/b.mp4"]).unwrap();
        let prompt = req.render();
        assert!(prompt.contains("1. /a.mp4"));
        assert!(prompt.contains("2. /b.mp4"));
    }

    #[test]
    fn render_embeds_forward_slash_paths() {
        let req = request("Convert", &["C:\\media\\clip.mp4"]).unwrap();
        let prompt = req.render();
        assert!(prompt.contains("C:/media/clip.mp4"));
        assert!(!prompt.contains("C:\\media"));
    }

    #[test]
    fn render_restates_the_operation() {
        let req = request("Extract audio and save as MP3", &["/clip.mp4"]).unwrap();
        assert!(req
            .render()
            .contains("Operation: Extract audio and save as MP3"));
    }

    #[test]
    fn render_carries_the_output_suffix_constraint() {
        let req = request("Convert", &["/clip.mp4"]).unwrap();
        let prompt = req.render();
        assert!(prompt.contains("_neta"));
        assert!(prompt.contains("_neta_1, _neta_2"));
    }
}
