//! Argument builder for the external media tool
//!
//! Seek and duration options belong to the input they modify and are always
//! rendered directly before that input's `-i`. The tool reads them
//! positionally, so they are never appended as free-form arguments.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::model::SeekWindow;
use crate::utils::time::format_seconds;

/// One `-i` input together with the options that must precede it
#[derive(Debug, Clone, PartialEq)]
struct InputSpec {
    window: SeekWindow,
    path: PathBuf,
}

impl InputSpec {
    fn render(&self, args: &mut Vec<OsString>) {
        if let Some(start) = self.window.start {
            args.push("-ss".into());
            args.push(format_seconds(start.seconds).into());
        }
        if let Some(duration) = self.window.duration {
            args.push("-t".into());
            args.push(format_seconds(duration.seconds).into());
        }
        args.push("-i".into());
        args.push(self.path.clone().into_os_string());
    }
}

/// A fully described invocation of the external media tool
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    program: PathBuf,
    log_level: Option<String>,
    inputs: Vec<InputSpec>,
    output_options: Vec<OsString>,
    output: Option<PathBuf>,
}

impl FfmpegCommand {
    /// Start a command for the given executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            log_level: None,
            inputs: Vec::new(),
            output_options: Vec::new(),
            output: None,
        }
    }

    /// Set the tool's own log verbosity (`-v`)
    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = Some(level.to_string());
        self
    }

    /// Add an untrimmed input
    pub fn input(self, path: impl Into<PathBuf>) -> Self {
        self.input_with_window(path, SeekWindow::default())
    }

    /// Add an input trimmed to `window`
    pub fn input_with_window(mut self, path: impl Into<PathBuf>, window: SeekWindow) -> Self {
        self.inputs.push(InputSpec {
            window,
            path: path.into(),
        });
        self
    }

    /// Simple video filter chain (`-vf`)
    pub fn video_filter(mut self, graph: impl Into<String>) -> Self {
        let graph: String = graph.into();
        self.output_options.push("-vf".into());
        self.output_options.push(graph.into());
        self
    }

    /// Complex filter graph (`-filter_complex`)
    pub fn filter_complex(mut self, graph: impl Into<String>) -> Self {
        let graph: String = graph.into();
        self.output_options.push("-filter_complex".into());
        self.output_options.push(graph.into());
        self
    }

    /// Write to `path`, replacing any existing file
    pub fn overwrite_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Render arguments in the order the tool expects:
    /// globals, each input with its seek options, output options, output.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::new();

        if let Some(level) = &self.log_level {
            args.push("-v".into());
            args.push(level.into());
        }

        for input in &self.inputs {
            input.render(&mut args);
        }

        args.extend(self.output_options.iter().cloned());

        if let Some(output) = &self.output {
            args.push("-y".into());
            args.push(output.clone().into_os_string());
        }

        args
    }
}

impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.args() {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') || arg.contains(';') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
