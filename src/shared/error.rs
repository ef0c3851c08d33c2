// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeployerError>;

#[derive(Error, Debug)]
pub enum DeployerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed ({status}): stdout: {stdout:?}, stderr: {stderr:?}")]
    CommandFailed {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// A read-only query failed; `output` holds everything the tool printed.
    #[error("{source}\n{output}")]
    QueryFailed {
        #[source]
        source: Box<DeployerError>,
        output: String,
    },

    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<DeployerError>,
    },

    #[error("Could not determine the home directory")]
    HomeDirUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl DeployerError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn command_failed(
        command: impl Into<String>,
        status: impl Into<String>,
        stdout: &[u8],
        stderr: &[u8],
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.into(),
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }

    pub fn step(step: &'static str, source: DeployerError) -> Self {
        Self::Step {
            step,
            source: Box::new(source),
        }
    }

    /// True when this error, or any error it wraps, is a deadline expiry.
    pub fn is_deadline_exceeded(&self) -> bool {
        match self {
            Self::DeadlineExceeded(_) => true,
            Self::Step { source, .. } | Self::QueryFailed { source, .. } => {
                source.is_deadline_exceeded()
            }
            _ => false,
        }
    }

    /// Captured stderr of the innermost failed command, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => Some(stderr),
            Self::Step { source, .. } | Self::QueryFailed { source, .. } => source.stderr(),
            _ => None,
        }
    }
}

/// Extension for attaching a step name to a fallible result.
pub trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T> StepContext<T> for Result<T> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|e| DeployerError::step(step, e))
    }
}
