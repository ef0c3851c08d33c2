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


use super::command::{CommandOutput, CommandSpec};
use crate::shared::error::{DeployerError, Result};
use std::process::{ExitStatus, Stdio};
use tracing::debug;

/// Executes external programs on behalf of the deployers.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs with stdout/stderr attached to the terminal so progress is visible.
    async fn stream(&self, command: &CommandSpec) -> Result<()>;

    /// Runs with stdout/stderr captured. On failure the captured output is
    /// attached to the returned [`DeployerError::CommandFailed`].
    async fn capture(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Starts `producer` and `consumer` with the producer's stdout connected
    /// to the consumer's stdin, then waits on the producer and the consumer,
    /// in that order. Both must succeed.
    async fn pipe(&self, producer: &CommandSpec, consumer: &CommandSpec) -> Result<()>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(command: &CommandSpec, source: std::io::Error) -> DeployerError {
    DeployerError::Spawn {
        program: command.program().to_string(),
        source,
    }
}

fn check_status(command: &CommandSpec, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(DeployerError::command_failed(
            command.to_string(),
            status.to_string(),
            b"",
            b"",
        ))
    }
}

#[async_trait::async_trait]
impl CommandRunner for SystemRunner {
    async fn stream(&self, command: &CommandSpec) -> Result<()> {
        debug!(command = %command, "running");
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        let status = child.wait().await?;
        check_status(command, status)
    }

    async fn capture(&self, command: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %command, "running (captured)");
        let output = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| spawn_error(command, e))?;

        if !output.status.success() {
            return Err(DeployerError::command_failed(
                command.to_string(),
                output.status.to_string(),
                &output.stdout,
                &output.stderr,
            ));
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn pipe(&self, producer: &CommandSpec, consumer: &CommandSpec) -> Result<()> {
        debug!(producer = %producer, consumer = %consumer, "running pipeline");
        let mut producer_child = producer
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(producer, e))?;

        let producer_stdout = producer_child.stdout.take().ok_or_else(|| {
            DeployerError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("stdout of '{}' is not available", producer.program()),
            ))
        })?;
        let consumer_stdin: Stdio = producer_stdout.try_into()?;

        let mut consumer_child = consumer
            .to_command()
            .stdin(consumer_stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(consumer, e))?;

        let status = producer_child.wait().await?;
        check_status(producer, status)?;

        let status = consumer_child.wait().await?;
        check_status(consumer, status)
    }
}
