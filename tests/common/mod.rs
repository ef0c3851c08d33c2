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

//! Recording command runner shared by the deployer tests

#![allow(dead_code)]

use kubetest_deployers::{CommandOutput, CommandRunner, CommandSpec, DeployerError, Result};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Stream,
    Capture,
    Pipe,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    /// Program and arguments joined by spaces; pipes as "producer | consumer"
    pub line: String,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Stdout(String),
    Fail { stdout: String, stderr: String },
    Delay(Duration),
}

impl Outcome {
    pub fn stdout(s: &str) -> Self {
        Outcome::Stdout(s.to_string())
    }

    pub fn fail(stderr: &str) -> Self {
        Outcome::Fail {
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Records every command and answers from scripted rules. The first rule
/// whose needle occurs in the command line wins; unmatched commands succeed
/// with empty output.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Call>>,
    rules: Mutex<Vec<(String, Outcome)>>,
}

pub fn line_of(spec: &CommandSpec) -> String {
    std::iter::once(spec.program())
        .chain(spec.argv().iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

impl FakeRunner {
    pub fn on(&self, needle: &str, outcome: Outcome) -> &Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), outcome));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.line).collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    /// Index of the first recorded call containing `needle`
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|l| l.contains(needle))
    }

    fn record(&self, kind: CallKind, line: String) {
        self.calls.lock().unwrap().push(Call { kind, line });
    }

    async fn respond(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let line = line_of(spec);
        let outcome = {
            let rules = self.rules.lock().unwrap();
            rules
                .iter()
                .find(|(needle, _)| line.contains(needle.as_str()))
                .map(|(_, outcome)| outcome.clone())
        };

        match outcome {
            None => Ok(CommandOutput::default()),
            Some(Outcome::Stdout(stdout)) => Ok(CommandOutput::from_stdout(stdout)),
            Some(Outcome::Fail { stdout, stderr }) => Err(DeployerError::command_failed(
                line,
                "exit status: 1",
                stdout.as_bytes(),
                stderr.as_bytes(),
            )),
            Some(Outcome::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(CommandOutput::default())
            }
        }
    }
}

#[async_trait::async_trait]
impl CommandRunner for FakeRunner {
    async fn stream(&self, command: &CommandSpec) -> Result<()> {
        self.record(CallKind::Stream, line_of(command));
        self.respond(command).await.map(|_| ())
    }

    async fn capture(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.record(CallKind::Capture, line_of(command));
        self.respond(command).await
    }

    async fn pipe(&self, producer: &CommandSpec, consumer: &CommandSpec) -> Result<()> {
        self.record(
            CallKind::Pipe,
            format!("{} | {}", line_of(producer), line_of(consumer)),
        );
        self.respond(producer).await?;
        self.respond(consumer).await.map(|_| ())
    }
}
