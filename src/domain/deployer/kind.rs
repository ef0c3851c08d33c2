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


use super::Deployer;
use crate::domain::config::KindConfig;
use crate::infrastructure::constants::{
    KIND_BIN, KIND_DEFAULT_BUILT_IMAGE_NAME, KIND_DEPLOYER_NAME, KUBECTL_BIN,
};
use crate::infrastructure::process::{CommandRunner, CommandSpec, SystemRunner};
use crate::shared::error::{DeployerError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Deploys a single local cluster with `kind`.
pub struct KindDeployer {
    config: KindConfig,
    runner: Arc<dyn CommandRunner>,
}

impl KindDeployer {
    pub fn new(config: KindConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner::new()))
    }

    pub fn with_runner(config: KindConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &KindConfig {
        &self.config
    }

    /// Explicit image, else the image a build in this run produces.
    fn node_image(&self) -> Option<&str> {
        match self.config.image_name.as_deref() {
            Some(image) if !image.is_empty() => Some(image),
            _ if self.config.should_build => Some(KIND_DEFAULT_BUILT_IMAGE_NAME),
            _ => None,
        }
    }

    fn verbosity(&self) -> Option<String> {
        (self.config.verbosity > 0).then(|| self.config.verbosity.to_string())
    }

    pub fn create_cluster_command(&self) -> CommandSpec {
        CommandSpec::new(KIND_BIN)
            .args(["create", "cluster", "--name", self.cluster_name()])
            .opt_arg("--loglevel", self.config.log_level.as_deref())
            .opt_arg("--image", self.node_image())
            .opt_path("--config", self.config.config_path.as_deref())
            .opt_path("--kubeconfig", self.config.kubeconfig_path.as_deref())
            .opt_arg("--verbosity", self.verbosity().as_deref())
    }

    pub fn delete_cluster_command(&self) -> CommandSpec {
        CommandSpec::new(KIND_BIN)
            .args(["delete", "cluster", "--name", self.cluster_name()])
            .opt_arg("--loglevel", self.config.log_level.as_deref())
    }

    pub fn export_logs_command(&self) -> CommandSpec {
        CommandSpec::new(KIND_BIN)
            .args(["export", "logs", "--name", self.cluster_name()])
            .arg(self.config.logs_dir.to_string_lossy())
            .opt_arg("--loglevel", self.config.log_level.as_deref())
    }

    pub fn build_node_image_command(&self) -> CommandSpec {
        CommandSpec::new(KIND_BIN)
            .args(["build", "node-image"])
            .opt_arg("--loglevel", self.config.log_level.as_deref())
            .opt_arg("--type", self.config.build_type.as_deref())
            .opt_path("--kube-root", self.config.kube_root.as_deref())
            .opt_arg("--image", self.node_image())
    }

    pub fn nodes_query_command() -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN).args(["get", "nodes", "-o=name"])
    }
}

#[async_trait::async_trait]
impl Deployer for KindDeployer {
    fn name(&self) -> &'static str {
        KIND_DEPLOYER_NAME
    }

    fn cluster_name(&self) -> &str {
        &self.config.cluster_name
    }

    async fn up(&self) -> Result<()> {
        self.config.validate()?;
        println!("Up(): creating kind cluster...");
        info!(cluster = %self.cluster_name(), image = ?self.node_image(), "creating kind cluster");
        self.runner.stream(&self.create_cluster_command()).await
    }

    async fn down(&self) -> Result<()> {
        self.config.validate()?;
        println!("Down(): deleting kind cluster...");
        info!(cluster = %self.cluster_name(), "deleting kind cluster");
        self.runner.stream(&self.delete_cluster_command()).await
    }

    async fn is_up(&self) -> Result<bool> {
        // a cluster whose API server reports nodes is considered up
        match self.runner.capture(&Self::nodes_query_command()).await {
            Ok(output) => Ok(!output.stdout_lines().is_empty()),
            Err(e) => {
                let output = match &e {
                    DeployerError::CommandFailed { stdout, stderr, .. } => {
                        format!("{}{}", stdout, stderr)
                    }
                    _ => String::new(),
                };
                Err(DeployerError::QueryFailed {
                    source: Box::new(e),
                    output,
                })
            }
        }
    }

    async fn dump_cluster_logs(&self) -> Result<()> {
        self.config.validate()?;
        println!("DumpClusterLogs(): exporting kind cluster logs...");
        info!(
            cluster = %self.cluster_name(),
            logs_dir = %self.config.logs_dir.display(),
            "exporting kind cluster logs"
        );
        self.runner.stream(&self.export_logs_command()).await
    }

    async fn build(&self) -> Result<()> {
        println!("Build(): building kind node image...");
        info!(image = ?self.node_image(), "building kind node image");
        self.runner.stream(&self.build_node_image_command()).await
    }

    async fn kubeconfig(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.kubeconfig_path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().ok_or(DeployerError::HomeDirUnavailable)?;
        Ok(home.join(".kube").join("config"))
    }
}
