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


use super::{Deployer, KindDeployer};
use crate::domain::config::{CapiConfig, KindConfig};
use crate::infrastructure::constants::{CAPI_DEPLOYER_NAME, KUBECTL_BIN};
use crate::infrastructure::process::{CommandRunner, CommandSpec, Deadline, SystemRunner};
use crate::shared::error::{Result, StepContext};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// Deploys a Cluster API workload cluster.
///
/// A kind cluster serves as the management cluster. `up` creates it (unless
/// an existing cluster is reused), installs the Cluster API components, then
/// has `clusterctl` render the workload cluster manifest and streams it into
/// `kubectl apply`. `is_up`, `dump_cluster_logs` and `build` act on the kind
/// cluster only.
pub struct CapiDeployer {
    pub(super) config: CapiConfig,
    pub(super) kind: KindDeployer,
    pub(super) runner: Arc<dyn CommandRunner>,
    /// Workload kubeconfig fetched from clusterctl, written once per process
    pub(super) workload_kubeconfig: OnceCell<PathBuf>,
}

impl CapiDeployer {
    pub fn new(config: CapiConfig, kind_config: KindConfig) -> Self {
        Self::with_runner(config, kind_config, Arc::new(SystemRunner::new()))
    }

    pub fn with_runner(
        config: CapiConfig,
        kind_config: KindConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            kind: KindDeployer::with_runner(kind_config, runner.clone()),
            runner,
            workload_kubeconfig: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CapiConfig {
        &self.config
    }

    pub fn delete_workload_command(&self) -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN).args([
            "delete",
            "--ignore-not-found",
            "--wait",
            "cluster",
            self.config.workload_cluster_name.as_str(),
        ])
    }
}

#[async_trait::async_trait]
impl Deployer for CapiDeployer {
    fn name(&self) -> &'static str {
        CAPI_DEPLOYER_NAME
    }

    fn cluster_name(&self) -> &str {
        self.kind.cluster_name()
    }

    async fn up(&self) -> Result<()> {
        self.config.validate_for_up()?;
        if !self.config.use_existing_cluster {
            self.kind.config().validate()?;
        }

        let deadline = Deadline::after(self.config.up_timeout);
        info!(
            provider = %self.config.provider,
            kubernetes_version = %self.config.kubernetes_version,
            workload_cluster = %self.config.workload_cluster_name,
            up_timeout = ?self.config.up_timeout,
            "bringing up Cluster API workload cluster"
        );

        if self.config.use_existing_cluster {
            info!("using the currently targeted cluster as the management cluster");
        } else {
            deadline
                .bound(self.kind.up())
                .await
                .step("create management cluster")?;
            println!("✓ Management cluster created");
        }

        self.install_management_plane(&deadline).await?;
        println!("✓ Cluster API components available");

        self.provision_workload_cluster(&deadline).await?;
        println!(
            "✓ Workload cluster {} is ready",
            self.config.workload_cluster_name
        );

        if self.config.install_calico {
            self.install_calico(&deadline).await?;
            println!("✓ Calico installed");
        }

        Ok(())
    }

    async fn down(&self) -> Result<()> {
        self.config.validate()?;
        println!("Down(): deleting workload cluster...");
        info!(
            workload_cluster = %self.config.workload_cluster_name,
            "deleting workload cluster"
        );
        let workload = self
            .runner
            .stream(&self.delete_workload_command())
            .await
            .step("delete workload cluster");

        if let Err(e) = &workload {
            warn!(error = %e, "workload cluster deletion failed, deleting management cluster anyway");
        }

        let bootstrap = self.kind.down().await;
        match (workload, bootstrap) {
            (Err(e), Err(kind_err)) => {
                error!(error = %kind_err, "management cluster deletion failed");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), result) => result,
        }
    }

    async fn is_up(&self) -> Result<bool> {
        self.kind.is_up().await
    }

    async fn dump_cluster_logs(&self) -> Result<()> {
        self.kind.dump_cluster_logs().await
    }

    async fn build(&self) -> Result<()> {
        self.kind.build().await
    }

    async fn kubeconfig(&self) -> Result<PathBuf> {
        self.resolve_kubeconfig().await
    }
}
