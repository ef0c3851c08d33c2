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


//! Workload cluster provisioning on top of the management cluster

use super::management::wait_all_deployments_command;
use super::CapiDeployer;
use crate::infrastructure::constants::{
    CALICO_MANIFEST_URL, CLUSTERCTL_BIN, KUBECTL_BIN, WAIT_FOREVER,
};
use crate::infrastructure::process::{CommandSpec, Deadline};
use crate::shared::error::{Result, StepContext};
use std::path::Path;
use tracing::info;

impl CapiDeployer {
    /// `clusterctl config cluster`, which prints the workload cluster manifest.
    pub fn render_cluster_command(&self) -> CommandSpec {
        let c = &self.config;
        CommandSpec::new(CLUSTERCTL_BIN)
            .args(["config", "cluster", c.workload_cluster_name.as_str()])
            .args(["--infrastructure", c.provider.as_str()])
            .args(["--kubernetes-version", c.kubernetes_version.as_str()])
            .args(["--worker-machine-count", c.worker_machine_count.as_str()])
            .args([
                "--control-plane-machine-count",
                c.control_plane_machine_count.as_str(),
            ])
            .args(["--flavor", c.flavor.as_str()])
    }

    pub fn apply_manifest_command() -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN).args(["apply", "-f", "-"])
    }

    pub fn wait_cluster_ready_command(&self) -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN)
            .args(["wait", "--for=condition=Ready"])
            .arg(format!("cluster/{}", self.config.workload_cluster_name))
            .arg(WAIT_FOREVER)
    }

    pub fn calico_apply_command(kubeconfig: &Path) -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN)
            .opt_path("--kubeconfig", Some(kubeconfig))
            .args(["apply", "-f", CALICO_MANIFEST_URL])
    }

    pub(super) async fn provision_workload_cluster(&self, deadline: &Deadline) -> Result<()> {
        info!(
            workload_cluster = %self.config.workload_cluster_name,
            flavor = %self.config.flavor,
            "applying workload cluster manifest"
        );
        deadline
            .bound(
                self.runner
                    .pipe(&self.render_cluster_command(), &Self::apply_manifest_command()),
            )
            .await
            .step("apply workload cluster manifest")?;

        println!("Waiting for cluster to become ready...");
        deadline
            .bound(self.runner.stream(&self.wait_cluster_ready_command()))
            .await
            .step("wait for workload cluster")
    }

    pub(super) async fn install_calico(&self, deadline: &Deadline) -> Result<()> {
        let kubeconfig = deadline
            .bound(self.resolve_kubeconfig())
            .await
            .step("fetch workload kubeconfig")?;

        info!(kubeconfig = %kubeconfig.display(), "installing calico");
        deadline
            .bound(self.runner.stream(&Self::calico_apply_command(&kubeconfig)))
            .await
            .step("apply calico manifest")?;

        deadline
            .bound(
                self.runner
                    .stream(&wait_all_deployments_command(Some(&kubeconfig))),
            )
            .await
            .step("wait for calico")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{CapiConfig, KindConfig};

    fn deployer() -> CapiDeployer {
        CapiDeployer::new(
            CapiConfig {
                provider: "aws".to_string(),
                kubernetes_version: "v1.20.0".to_string(),
                worker_machine_count: "2".to_string(),
                control_plane_machine_count: "3".to_string(),
                flavor: String::new(),
                workload_cluster_name: "wl".to_string(),
                ..Default::default()
            },
            KindConfig::default(),
        )
    }

    #[test]
    fn test_render_cluster_args() {
        assert_eq!(
            deployer().render_cluster_command().argv(),
            [
                "config",
                "cluster",
                "wl",
                "--infrastructure",
                "aws",
                "--kubernetes-version",
                "v1.20.0",
                "--worker-machine-count",
                "2",
                "--control-plane-machine-count",
                "3",
                "--flavor",
                ""
            ]
        );
    }

    #[test]
    fn test_wait_and_calico_args() {
        assert_eq!(
            deployer().wait_cluster_ready_command().argv(),
            ["wait", "--for=condition=Ready", "cluster/wl", "--timeout=-1m"]
        );
        assert_eq!(
            CapiDeployer::calico_apply_command(Path::new("/tmp/kc")).argv(),
            ["--kubeconfig", "/tmp/kc", "apply", "-f", CALICO_MANIFEST_URL]
        );
    }
}
