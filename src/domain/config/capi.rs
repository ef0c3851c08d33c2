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


use crate::infrastructure::constants::{
    DEFAULT_MACHINE_COUNT, DEFAULT_UP_TIMEOUT, DEFAULT_WORKLOAD_CLUSTER_NAME,
};
use crate::shared::error::{DeployerError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the Cluster API deployer.
///
/// Machine counts are handed to `clusterctl` verbatim and are not parsed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapiConfig {
    pub provider: String,
    pub kubernetes_version: String,
    pub control_plane_machine_count: String,
    pub worker_machine_count: String,
    pub flavor: String,
    /// Use the currently targeted cluster as the management cluster
    pub use_existing_cluster: bool,
    pub up_timeout: Duration,
    /// Apply the Calico CNI once the workload cluster is ready
    pub install_calico: bool,
    pub workload_cluster_name: String,
    /// Explicit workload kubeconfig; skips fetching it with clusterctl
    pub kubecfg_path: Option<PathBuf>,
}

impl Default for CapiConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            kubernetes_version: String::new(),
            control_plane_machine_count: DEFAULT_MACHINE_COUNT.to_string(),
            worker_machine_count: DEFAULT_MACHINE_COUNT.to_string(),
            flavor: String::new(),
            use_existing_cluster: false,
            up_timeout: DEFAULT_UP_TIMEOUT,
            install_calico: false,
            workload_cluster_name: DEFAULT_WORKLOAD_CLUSTER_NAME.to_string(),
            kubecfg_path: None,
        }
    }
}

impl CapiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workload_cluster_name.trim().is_empty() {
            return Err(DeployerError::config_error(
                "workload-cluster-name must not be empty",
            ));
        }
        Ok(())
    }

    /// Checks what `up` needs on top of [`CapiConfig::validate`].
    pub fn validate_for_up(&self) -> Result<()> {
        self.validate()?;
        if self.provider.trim().is_empty() {
            return Err(DeployerError::config_error(
                "provider is required (use --provider)",
            ));
        }
        if self.kubernetes_version.trim().is_empty() {
            return Err(DeployerError::config_error(
                "kubernetes-version is required (use --kubernetes-version)",
            ));
        }
        if self.up_timeout.is_zero() {
            return Err(DeployerError::config_error("up-timeout must be > 0"));
        }
        Ok(())
    }
}
