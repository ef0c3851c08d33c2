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


//! Idempotent installation of the Cluster API management components

use super::CapiDeployer;
use crate::infrastructure::constants::{
    CLUSTERCTL_BIN, KUBECTL_BIN, MISSING_RESOURCE_TYPE_MARKER, WAIT_FOREVER,
};
use crate::infrastructure::process::{CommandSpec, Deadline};
use crate::shared::error::{Result, StepContext};
use std::path::Path;
use tracing::{info, warn};

/// True when kubectl reports that the queried resource type does not exist,
/// i.e. the Cluster API CRDs are not installed yet.
///
/// This matches free text printed by kubectl and will miss if that wording
/// ever changes.
pub fn is_missing_resource_type(stderr: &str) -> bool {
    stderr.contains(MISSING_RESOURCE_TYPE_MARKER)
}

/// `kubectl wait` for every deployment in every namespace to be Available.
pub(super) fn wait_all_deployments_command(kubeconfig: Option<&Path>) -> CommandSpec {
    CommandSpec::new(KUBECTL_BIN)
        .opt_path("--kubeconfig", kubeconfig)
        .args([
            "wait",
            "--for=condition=Available",
            "--all",
            "--all-namespaces",
            "deployment",
            WAIT_FOREVER,
        ])
}

impl CapiDeployer {
    pub fn provider_query_command(&self) -> CommandSpec {
        CommandSpec::new(KUBECTL_BIN)
            .args(["get", "providers", "--all-namespaces"])
            .arg(format!(
                "--field-selector=metadata.name=infrastructure-{}",
                self.config.provider
            ))
            .arg("--ignore-not-found")
    }

    pub fn init_command(&self) -> CommandSpec {
        CommandSpec::new(CLUSTERCTL_BIN).args([
            "init",
            "--infrastructure",
            self.config.provider.as_str(),
        ])
    }

    async fn management_plane_installed(&self, deadline: &Deadline) -> Result<bool> {
        match deadline
            .bound(self.runner.capture(&self.provider_query_command()))
            .await
        {
            Ok(output) => Ok(!output.stdout_lines().is_empty()),
            Err(e) if e.stderr().is_some_and(is_missing_resource_type) => {
                warn!("Cluster API resource types not found, treating management plane as absent");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub(super) async fn install_management_plane(&self, deadline: &Deadline) -> Result<()> {
        println!("Up(): installing Cluster API...");
        let installed = self
            .management_plane_installed(deadline)
            .await
            .step("query infrastructure providers")?;

        if installed {
            info!(provider = %self.config.provider, "infrastructure provider present, skipping clusterctl init");
        } else {
            info!(provider = %self.config.provider, "initializing management cluster");
            deadline
                .bound(self.runner.stream(&self.init_command()))
                .await
                .step("initialize management cluster")?;
        }

        println!("Waiting for Cluster API to start...");
        deadline
            .bound(self.runner.stream(&wait_all_deployments_command(None)))
            .await
            .step("wait for Cluster API components")
    }
}
