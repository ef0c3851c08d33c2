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
    DEFAULT_ARTIFACTS_DIR, DEFAULT_KIND_CLUSTER_NAME, LOGS_DIR_NAME,
};
use crate::shared::error::{DeployerError, Result};
use std::path::PathBuf;

/// Settings for the kind deployer. Built once from defaults, the deployer
/// file and flags; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    /// `--name` for every kind command
    pub cluster_name: String,
    /// `--loglevel` for kind commands
    pub log_level: Option<String>,
    /// Node image used by both `build node-image` and `create cluster`
    pub image_name: Option<String>,
    /// `--type` for `build node-image`
    pub build_type: Option<String>,
    /// `--config` for `create cluster`
    pub config_path: Option<PathBuf>,
    /// `--kubeconfig` for `create cluster`; also what `kubeconfig()` reports
    pub kubeconfig_path: Option<PathBuf>,
    /// `--kube-root` for `build node-image`
    pub kube_root: Option<PathBuf>,
    /// `--verbosity`; zero leaves it off
    pub verbosity: u32,
    /// Destination for `export logs`
    pub logs_dir: PathBuf,
    /// Whether the harness runs a build step in this invocation
    pub should_build: bool,
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            cluster_name: DEFAULT_KIND_CLUSTER_NAME.to_string(),
            log_level: None,
            image_name: None,
            build_type: None,
            config_path: None,
            kubeconfig_path: None,
            kube_root: None,
            verbosity: 0,
            logs_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR).join(LOGS_DIR_NAME),
            should_build: false,
        }
    }
}

impl KindConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(DeployerError::config_error("cluster-name must not be empty"));
        }
        if self.config_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            return Err(DeployerError::config_error("config path must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KindConfig::default();
        assert_eq!(config.cluster_name, "kind-kubetest2");
        assert_eq!(config.logs_dir, PathBuf::from("_artifacts/logs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_cluster_name_rejected() {
        let config = KindConfig {
            cluster_name: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DeployerError::Config(_))));
    }
}
