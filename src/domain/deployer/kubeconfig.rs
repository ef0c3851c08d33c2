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


//! Workload cluster kubeconfig, fetched once with clusterctl

use super::CapiDeployer;
use crate::infrastructure::constants::{
    CLUSTERCTL_BIN, KUBECONFIG_FILE_MODE, KUBECONFIG_FILE_NAME, KUBECONFIG_TEMP_PREFIX,
};
use crate::infrastructure::process::CommandSpec;
use crate::shared::error::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

impl CapiDeployer {
    pub fn get_kubeconfig_command(&self) -> CommandSpec {
        CommandSpec::new(CLUSTERCTL_BIN).args([
            "get",
            "kubeconfig",
            self.config.workload_cluster_name.as_str(),
        ])
    }

    /// Explicit path if configured, else the fetched workload kubeconfig.
    /// A failed fetch is not remembered; the next call tries again.
    pub(super) async fn resolve_kubeconfig(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.kubecfg_path {
            return Ok(path.clone());
        }
        self.workload_kubeconfig
            .get_or_try_init(|| self.fetch_kubeconfig())
            .await
            .cloned()
    }

    async fn fetch_kubeconfig(&self) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(KUBECONFIG_TEMP_PREFIX)
            .tempdir()?;
        let output = self.runner.capture(&self.get_kubeconfig_command()).await?;

        let path = dir.path().join(KUBECONFIG_FILE_NAME);
        write_private(&path, &output.stdout).await?;
        // the file must outlive this call; keep the directory on disk
        let dir = dir.keep();
        debug!(dir = %dir.display(), "wrote workload kubeconfig");
        Ok(path)
    }
}

async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(KUBECONFIG_FILE_MODE);
    #[cfg(not(unix))]
    let _ = KUBECONFIG_FILE_MODE;

    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.flush().await
}
