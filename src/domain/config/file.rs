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


//! Optional TOML deployer file
//!
//! Keys mirror the flag names. Anything left out falls back to the built-in
//! defaults; anything given on the command line wins over the file.
//!
//! ```toml
//! [kind]
//! cluster-name = "mgmt"
//! loglevel = "debug"
//!
//! [capi]
//! provider = "docker"
//! kubernetes-version = "v1.20.0"
//! up-timeout = "45m"
//! ```

use crate::shared::error::{DeployerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployerConfFile {
    pub kind: KindConf,
    pub capi: CapiConf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct KindConf {
    pub cluster_name: Option<String>,
    pub loglevel: Option<String>,
    pub image_name: Option<String>,
    pub build_type: Option<String>,
    pub config: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
    pub kube_root: Option<PathBuf>,
    pub verbosity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CapiConf {
    pub provider: Option<String>,
    pub kubernetes_version: Option<String>,
    pub control_plane_machine_count: Option<String>,
    pub worker_machine_count: Option<String>,
    pub flavor: Option<String>,
    pub use_existing_cluster: Option<bool>,
    pub up_timeout: Option<String>,
    pub install_calico: Option<bool>,
    pub workload_cluster_name: Option<String>,
    pub kubecfg_path: Option<PathBuf>,
}

impl DeployerConfFile {
    /// Load the deployer file from TOML
    pub fn from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            DeployerError::config_error(format!(
                "Failed to read deployer file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_both_tables() {
        let conf = DeployerConfFile::from_toml(
            r#"
            [kind]
            cluster-name = "mgmt"
            verbosity = 3

            [capi]
            provider = "aws"
            worker-machine-count = "2"
            use-existing-cluster = true
            up-timeout = "45m"
            "#,
        )
        .unwrap();

        assert_eq!(conf.kind.cluster_name.as_deref(), Some("mgmt"));
        assert_eq!(conf.kind.verbosity, Some(3));
        assert_eq!(conf.capi.provider.as_deref(), Some("aws"));
        assert_eq!(conf.capi.worker_machine_count.as_deref(), Some("2"));
        assert_eq!(conf.capi.use_existing_cluster, Some(true));
        assert_eq!(conf.capi.up_timeout.as_deref(), Some("45m"));
        assert_eq!(conf.capi.flavor, None);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let conf = DeployerConfFile::from_toml("").unwrap();
        assert_eq!(conf, DeployerConfFile::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = DeployerConfFile::from_toml("[capi]\nprovder = \"aws\"\n").unwrap_err();
        assert!(matches!(err, DeployerError::TomlParse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[kind]\nloglevel = \"debug\"").unwrap();

        let conf = DeployerConfFile::from(file.path()).unwrap();
        assert_eq!(conf.kind.loglevel.as_deref(), Some("debug"));

        let missing = DeployerConfFile::from(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(DeployerError::Config(_))));
    }
}
