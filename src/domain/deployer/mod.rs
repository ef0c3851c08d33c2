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


//! Deployer backends
//!
//! Every backend implements [`Deployer`], the capability set the harness
//! drives: bring a cluster up, tear it down, report readiness, export logs,
//! build a node image and locate the kubeconfig for the cluster under test.

pub mod capi;
pub mod kind;
mod kubeconfig;
mod management;
mod workload;

pub use self::capi::CapiDeployer;
pub use self::kind::KindDeployer;
pub use self::management::is_missing_resource_type;

use crate::infrastructure::constants::{CAPI_DEPLOYER_NAME, KIND_DEPLOYER_NAME};
use crate::shared::error::Result;
use std::path::PathBuf;

#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Name the harness selects this backend by
    fn name(&self) -> &'static str;

    /// Cluster that `is_up` and `dump_cluster_logs` act on
    fn cluster_name(&self) -> &str;

    async fn up(&self) -> Result<()>;

    async fn down(&self) -> Result<()>;

    async fn is_up(&self) -> Result<bool>;

    async fn dump_cluster_logs(&self) -> Result<()>;

    async fn build(&self) -> Result<()>;

    /// Path of the kubeconfig for the cluster under test
    async fn kubeconfig(&self) -> Result<PathBuf>;
}

/// Names of all available backends.
pub fn deployer_names() -> &'static [&'static str] {
    &[KIND_DEPLOYER_NAME, CAPI_DEPLOYER_NAME]
}
