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

use std::time::Duration;

/// External programs
pub const KIND_BIN: &str = "kind";
pub const KUBECTL_BIN: &str = "kubectl";
pub const CLUSTERCTL_BIN: &str = "clusterctl";

/// Deployer names
pub const KIND_DEPLOYER_NAME: &str = "kind";
pub const CAPI_DEPLOYER_NAME: &str = "capi";

/// Node image tag produced by `kind build node-image` when no image is given.
/// `Build` and `Up` both use it so a build followed by up picks up the new image.
pub const KIND_DEFAULT_BUILT_IMAGE_NAME: &str = "kindest/node:latest";

/// Kind defaults
pub const DEFAULT_KIND_CLUSTER_NAME: &str = "kind-kubetest2";
pub const DEFAULT_ARTIFACTS_DIR: &str = "_artifacts";
pub const LOGS_DIR_NAME: &str = "logs";

/// Cluster API defaults
pub const DEFAULT_WORKLOAD_CLUSTER_NAME: &str = "capi-workload-cluster";
pub const DEFAULT_MACHINE_COUNT: &str = "1";
pub const DEFAULT_UP_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Calico CNI manifest applied to the workload cluster
pub const CALICO_MANIFEST_URL: &str = "https://docs.projectcalico.org/v3.12/manifests/calico.yaml";

/// Printed by kubectl when the Cluster API CRDs are not installed yet
pub const MISSING_RESOURCE_TYPE_MARKER: &str = "the server doesn't have a resource type";

/// `kubectl wait` timeout; negative means wait indefinitely
pub const WAIT_FOREVER: &str = "--timeout=-1m";

/// Workload kubeconfig materialization
pub const KUBECONFIG_TEMP_PREFIX: &str = "kubetest2-capi";
pub const KUBECONFIG_FILE_NAME: &str = "kubeconfig.yaml";
pub const KUBECONFIG_FILE_MODE: u32 = 0o600;

/// Config file environment variable
pub const DEPLOYER_CONF_ENV: &str = "KUBETEST_DEPLOYER_CONF";
