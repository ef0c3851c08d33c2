//! Deployer commands and lifecycle execution

use crate::cli::display::{StatusReport, TableRenderer};
use crate::domain::config::{
    parse_duration, CapiConf, CapiConfig, DeployerConfFile, KindConf, KindConfig,
};
use crate::domain::deployer::{CapiDeployer, Deployer, KindDeployer};
use crate::infrastructure::constants::{DEFAULT_ARTIFACTS_DIR, DEPLOYER_CONF_ENV, LOGS_DIR_NAME};
use crate::shared::Result;
use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser};
use std::path::PathBuf;
use tracing::{error, info};

/// Flags of the kind deployer. Unset flags fall back to the deployer file,
/// then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct KindArgs {
    /// The kind cluster --name
    #[arg(long)]
    pub cluster_name: Option<String>,

    /// --loglevel for kind commands
    #[arg(long = "loglevel")]
    pub log_level: Option<String>,

    /// The image name to use for build and up
    #[arg(long)]
    pub image_name: Option<String>,

    /// --type for kind build node-image
    #[arg(long)]
    pub build_type: Option<String>,

    /// --config for kind create cluster
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// --kubeconfig flag for kind create cluster
    #[arg(long = "kubeconfig", value_name = "PATH")]
    pub kubeconfig_path: Option<PathBuf>,

    /// --kube-root for kind build node-image
    #[arg(long, value_name = "PATH")]
    pub kube_root: Option<PathBuf>,

    /// --verbosity for kind
    #[arg(long)]
    pub verbosity: Option<u32>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CapiArgs {
    /// --infrastructure provider for clusterctl
    #[arg(long)]
    pub provider: Option<String>,

    /// --kubernetes-version for clusterctl
    #[arg(long)]
    pub kubernetes_version: Option<String>,

    /// --control-plane-machine-count for clusterctl [default: 1]
    #[arg(long)]
    pub control_plane_machine_count: Option<String>,

    /// --worker-machine-count for clusterctl [default: 1]
    #[arg(long)]
    pub worker_machine_count: Option<String>,

    /// --flavor for clusterctl
    #[arg(long)]
    pub flavor: Option<String>,

    /// Use the existing, currently targeted cluster as the management cluster
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub use_existing_cluster: Option<bool>,

    /// Maximum time allotted for --up to complete, e.g. 30m or 1h [default: 30m]
    #[arg(long, value_name = "DURATION")]
    pub up_timeout: Option<String>,

    /// Install the Calico CNI once the workload cluster is ready
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub install_calico: Option<bool>,

    /// The workload cluster name [default: capi-workload-cluster]
    #[arg(long)]
    pub workload_cluster_name: Option<String>,

    /// Kubeconfig of the workload cluster; fetched with clusterctl when unset
    #[arg(long, value_name = "PATH")]
    pub kubecfg_path: Option<PathBuf>,
}

/// Lifecycle switches shared by every deployer
#[derive(Args, Debug, Clone, Default)]
pub struct LifecycleArgs {
    /// Build a kind node image
    #[arg(long)]
    pub build: bool,

    /// Bring the cluster up
    #[arg(long)]
    pub up: bool,

    /// Print cluster readiness
    #[arg(long)]
    pub status: bool,

    /// Export cluster logs into <ARTIFACTS>/logs
    #[arg(long)]
    pub dump_logs: bool,

    /// Tear the cluster down
    #[arg(long)]
    pub down: bool,

    /// Directory for exported logs
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// TOML file with [kind] and [capi] settings; flags take precedence
    #[arg(long, value_name = "PATH", env = DEPLOYER_CONF_ENV)]
    pub deployer_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    Build,
    Up,
    Status,
    DumpLogs,
    Down,
}

impl LifecycleStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStep::Build => "build",
            LifecycleStep::Up => "up",
            LifecycleStep::Status => "status",
            LifecycleStep::DumpLogs => "dump-logs",
            LifecycleStep::Down => "down",
        }
    }

    /// Cleanup steps still run after an earlier step failed.
    pub fn is_cleanup(&self) -> bool {
        matches!(self, LifecycleStep::DumpLogs | LifecycleStep::Down)
    }
}

impl KindArgs {
    pub fn resolve(&self, file: &KindConf, lifecycle: &LifecycleArgs) -> KindConfig {
        let defaults = KindConfig::default();
        KindConfig {
            cluster_name: self
                .cluster_name
                .clone()
                .or_else(|| file.cluster_name.clone())
                .unwrap_or(defaults.cluster_name),
            log_level: self.log_level.clone().or_else(|| file.loglevel.clone()),
            image_name: self.image_name.clone().or_else(|| file.image_name.clone()),
            build_type: self.build_type.clone().or_else(|| file.build_type.clone()),
            config_path: self.config_path.clone().or_else(|| file.config.clone()),
            kubeconfig_path: self
                .kubeconfig_path
                .clone()
                .or_else(|| file.kubeconfig.clone()),
            kube_root: self.kube_root.clone().or_else(|| file.kube_root.clone()),
            verbosity: self
                .verbosity
                .or(file.verbosity)
                .unwrap_or(defaults.verbosity),
            logs_dir: lifecycle.artifacts.join(LOGS_DIR_NAME),
            should_build: lifecycle.build,
        }
    }
}

impl CapiArgs {
    pub fn resolve(&self, file: &CapiConf) -> Result<CapiConfig> {
        let defaults = CapiConfig::default();
        let up_timeout = match self.up_timeout.as_deref().or(file.up_timeout.as_deref()) {
            Some(s) => parse_duration(s)?,
            None => defaults.up_timeout,
        };

        Ok(CapiConfig {
            provider: self
                .provider
                .clone()
                .or_else(|| file.provider.clone())
                .unwrap_or(defaults.provider),
            kubernetes_version: self
                .kubernetes_version
                .clone()
                .or_else(|| file.kubernetes_version.clone())
                .unwrap_or(defaults.kubernetes_version),
            control_plane_machine_count: self
                .control_plane_machine_count
                .clone()
                .or_else(|| file.control_plane_machine_count.clone())
                .unwrap_or(defaults.control_plane_machine_count),
            worker_machine_count: self
                .worker_machine_count
                .clone()
                .or_else(|| file.worker_machine_count.clone())
                .unwrap_or(defaults.worker_machine_count),
            flavor: self
                .flavor
                .clone()
                .or_else(|| file.flavor.clone())
                .unwrap_or(defaults.flavor),
            use_existing_cluster: self
                .use_existing_cluster
                .or(file.use_existing_cluster)
                .unwrap_or(defaults.use_existing_cluster),
            up_timeout,
            install_calico: self
                .install_calico
                .or(file.install_calico)
                .unwrap_or(defaults.install_calico),
            workload_cluster_name: self
                .workload_cluster_name
                .clone()
                .or_else(|| file.workload_cluster_name.clone())
                .unwrap_or(defaults.workload_cluster_name),
            kubecfg_path: self.kubecfg_path.clone().or_else(|| file.kubecfg_path.clone()),
        })
    }
}

impl LifecycleArgs {
    pub fn load_file(&self) -> anyhow::Result<DeployerConfFile> {
        match &self.deployer_config {
            Some(path) => DeployerConfFile::from(path)
                .with_context(|| format!("Failed to load deployer file {}", path.display())),
            None => Ok(DeployerConfFile::default()),
        }
    }

    /// Requested steps in execution order.
    pub fn steps(&self) -> Vec<LifecycleStep> {
        [
            (self.build, LifecycleStep::Build),
            (self.up, LifecycleStep::Up),
            (self.status, LifecycleStep::Status),
            (self.dump_logs, LifecycleStep::DumpLogs),
            (self.down, LifecycleStep::Down),
        ]
        .into_iter()
        .filter_map(|(requested, step)| requested.then_some(step))
        .collect()
    }

    /// Runs the requested steps in order. After a failure only cleanup steps
    /// run; the first failure is returned.
    pub async fn run(&self, deployer: &dyn Deployer) -> anyhow::Result<()> {
        let steps = self.steps();
        if steps.is_empty() {
            anyhow::bail!(
                "Nothing to do: pass at least one of --build, --up, --status, --dump-logs, --down"
            );
        }

        let mut failure: Option<anyhow::Error> = None;
        for step in steps {
            if failure.is_some() && !step.is_cleanup() {
                continue;
            }
            info!(deployer = deployer.name(), step = step.as_str(), "running lifecycle step");
            let result = run_step(deployer, step)
                .await
                .with_context(|| format!("{} {} failed", deployer.name(), step.as_str()));

            if let Err(e) = result {
                if failure.is_some() {
                    let message = format!("{:#}", e);
                    error!(error = %message, "cleanup step failed");
                } else {
                    failure = Some(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn run_step(deployer: &dyn Deployer, step: LifecycleStep) -> Result<()> {
    match step {
        LifecycleStep::Build => deployer.build().await,
        LifecycleStep::Up => deployer.up().await,
        LifecycleStep::Status => {
            let report = collect_status(deployer).await;
            println!("{}", TableRenderer::new().render_status(&report));
            Ok(())
        }
        LifecycleStep::DumpLogs => deployer.dump_cluster_logs().await,
        LifecycleStep::Down => deployer.down().await,
    }
}

pub async fn collect_status(deployer: &dyn Deployer) -> StatusReport {
    let up = deployer.is_up().await.map_err(|e| e.to_string());
    let kubeconfig = deployer
        .kubeconfig()
        .await
        .map(|path| path.display().to_string())
        .map_err(|e| e.to_string());

    StatusReport {
        deployer: deployer.name().to_string(),
        cluster: deployer.cluster_name().to_string(),
        kubeconfig,
        up,
        checked_at: Local::now(),
    }
}

#[derive(Parser, Debug, Clone)]
pub struct KindCommand {
    #[command(flatten)]
    pub kind: KindArgs,

    #[command(flatten)]
    pub lifecycle: LifecycleArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct CapiCommand {
    #[command(flatten)]
    pub kind: KindArgs,

    #[command(flatten)]
    pub capi: CapiArgs,

    #[command(flatten)]
    pub lifecycle: LifecycleArgs,
}

impl KindCommand {
    pub fn deployer(&self) -> anyhow::Result<KindDeployer> {
        let file = self.lifecycle.load_file()?;
        let config = self.kind.resolve(&file.kind, &self.lifecycle);
        Ok(KindDeployer::new(config))
    }
}

impl CapiCommand {
    pub fn deployer(&self) -> anyhow::Result<CapiDeployer> {
        let file = self.lifecycle.load_file()?;
        let kind_config = self.kind.resolve(&file.kind, &self.lifecycle);
        let config = self
            .capi
            .resolve(&file.capi)
            .context("Invalid Cluster API settings")?;
        Ok(CapiDeployer::new(config, kind_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{CliArgs, Commands};
    use crate::shared::DeployerError;
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Commands {
        CliArgs::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_parse_capi_flags() {
        let Commands::Capi(cmd) = parse(&[
            "kubetest-deployer",
            "capi",
            "--cluster-name",
            "mgmt",
            "--provider",
            "docker",
            "--kubernetes-version",
            "v1.20.0",
            "--use-existing-cluster",
            "--install-calico=false",
            "--up-timeout",
            "45m",
            "--up",
            "--down",
        ]) else {
            panic!("expected capi command");
        };

        let config = cmd.capi.resolve(&CapiConf::default()).unwrap();
        assert_eq!(config.provider, "docker");
        assert!(config.use_existing_cluster);
        assert!(!config.install_calico);
        assert_eq!(config.up_timeout, Duration::from_secs(45 * 60));
        assert_eq!(config.worker_machine_count, "1");

        let kind = cmd.kind.resolve(&KindConf::default(), &cmd.lifecycle);
        assert_eq!(kind.cluster_name, "mgmt");
        assert_eq!(kind.logs_dir, PathBuf::from("_artifacts/logs"));
        assert_eq!(
            cmd.lifecycle.steps(),
            vec![LifecycleStep::Up, LifecycleStep::Down]
        );
    }

    #[test]
    fn test_flag_beats_file_beats_default() {
        let file = DeployerConfFile::from_toml(
            r#"
            [kind]
            cluster-name = "from-file"
            loglevel = "debug"

            [capi]
            provider = "aws"
            flavor = "eks"
            up-timeout = "10m"
            "#,
        )
        .unwrap();

        let kind_args = KindArgs {
            cluster_name: Some("from-flag".to_string()),
            ..Default::default()
        };
        let lifecycle = LifecycleArgs {
            build: true,
            artifacts: PathBuf::from("/out"),
            ..Default::default()
        };
        let kind = kind_args.resolve(&file.kind, &lifecycle);
        assert_eq!(kind.cluster_name, "from-flag");
        assert_eq!(kind.log_level.as_deref(), Some("debug"));
        assert_eq!(kind.logs_dir, PathBuf::from("/out/logs"));
        assert!(kind.should_build);

        let capi_args = CapiArgs {
            provider: Some("docker".to_string()),
            ..Default::default()
        };
        let capi = capi_args.resolve(&file.capi).unwrap();
        assert_eq!(capi.provider, "docker");
        assert_eq!(capi.flavor, "eks");
        assert_eq!(capi.up_timeout, Duration::from_secs(600));
        assert_eq!(capi.workload_cluster_name, "capi-workload-cluster");
    }

    #[test]
    fn test_bad_up_timeout_is_config_error() {
        let args = CapiArgs {
            up_timeout: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            args.resolve(&CapiConf::default()),
            Err(DeployerError::Config(_))
        ));
    }

    #[test]
    fn test_kind_command_reads_deployer_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[kind]\ncluster-name = \"filed\"").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let Commands::Kind(cmd) =
            parse(&["kubetest-deployer", "kind", "--deployer-config", &path, "--up"])
        else {
            panic!("expected kind command");
        };
        let deployer = cmd.deployer().unwrap();
        assert_eq!(deployer.cluster_name(), "filed");
    }

    /// Records which lifecycle verbs were invoked and fails the chosen ones.
    #[derive(Default)]
    struct ScriptedDeployer {
        calls: Mutex<Vec<&'static str>>,
        failing: Vec<&'static str>,
    }

    impl ScriptedDeployer {
        fn record(&self, verb: &'static str) -> Result<()> {
            self.calls.lock().unwrap().push(verb);
            if self.failing.contains(&verb) {
                Err(DeployerError::config_error(format!("{verb} exploded")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl Deployer for ScriptedDeployer {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn cluster_name(&self) -> &str {
            "scripted-cluster"
        }
        async fn up(&self) -> Result<()> {
            self.record("up")
        }
        async fn down(&self) -> Result<()> {
            self.record("down")
        }
        async fn is_up(&self) -> Result<bool> {
            self.record("is_up").map(|_| true)
        }
        async fn dump_cluster_logs(&self) -> Result<()> {
            self.record("dump_cluster_logs")
        }
        async fn build(&self) -> Result<()> {
            self.record("build")
        }
        async fn kubeconfig(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("/tmp/scripted"))
        }
    }

    #[tokio::test]
    async fn test_run_executes_in_lifecycle_order() {
        let lifecycle = LifecycleArgs {
            build: true,
            up: true,
            status: true,
            dump_logs: true,
            down: true,
            ..Default::default()
        };
        let deployer = ScriptedDeployer::default();
        lifecycle.run(&deployer).await.unwrap();
        assert_eq!(
            *deployer.calls.lock().unwrap(),
            vec!["build", "up", "is_up", "dump_cluster_logs", "down"]
        );
    }

    #[tokio::test]
    async fn test_failed_up_still_tears_down() {
        let lifecycle = LifecycleArgs {
            up: true,
            status: true,
            dump_logs: true,
            down: true,
            ..Default::default()
        };
        let deployer = ScriptedDeployer {
            failing: vec!["up"],
            ..Default::default()
        };
        let err = lifecycle.run(&deployer).await.unwrap_err();
        assert!(format!("{:#}", err).contains("up exploded"));
        assert_eq!(
            *deployer.calls.lock().unwrap(),
            vec!["up", "dump_cluster_logs", "down"]
        );
    }

    #[tokio::test]
    async fn test_run_requires_a_step() {
        let deployer = ScriptedDeployer::default();
        assert!(LifecycleArgs::default().run(&deployer).await.is_err());
        assert!(deployer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collect_status() {
        let deployer = ScriptedDeployer::default();
        let report = collect_status(&deployer).await;
        assert_eq!(report.deployer, "scripted");
        assert_eq!(report.cluster, "scripted-cluster");
        assert_eq!(report.up, Ok(true));
        assert_eq!(report.kubeconfig, Ok("/tmp/scripted".to_string()));
    }
}
