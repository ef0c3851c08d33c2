// CLI command definitions

use super::deployer::{CapiCommand, KindCommand, LifecycleArgs};
use crate::domain::deployer::Deployer;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kubetest-deployer",
    version,
    about = "Kubernetes cluster lifecycle deployers for e2e testing",
    long_about = "Brings test clusters up and down with kind or Cluster API, reports readiness, exports logs and builds node images"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Deploy a local cluster with kind
    Kind(KindCommand),

    /// Deploy a Cluster API workload cluster managed from a kind cluster
    Capi(CapiCommand),
}

impl Commands {
    /// Builds the backend selected by the subcommand.
    pub fn deployer(&self) -> anyhow::Result<Box<dyn Deployer>> {
        Ok(match self {
            Commands::Kind(cmd) => Box::new(cmd.deployer()?),
            Commands::Capi(cmd) => Box::new(cmd.deployer()?),
        })
    }

    pub fn lifecycle(&self) -> &LifecycleArgs {
        match self {
            Commands::Kind(cmd) => &cmd.lifecycle,
            Commands::Capi(cmd) => &cmd.lifecycle,
        }
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let deployer = self.deployer()?;
        self.lifecycle().run(deployer.as_ref()).await
    }
}
