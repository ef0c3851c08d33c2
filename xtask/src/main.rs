//! Build automation for kubetest-deployer
//!
//! Usage: cargo xtask <command>
//!
//! - build: Build the deployer binary
//! - test: Run tests, optionally only those spawning real processes
//! - deb: Package the binary with the `[package.metadata.deb]` settings
//! - smoke: Drive a full capi lifecycle against stub kind/kubectl/clusterctl
//! - ci: Format check, clippy and tests

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BIN: &str = "kubetest-deployer";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for kubetest-deployer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the deployer binary
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Only the tests that spawn real `sh` children (pipes, deadlines)
        #[arg(long)]
        processes: bool,
    },
    /// Build a .deb with cargo-deb
    Deb,
    /// Run --up --status --dump-logs --down with stubbed external tools
    Smoke,
    /// Run CI checks (format, clippy, test)
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Build { release } => build(&sh, release).map(|_| ()),
        Commands::Test { processes } => test(&sh, processes),
        Commands::Deb => deb(&sh),
        Commands::Smoke => smoke(&sh),
        Commands::Ci => ci(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<PathBuf> {
    let profile = if release { "release" } else { "debug" };
    println!("🔨 Building {} ({})...", BIN, profile);
    if release {
        cmd!(sh, "cargo build --release --bin {BIN}").run()?;
    } else {
        cmd!(sh, "cargo build --bin {BIN}").run()?;
    }
    Ok(project_root()?.join("target").join(profile).join(BIN))
}

fn test(sh: &Shell, processes: bool) -> Result<()> {
    if processes {
        println!("🧪 Running real subprocess tests...");
        cmd!(sh, "cargo test --lib infrastructure::process::runner").run()?;
        cmd!(sh, "cargo test --test capi_deployer_test test_pipe_").run()?;
    } else {
        println!("🧪 Running tests...");
        cmd!(sh, "cargo test --workspace").run()?;
    }
    println!("✅ Tests passed");
    Ok(())
}

fn deb(sh: &Shell) -> Result<()> {
    if cmd!(sh, "cargo deb --version").quiet().ignore_stdout().run().is_err() {
        bail!("cargo-deb is not installed (cargo install cargo-deb)");
    }
    println!("📦 Packaging {}...", BIN);
    cmd!(sh, "cargo deb").run().context("cargo deb failed")?;
    println!("✅ Package written to target/debian/");
    Ok(())
}

/// Logs its invocation, then answers the few queries the lifecycle inspects.
const STUB_TOOL: &str = r#"#!/bin/sh
echo "$(basename "$0") $*" >> "$SMOKE_LOG"
case "$(basename "$0") $1 $2" in
  "kubectl get nodes") echo "node/smoke-control-plane" ;;
  "kubectl apply -f") cat > /dev/null ;;
  "clusterctl config cluster") echo "kind: Cluster" ;;
esac
exit 0
"#;

/// Invocations that must appear, in this order. The manifest apply runs
/// concurrently with the render and is checked separately.
const EXPECTED_ORDER: &[&str] = &[
    "kind create cluster --name smoke",
    "kubectl get providers",
    "clusterctl init --infrastructure docker",
    "kubectl wait --for=condition=Available",
    "clusterctl config cluster smoke-wl",
    "kubectl wait --for=condition=Ready cluster/smoke-wl",
    "kubectl get nodes -o=name",
    "kind export logs --name smoke",
    "kubectl delete --ignore-not-found --wait cluster smoke-wl",
    "kind delete cluster --name smoke",
];

fn smoke(sh: &Shell) -> Result<()> {
    let binary = build(sh, false)?;
    println!("💨 Smoke testing the capi lifecycle with stub tools...");

    let stubs = tempfile::Builder::new().prefix("kubetest-smoke").tempdir()?;
    let bin_dir = stubs.path().join("bin");
    sh.create_dir(&bin_dir)?;
    for tool in ["kind", "kubectl", "clusterctl"] {
        let path = bin_dir.join(tool);
        sh.write_file(&path, STUB_TOOL)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        }
    }

    let log = stubs.path().join("invocations.log");
    let artifacts = stubs.path().join("artifacts");
    let path = format!(
        "{}:{}",
        bin_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );
    cmd!(
        sh,
        "{binary} capi --cluster-name smoke --workload-cluster-name smoke-wl
            --provider docker --kubernetes-version v1.20.0 --up-timeout 2m
            --artifacts {artifacts} --up --status --dump-logs --down"
    )
    .env("PATH", &path)
    .env("SMOKE_LOG", &log)
    .run()
    .context("lifecycle run failed")?;

    let invocations = sh.read_file(&log)?;
    check_order(&invocations)?;
    if !invocations.lines().any(|l| l.starts_with("kubectl apply -f -")) {
        bail!("workload manifest was never applied:\n{}", invocations);
    }

    println!("✅ Smoke test passed ({} invocations)", invocations.lines().count());
    Ok(())
}

fn check_order(invocations: &str) -> Result<()> {
    let mut lines = invocations.lines();
    for expected in EXPECTED_ORDER {
        if !lines.any(|l| l.starts_with(expected)) {
            bail!("missing or out of order: '{}'\n{}", expected, invocations);
        }
        println!("  ✓ {}", expected);
    }
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    test(sh, false)?;
    println!("✅ All CI checks passed!");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}
