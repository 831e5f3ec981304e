use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride dispatch workspace",
    long_about = "A unified CLI for running marketplace scenarios, commission sweeps,\n\
                  benchmarks, and CI checks in the ride dispatch workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo marketplace scenario
    Run,
    /// Run the commission sweep experiment
    Sweep,
    /// Run Criterion benchmarks
    Bench,
    /// Run load tests (ignored tests in ride_core)
    LoadTest,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run example scenarios
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── jobs ───────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ]);

    step("Tests");
    run_cargo(&["test", "--workspace"]);
}

fn ci_examples() {
    step("Marketplace demo scenario");
    run_cargo(&[
        "run",
        "--release",
        "-p",
        "ride_core",
        "--example",
        "marketplace_run",
    ]);

    step("Commission sweep");
    run_cargo(&[
        "run",
        "--release",
        "-p",
        "ride_experiments",
        "--example",
        "commission_sweep",
    ]);
}

fn ci_bench() {
    step("Benchmarks");
    run_cargo(&["bench", "-p", "ride_core"]);
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_cargo(&[
                "run",
                "--release",
                "-p",
                "ride_core",
                "--example",
                "marketplace_run",
            ]);
        }
        Commands::Sweep => {
            run_cargo(&[
                "run",
                "--release",
                "-p",
                "ride_experiments",
                "--example",
                "commission_sweep",
            ]);
        }
        Commands::Bench => ci_bench(),
        Commands::LoadTest => {
            step("Load tests");
            run_cargo(&[
                "test",
                "-p",
                "ride_core",
                "--release",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
        Commands::Ci { job } => match job {
            CiJob::Check => ci_check(),
            CiJob::Examples => ci_examples(),
            CiJob::Bench => ci_bench(),
            CiJob::All => {
                ci_check();
                ci_examples();
                ci_bench();
            }
        },
    }
}
