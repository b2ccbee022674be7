//! Memsweep - one-shot memory reclaimer for Windows

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use memsweep::console;
use memsweep::windows::memory::read_memory_status;
use memsweep::{MemorySweeper, StepOutcome, SweepConfig, SweepSummary};

#[derive(Parser)]
#[command(name = "memsweep")]
#[command(version)]
#[command(
    about = "Trims every process's working set and purges the system file cache",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current memory status
    Status,

    /// Run the sweep without prompting (for scripts)
    Sweep {
        /// Print the full success/failure lists with error detail
        #[arg(short, long)]
        output: bool,

        /// Append a timestamped record of the run to the log file
        #[arg(short, long)]
        log: bool,

        /// Skip the standby-list purge
        #[arg(long)]
        no_standby: bool,

        /// Pause after each successful trim (milliseconds)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Load configuration from a TOML file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Status) => {
            let status = read_memory_status();
            println!("Memory status:");
            println!("  Total:     {:.0} MB", status.total_physical_mb);
            println!("  Available: {:.0} MB", status.available_physical_mb);
            println!("  Used:      {:.0} MB", status.used_physical_mb());
            println!("  Load:      {}%", status.memory_load_percent);
            println!(
                "  Pressure:  {}",
                if status.is_critical() {
                    "CRITICAL"
                } else if status.is_high_pressure() {
                    "HIGH"
                } else {
                    "Normal"
                }
            );
        }

        Some(Commands::Sweep {
            output,
            log,
            no_standby,
            delay_ms,
            config,
        }) => {
            let mut config = match config {
                Some(path) => SweepConfig::load(&path)?,
                None => SweepConfig::default(),
            };
            config.verbose_output |= output;
            config.log_enabled |= log;
            if no_standby {
                config.purge_standby = false;
            }
            if let Some(delay) = delay_ms {
                config.trim_delay_ms = delay;
            }
            run_sweep(config, false);
        }

        Some(Commands::Config) => {
            print!("{}", toml::to_string_pretty(&SweepConfig::default())?);
        }

        None => {
            println!("memsweep");
            println!("Clears working-set memory for all processes. Processes may not honor the change and may try to reclaim their memory.\n");
            println!("Press ENTER to continue. Type O for detailed output, type L to log detailed output, type LO for both.");
            let reply = console::read_line()?;
            let (verbose_output, log_enabled) = console::parse_reply(&reply);

            let config = SweepConfig {
                verbose_output,
                log_enabled,
                ..Default::default()
            };
            run_sweep(config, true);
        }
    }

    Ok(())
}

fn run_sweep(config: SweepConfig, pause: bool) {
    let flags = match (config.verbose_output, config.log_enabled) {
        (true, true) => " / Log & output enabled",
        (true, false) => " / Output enabled",
        (false, true) => " / Log enabled",
        (false, false) => "",
    };
    println!(">> Sweep has begun.{}", flags);

    let sweeper = MemorySweeper::new(config.clone());
    let summary = sweeper.run();

    println!(
        ">> FINISHED. Cleared memory from {} processes, failed {}",
        summary.trim.trimmed.len(),
        summary.trim.failed.len()
    );
    if config.verbose_output {
        println!("\n{}", summary.detail_block());
    }
    report_cache(&summary, &config);

    let finish = format!(
        "\nTotal physical RAM: {:.2} GB\nAvailable RAM before: {:.0} MB / Available RAM after: {:.0} MB",
        summary.before.total_physical_gb(),
        summary.before.available_physical_mb,
        summary.after.available_physical_mb,
    );
    println!("{}", finish);
    sweeper.log().append(&finish);
    if config.log_enabled {
        println!("\nLog can be found at {}", sweeper.log().path().display());
    }

    if pause {
        println!("\nPress ENTER to exit.");
        let _ = console::read_line();
    }
}

fn report_cache(summary: &SweepSummary, config: &SweepConfig) {
    if !summary.cache.any_failed() {
        return;
    }
    println!("Failed to clear file system cache.");
    if config.verbose_output {
        for outcome in [&summary.cache.file_cache, &summary.cache.standby] {
            if let StepOutcome::Failed(detail) = outcome {
                println!("  {}", detail);
            }
        }
    }
}
