//! balance-walker - walk through games on a balance board
//!
//! # Usage
//!
//! ```bash
//! # First joystick found, keyboard output
//! balance-walker
//!
//! # Explicit device, virtual gamepad, jump on Y
//! balance-walker --device /dev/input/js1 --output virtual_joystick --jump-button Y
//!
//! # Watch detected postures without producing input
//! balance-walker --dry-run
//! ```
//!
//! # Environment Variables
//!
//! - `BOARD_CONFIG`: path to a TOML config file
//! - `RUST_LOG`: logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use balance_walker::acquisition::{scan_joysticks, select_device};
use balance_walker::build_actuator;
use balance_walker::config::defaults::JOYSTICK_DIR;
use balance_walker::config::{BoardConfig, JumpButton, OutputKind};
use balance_walker::pipeline::{JoystickSource, LoopExit, MonotonicClock, ProcessingLoop};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "balance-walker")]
#[command(about = "Balance-board posture controller: walk, balance and jump in games")]
#[command(version)]
struct CliArgs {
    /// Joystick device node (default: first /dev/input/js*)
    #[arg(long, value_name = "PATH")]
    device: Option<PathBuf>,

    /// Synthetic input backend
    #[arg(long, value_enum)]
    output: Option<OutputKind>,

    /// Face button bound to Jump
    #[arg(long, value_enum, ignore_case = true)]
    jump_button: Option<JumpButton>,

    /// TOML config file (default: $BOARD_CONFIG, then ./board_config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the joystick devices found and exit
    #[arg(long)]
    list_devices: bool,

    /// Log postures without producing any synthetic input
    #[arg(long)]
    dry_run: bool,
}

impl CliArgs {
    /// Command-line flags win over the config file.
    fn apply_overrides(&self, config: &mut BoardConfig) {
        if let Some(ref device) = self.device {
            config.device.path = Some(device.clone());
        }
        if let Some(kind) = self.output {
            config.output.kind = kind;
        }
        if let Some(button) = self.jump_button {
            config.output.jump_button = button;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn list_devices() {
    let devices = scan_joysticks();
    if devices.is_empty() {
        println!("No joystick devices found under /dev/input");
        return;
    }
    for device in devices {
        println!("{}", device.display());
    }
}

fn log_banner(config: &BoardConfig, device: &Path, dry_run: bool) {
    let d = &config.detection;
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  balance-walker");
    info!("  Balance-board posture controller");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("📥 Input:  {} ({} axes)", device.display(), config.device.axis_count);
    if dry_run {
        info!("📤 Output: dry run (log only)");
    } else {
        info!("📤 Output: {} | Jump button: {}", config.output.kind, config.output.jump_button);
    }
    info!(
        "⏱️  Walking hold {:.2}s | Flamingo hold {:.2}s | Jump display {:.2}s | Absent after {:.2}s",
        d.walking_hold_time, d.flamingo_hold_time, d.jump_display_time, d.user_absent_time
    );
    info!("   Near-minimum threshold: {:.1}% of range", d.jump_absence_threshold_percent * 100.0);
    info!("");
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    if args.list_devices {
        list_devices();
        return Ok(());
    }

    let mut config = BoardConfig::load(args.config.as_deref()).context("Failed to load board configuration")?;
    args.apply_overrides(&mut config);

    let device = select_device(config.device.path.as_deref(), Path::new(JOYSTICK_DIR))?;
    log_banner(&config, &device, args.dry_run);

    let mut source = JoystickSource::open(&device, config.device.axis_count)
        .with_context(|| format!("Cannot read balance board at {}", device.display()))?;

    let actuator = build_actuator(&config.output, args.dry_run)
        .context("Cannot create synthetic input device (check /dev/uinput permissions, or use --dry-run)")?;
    info!("🎮 Output backend: {}", actuator.name());

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let mut processing = ProcessingLoop::new(&config, actuator, MonotonicClock::new(), cancel_token);
    let stats = processing.run(&mut source).await;

    match stats.exit {
        LoopExit::Cancelled => {}
        LoopExit::SourceExhausted => bail!("Balance board at {} stopped sending data", device.display()),
        LoopExit::SourceFailed(reason) => bail!("Lost balance board: {reason}"),
    }

    info!("");
    info!("✓ balance-walker shutdown complete");
    Ok(())
}
