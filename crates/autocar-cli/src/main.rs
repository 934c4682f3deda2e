//! `autocar` – on-board controller entry point.
//!
//! 1. Loads `~/.autocar/config.toml` (writing the defaults on first run),
//!    applies `AUTOCAR_*` overrides and validates the result.
//! 2. Binds the joystick listener and waits for exactly one relay session.
//!    Ctrl-C aborts the wait.
//! 3. Runs the control loop against the simulated rig until Ctrl-C, the
//!    session ends, or a hardware fault.  The drive is always stopped and
//!    disabled before the process exits.

mod config;

use std::net::SocketAddr;
use std::process::ExitCode;

use autocar_hal::RigBuilder;
use autocar_hal::sim::{SimDrive, SimHeading, SimProximity, SimRangeSensor};
use autocar_middleware::JoystickListener;
use autocar_runtime::{ControlLoop, LoopExit, ShutdownSignal, init_tracing};
use autocar_types::{AutocarError, Proximity, VehicleConfig};
use colored::Colorize;
use tracing::{error, warn};

fn main() -> ExitCode {
    let _telemetry = init_tracing("autocar");

    print_banner();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    let handler_signal = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the vehicle …".yellow().bold());
        handler_signal.trigger();
    }) {
        warn!(
            error = %e,
            "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available"
        );
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = load_or_init_config();
    config::apply_env_overrides(&mut cfg);
    let addr = match cfg.validate() {
        Ok(addr) => addr,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return ExitCode::from(2);
        }
    };

    // ── Control loop ──────────────────────────────────────────────────────
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build the Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(serve(addr, cfg.vehicle, shutdown)) {
        Ok(None) => {
            println!("  {}", "Interrupted before a joystick connected.".dimmed());
            ExitCode::SUCCESS
        }
        Ok(Some(LoopExit::Shutdown)) => {
            println!("  {} Vehicle stopped and disabled.", "✓".green().bold());
            ExitCode::SUCCESS
        }
        Ok(Some(LoopExit::SessionEnded)) => {
            println!(
                "  {} Joystick session ended; vehicle stopped and disabled.",
                "✓".green().bold()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {}", "Fault".red().bold(), e);
            println!("  Vehicle stopped and disabled.");
            ExitCode::FAILURE
        }
    }
}

/// Accept one joystick session and run the control loop on it.
///
/// Returns `Ok(None)` when shutdown was requested before anyone connected.
async fn serve(
    addr: SocketAddr,
    vehicle: VehicleConfig,
    shutdown: ShutdownSignal,
) -> Result<Option<LoopExit>, AutocarError> {
    let listener = JoystickListener::bind(addr)?;
    println!(
        "  Waiting for joystick relay on {} …",
        listener.local_addr()?.to_string().bold()
    );

    let link = tokio::select! {
        biased;
        _ = shutdown.wait() => return Ok(None),
        link = listener.accept(vehicle.read_timeout()) => link?,
    };
    println!("  Connected by {}", link.peer().bold());
    println!(
        "  Mode: {}  (press the joystick switch to toggle)",
        "manual".bold().cyan()
    );

    let rig = RigBuilder::new()
        .with_drive(Box::new(SimDrive::new("sim_drive")))
        .with_heading(Box::new(SimHeading::new("sim_servo")))
        .with_ranging(Box::new(SimRangeSensor::constant(200.0)))
        .with_left_proximity(Box::new(SimProximity::constant(Proximity::Clear)))
        .with_right_proximity(Box::new(SimProximity::constant(Proximity::Clear)))
        .build()?;
    let mut control = ControlLoop::new(vehicle, rig, link, shutdown);
    control.run().await.map(Some)
}

fn load_or_init_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    }
}

fn print_banner() {
    println!();
    println!("{}", r#"    ___         __        ______          "#.bold().cyan());
    println!("{}", r#"   /   | __  __/ /_____  / ____/___ ______"#.bold().cyan());
    println!("{}", r#"  / /| |/ / / / __/ __ \/ /   / __ `/ ___/"#.bold().cyan());
    println!("{}", r#" / ___ / /_/ / /_/ /_/ / /___/ /_/ / /    "#.bold().cyan());
    println!("{}", r#"/_/  |_\__,_/\__/\____/\____/\__,_/_/     "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "AutoCar".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Joystick teleoperation and obstacle avoidance");
    println!();
}
