//! mosfet-sim - MOSFET Transient Circuit Simulator
//!
//! Runs a circuit for a number of ticks and prints the final node voltages
//! and device currents.
//!
//! # Usage
//!
//! ```bash
//! mosfet-sim inverter.mos --pin in=5 --ticks 300
//! mosfet-sim --builtin nand --pin a=5 --pin b=5 --json
//! mosfet-sim --list
//! ```

use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use mosfet_sim::{
    circuit::{validate_circuit, Circuit},
    circuits, dsl,
    error::Result,
    worker::VoltageSnapshot,
    Simulator, SimulatorConfig, Ticker,
};

/// Transient simulator for small MOSFET circuits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a circuit description file
    #[arg(
        value_name = "CIRCUIT_FILE",
        required_unless_present_any = ["builtin", "list"],
        conflicts_with = "builtin"
    )]
    circuit_file: Option<PathBuf>,

    /// Simulate a built-in circuit instead of a file
    #[arg(short, long, value_name = "KEY")]
    builtin: Option<String>,

    /// List the built-in circuits and exit
    #[arg(long)]
    list: bool,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// Timestep per tick in milliseconds
    #[arg(long, default_value_t = mosfet_sim::solver::DEFAULT_TIMESTEP_MS)]
    dt: f64,

    /// Hold a node at a voltage, e.g. `--pin in=2.5`
    #[arg(short, long, value_name = "NODE=VOLTS", value_parser = parse_pin)]
    pin: Vec<(String, f64)>,

    /// Include channel-length modulation
    #[arg(long)]
    early_effect: bool,

    /// Tick in real time, printing every tick
    #[arg(long)]
    realtime: bool,

    /// Print the final voltages as a JSON snapshot
    #[arg(long)]
    json: bool,
}

fn parse_pin(arg: &str) -> std::result::Result<(String, f64), String> {
    let (node, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NODE=VOLTS, got '{arg}'"))?;
    let voltage =
        dsl::parse_value(value).ok_or_else(|| format!("invalid voltage '{value}'"))?;
    Ok((node.to_string(), voltage))
}

fn load(args: &Args) -> Result<(String, Circuit)> {
    if let Some(key) = &args.builtin {
        return Ok((key.clone(), circuits::load(key)?));
    }
    let path = args.circuit_file.clone().unwrap_or_default();
    let circuit = Circuit::from_ast(dsl::parse_file(&path)?)?;
    validate_circuit(&circuit)?;
    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((label, circuit))
}

fn print_tables(sim: &Simulator) {
    let circuit = sim.circuit();
    println!(
        "{} after {} ticks",
        circuit.title.as_deref().unwrap_or("circuit"),
        sim.ticks()
    );
    println!();
    println!("{:<12} {:>10} {:>12}  ", "NODE", "VOLTS", "CAP (F)");
    for node in circuit.nodes() {
        println!(
            "{:<12} {:>10.4} {:>12.3e}  {}",
            node.name,
            node.voltage,
            node.capacitance(),
            if node.fixed { "fixed" } else { "" }
        );
    }
    println!();
    println!("{:<12} {:<5} {:>12} {:>8}", "DEVICE", "TYPE", "CURRENT (A)", "SAT");
    for device in circuit.devices() {
        println!(
            "{:<12} {:<5} {:>12.4e} {:>8.3}",
            device.name,
            device.mosfet_type(),
            device.current(),
            device.saturation_level()
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        for builtin in circuits::BUILTIN_CIRCUITS {
            println!("{:<10} {}", builtin.key, builtin.description);
        }
        return Ok(());
    }

    let (label, circuit) = load(&args)?;
    let config = SimulatorConfig::new()
        .with_timestep_ms(args.dt)
        .with_early_effect(args.early_effect);
    let mut sim = Simulator::with_config(circuit, config)?;

    for (node, voltage) in &args.pin {
        sim.pin(node, *voltage)?;
    }

    info!("running '{}' for {} ticks", label, args.ticks);
    if args.realtime && args.ticks > 0 {
        let ticker = Ticker::from_config(sim.config())?;
        ticker.run(&mut sim, |sim| {
            let line: Vec<String> = sim
                .voltages()
                .iter()
                .map(|(name, v)| format!("{name}={v:.3}"))
                .collect();
            println!("[{:>5}] {}", sim.ticks(), line.join(" "));
            if sim.ticks() >= args.ticks {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
    } else {
        for _ in 0..args.ticks {
            sim.step();
        }
    }

    if args.json {
        let snapshot = VoltageSnapshot {
            circuit: label,
            voltages: sim.voltages(),
        };
        println!("{}", snapshot.encode()?);
    } else {
        print_tables(&sim);
    }

    Ok(())
}
