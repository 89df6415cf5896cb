//! Rollup Simulator
//!
//! Runs one rollup circuit natively over a hex-encoded input record and
//! prints the encoded public inputs plus any soft constraint failures.
//!
//! Usage:
//!   cargo run --package tessera-circuits --bin rollup-sim -- \
//!     base ./inputs/base_rollup_inputs.hex
//!
//! Settings come from config.toml (see `tessera-config`); set
//! `simulator.output_dir` to also write the public inputs to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tessera_circuits::entry::{self, SimulationOutput};
use tessera_config::TesseraConfig;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut positional = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--sample-config" => {
                print!("{}", TesseraConfig::generate_sample());
                return Ok(());
            }
            _ => positional.push(arg.as_str()),
        }
    }
    let &[circuit, input_path] = positional.as_slice() else {
        print_help();
        std::process::exit(1);
    };

    let config = TesseraConfig::load()?;
    if TesseraConfig::set_global(config.clone()).is_err() {
        log::warn!("Global config already initialized, keeping the existing one");
    }

    let input_hex = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path))?;
    let input = hex::decode(input_hex.trim()).context("Input file is not valid hex")?;

    println!("Tessera Rollup Simulator");
    println!("========================");
    println!("Circuit: {}", circuit);
    println!("Input:   {} ({} bytes)", input_path, input.len());
    println!();

    let output = match circuit {
        "base" => entry::base_rollup_sim(&input),
        "merge" => entry::merge_rollup_sim(&input),
        "root" => entry::root_rollup_sim(&input),
        other => bail!("Unknown circuit '{}', expected base, merge or root", other),
    }
    .with_context(|| format!("{} rollup rejected its input", circuit))?;

    report(&config, &output)?;

    if let Some(dir) = &config.simulator.output_dir {
        let path = write_output(
            Path::new(dir),
            circuit,
            &config.simulator.output_extension,
            &output,
        )?;
        println!("Public inputs written to {}", path.display());
    }

    if !output.is_valid() {
        std::process::exit(2);
    }
    Ok(())
}

fn report(config: &TesseraConfig, output: &SimulationOutput) -> Result<()> {
    if config.simulator.emit_json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    println!("Public inputs: {}", hex::encode(&output.public_inputs));
    if output.is_valid() {
        println!("All constraints satisfied");
    } else {
        println!("Soft constraint failures:");
        for failure in &output.failures {
            println!("  - {} ({})", failure.message, failure.location);
        }
    }
    Ok(())
}

fn write_output(
    dir: &Path,
    circuit: &str,
    extension: &str,
    output: &SimulationOutput,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(format!("{}_rollup_public_inputs.{}", circuit, extension));
    fs::write(&path, hex::encode(&output.public_inputs))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn print_help() {
    println!("Tessera Rollup Simulator");
    println!();
    println!("Usage: rollup-sim <base|merge|root> <input.hex>");
    println!();
    println!("Arguments:");
    println!("  <base|merge|root>  Which rollup circuit to run");
    println!("  <input.hex>        Hex-encoded rollup inputs record");
    println!();
    println!("Options:");
    println!("  --sample-config    Print a config.toml with every setting and exit");
    println!();
    println!("Exit codes: 0 valid, 1 usage or input error, 2 soft constraint failures");
}
