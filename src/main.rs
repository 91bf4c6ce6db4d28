use std::{env, fs::File, io::BufReader, process};

use anyhow::Context;
use log::info;

use param_init::{InitConfig, Parameter};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        process::exit(1);
    }

    let path = &args[1];
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    let config = InitConfig::from_reader(BufReader::new(file))?;
    info!("initializing {} parameter(s)", config.params.len());

    let params = param_init::build_all(&config)?;
    for (name, param) in &params {
        summarize(name, param)?;
    }

    Ok(())
}

/// Logs the shape, dtype and value range of an initialized parameter.
fn summarize(name: &str, param: &Parameter) -> anyhow::Result<()> {
    let values = param.tensor().to_f64_vec();
    let shape = param.shape()?;

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;

    info!(
        "{name}: shape={shape} dtype={} requires_grad={} min={min:.6} max={max:.6} mean={mean:.6}",
        param.dtype(),
        param.requires_grad(),
    );

    Ok(())
}
