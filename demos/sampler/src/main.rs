//! One-shot sampler: init, start, read current/voltage/power, deinit.

use std::error::Error;
use std::process::ExitCode;

use atm90e26::config::Config;
use atm90e26::params::{CurrentGain, CurrentScale};
use atm90e26::Atm90e26;

const DEFAULT_DEVICE: &str = "/dev/spidev0.0";
const SAG_THRESHOLD_VOLTS: f32 = 20.0;

fn sample(path: &str) -> Result<(f32, f32, f32), Box<dyn Error>> {
    let config = Config::new().current_scale(CurrentScale::Boosted).build();
    let mut meter = Atm90e26::open_spidev(path, config)?;

    let reading = meter
        .start(CurrentGain::Gain24, SAG_THRESHOLD_VOLTS)
        .and_then(|()| Ok((meter.irms_amps()?, meter.vrms_volts()?, meter.power_watts()?)));
    let closed = meter.deinit();

    let reading = reading?;
    closed?;
    Ok(reading)
}

fn main() -> ExitCode {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_DEVICE.to_owned());

    match sample(&path) {
        Ok((amps, volts, watts)) => {
            println!("irms={amps:.3} A vrms={volts:.2} V power={watts:.0} W");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("sampling {path} failed: {err}");
            ExitCode::FAILURE
        }
    }
}
