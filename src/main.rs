use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use structopt::StructOpt;

use chip_8_vm::scheduler::config::DEFAULT_INSTRUCTIONS_PER_SECOND;
use chip_8_vm::{Config, EmulationCore, Key, RunState};

/// Run a CHIP-8 program without a frontend and print its final screen.
#[derive(StructOpt, Debug)]
#[structopt(name = "chip-8-vm")]
struct Opt {
    /// Instructions executed per second
    #[structopt(long, default_value = "700")]
    ips: u32,

    /// Seed for the random number instruction
    #[structopt(long)]
    seed: Option<u64>,

    /// How long to run, in seconds
    #[structopt(long, default_value = "3")]
    seconds: f64,

    /// Comma-separated hex keys to press and release once at start, e.g. "5,a"
    #[structopt(long, default_value = "")]
    keys: String,

    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn parse_keys(keys: &str) -> Result<Vec<Key>, String> {
    keys.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| {
            u8::from_str_radix(key, 16)
                .ok()
                .and_then(Key::new)
                .ok_or_else(|| format!("{:?} is not a hex key", key))
        })
        .collect()
}

fn run_time(seconds: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("{} is not a usable number of seconds", seconds))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    log::info!("Executing {:?}", &opt.input);
    let rom = std::fs::read(&opt.input)?;
    let keys = parse_keys(&opt.keys)?;
    let run_for = run_time(opt.seconds)?;
    let config = Config {
        instructions_per_second: opt.ips,
        rng_seed: opt.seed,
    };
    if config.effective_rate() != DEFAULT_INSTRUCTIONS_PER_SECOND {
        log::info!("Running at {} instructions per second", config.effective_rate());
    }

    let name = opt
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let program = EmulationCore::load(name, &rom)?;

    let core = EmulationCore::new(config);
    let mut frames = core.frames();
    core.start(program)?;

    for key in keys {
        core.key_down(key)?;
        thread::sleep(Duration::from_millis(50));
        core.key_up(key)?;
    }

    thread::sleep(run_for);
    let state = core.state()?;
    let frame = frames.latest();
    core.stop()?;

    print!("{}", frame);
    if let RunState::Halted(fault) = state {
        eprintln!("Halted: {}", fault);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_parsed_as_hex_digits() {
        assert_eq!(
            parse_keys("5,a, F"),
            Ok(vec![
                Key::new(5).unwrap(),
                Key::new(0xA).unwrap(),
                Key::new(0xF).unwrap()
            ])
        );
        assert_eq!(parse_keys(""), Ok(vec![]));
        assert!(parse_keys("g").is_err());
        assert!(parse_keys("10").is_err());
        assert!(parse_keys("5a").is_err());
    }

    #[test]
    fn run_time_rejects_unusable_values() {
        assert_eq!(run_time(1.5), Ok(Duration::from_millis(1500)));
        assert_eq!(run_time(0.0), Ok(Duration::from_secs(0)));
        assert!(run_time(f64::INFINITY).is_err());
        assert!(run_time(f64::NAN).is_err());
        assert!(run_time(-1.0).is_err());
        assert!(run_time(1e30).is_err());
    }
}
