use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use nrfu::LogLevel;

/// Update firmware on a nRF5 device running its Secure DFU bootloader, over serial.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial device path
    #[arg(short = 'd', long = "device")]
    device: String,

    /// Init-packet (*.dat) file
    #[arg(short = 'i', long = "init-packet")]
    init_packet: PathBuf,

    /// Firmware (*.bin) file
    #[arg(short = 'f', long = "firmware")]
    firmware: PathBuf,

    /// Log level: 1=silent, 2=error (default), 3=info, 4=debug
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<i32>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = LogLevel::from_cli_flag(args.log_level);

    env_logger::builder()
        .filter_level(log_level_filter(log_level))
        .parse_default_env()
        .init();

    match nrfu::update(&args.device, &args.init_packet, &args.firmware, log_level) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => {
            eprintln!("Update failed!");
            ExitCode::FAILURE
        }
    }
}

fn log_level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Silent => log::LevelFilter::Off,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}
