use clap::Parser;
use std::path::PathBuf;

/// timers count down at 60Hz on every CHIP-8 there ever was
pub const TIMER_HZ: u32 = 60;

/// a comfortable speed for most programs
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 500;

pub const DEFAULT_LOG_FILE: &str = "chip8_debug.log";

/// Settings for the terminal front end
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "chip8term", about = "CHIP-8 interpreter for the terminal")]
pub struct Config {
    /// program to load; with none the machine runs an empty memory
    #[arg(value_name = "ROM")]
    pub rom: Option<PathBuf>,

    /// how many instructions to run per second of wall-clock time
    #[arg(
        long = "ips",
        value_name = "N",
        default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub instructions_per_second: u32,

    /// where log output goes, since the terminal is busy
    #[arg(long = "log", value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// stop after this many 60Hz frames
    #[arg(long = "frames", value_name = "N")]
    pub max_frames: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rom: None,
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            max_frames: None,
        }
    }
}

impl Config {
    /// instructions to run between timer ticks, at least one
    pub fn steps_per_frame(&self) -> u32 {
        (self.instructions_per_second / TIMER_HZ).max(1)
    }

    /// file name of the ROM, for the status line
    pub fn rom_name(&self) -> String {
        match &self.rom {
            Some(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            None => "no ROM loaded".to_string(),
        }
    }
}
