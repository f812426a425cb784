use std::error::Error;
use std::fs::File;

use chip8term::config::Config;
use chip8term::display::MonoTermDisplay;
use chip8term::environment::Environment;
use chip8term::input::TermInput;
use chip8term::interpreter::Chip8Interpreter;
use clap::Parser;
use env_logger::{Env, Target};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();

    // the terminal belongs to the display, so logs go to a file
    let log_file = File::create(&config.log_file)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    // initialise
    let mut input = TermInput::new()?;
    let mut display = MonoTermDisplay::new(&config.rom_name())?;
    let interpreter = Chip8Interpreter::new();
    let mut environment = Environment::new(interpreter, &mut display, &mut input, config);

    // load a program
    environment.load_rom()?;
    environment.main_loop()?;
    Ok(())
}
