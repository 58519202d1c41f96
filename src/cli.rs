use std::ffi::OsString;
use std::fmt;
use std::io::Write;

use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};
use rand::Rng;

use crate::mac::{self, HardwareAddress};
use crate::netdev::NetControl;
use crate::prelude::*;
use crate::reconfig::Reconfigurator;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Network interface whose hardware address is replaced
    #[clap(value_parser = NonEmptyStringValueParser::new())]
    pub interface: String,

    /// Apply this address instead of a random locally administered one
    #[clap(short, long)]
    pub mac: Option<HardwareAddress>,

    /// Log verbosity, repeat for more detail
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn init_logging(verbose: u8) -> Void {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .try_init()?;
    Ok(())
}

/// Parses `argv`, replaces the interface's address and reports the result.
///
/// Returns the process exit code. Nothing is opened on `control` unless the
/// arguments parse.
pub fn run<I, T, C, R, O, E>(argv: I, control: C, rng: &mut R, out: &mut O, err: &mut E) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    C: NetControl,
    R: Rng + ?Sized,
    O: Write,
    E: Write,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            report(err, format_args!("{}", e.render()));
            return EXIT_FAILURE;
        }
        Err(e) => {
            report(out, format_args!("{}", e.render()));
            return EXIT_SUCCESS;
        }
    };

    if let Err(e) = init_logging(args.verbose) {
        debug!("logger already installed: {e}");
    }

    match execute(&args, control, rng) {
        Ok(address) => {
            report(out, format_args!("New MAC: {address}\n"));
            EXIT_SUCCESS
        }
        Err(e) => {
            report(err, format_args!("Failed to change MAC address: {e:#}\n"));
            EXIT_FAILURE
        }
    }
}

/// Output streams may already be closed, which must not change the exit code.
fn report<W: Write>(w: &mut W, args: fmt::Arguments<'_>) {
    if let Err(e) = w.write_fmt(args) {
        debug!("dropping output: {e}");
    }
}

fn execute<C, R>(args: &Args, control: C, rng: &mut R) -> Res<HardwareAddress>
where
    C: NetControl,
    R: Rng + ?Sized,
{
    let address = match args.mac {
        Some(mac) if mac.is_multicast() => bail!("{mac} is a multicast address"),
        Some(mac) => mac,
        None => mac::new_hardware_addr(rng),
    };
    Reconfigurator::new(control).apply(&args.interface, address)?;
    Ok(address)
}
