use std::io;

use macshift::cli;
use macshift::netdev::IoctlControl;

fn main() {
    let code = cli::run(
        std::env::args_os(),
        IoctlControl,
        &mut rand::thread_rng(),
        &mut io::stdout(),
        &mut io::stderr(),
    );
    std::process::exit(code);
}
