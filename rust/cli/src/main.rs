use std::io::{self, Write};

fn main() {
    if let Err(e) = potsettle_cli::logging::init_logging() {
        let _ = writeln!(io::stderr(), "WARNING: logging disabled: {}", e);
    }
    let code = potsettle_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
