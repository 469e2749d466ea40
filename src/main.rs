use lazy_objects::repl::{Repl, ReplConfig, ReplErr};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = ReplConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut repl = match Repl::new(&config) {
        Ok(repl) => repl,
        Err(e) => {
            eprintln!("Fatal Exception before REPL: {e:#}");
            return;
        }
    };

    loop {
        match repl.rep() {
            Ok(()) => {}
            Err(ReplErr::Stop) => return,
            Err(ReplErr::Fatal(e)) => {
                eprintln!("Fatal Exception: {e:#}");
                return;
            }
            Err(e) => eprintln!("Exception: {e}"),
        }
    }
}
