use quicklog::{cli::output, cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        output::error(&err);
        std::process::exit(1);
    }
}
