use listing_wizard::{
    cli::{run_cli, CliOptions},
    init,
};

fn main() {
    init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = CliOptions::from_env(&args);
    if let Err(err) = run_cli(&options) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
