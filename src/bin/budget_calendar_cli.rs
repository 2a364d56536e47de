use budget_calendar::{
    cli::{output::Output, run_cli},
    init,
};

fn main() {
    init();

    if let Err(err) = run_cli() {
        Output::default().error(format!("{err:#}"));
        std::process::exit(1);
    }
}
