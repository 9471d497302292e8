use log::info;

use ugks::run;

fn main() -> Result<(), run::RunError> {
    env_logger::init();
    let scenario = std::env::args().nth(1).unwrap_or_else(|| "sod".to_string());
    let (t, steps) = match scenario.as_str() {
        "sod" => run::sod(128, 129, 0.2, 0.05)?,
        "uniform" => run::uniform(128, 129, 0.25, 0.05)?,
        other => {
            eprintln!("unknown scenario \"{}\", expected one of: sod, uniform", other);
            std::process::exit(2);
        }
    };
    info!("finished at t = {t:e} after {steps} steps");
    Ok(())
}
