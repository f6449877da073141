use std::{env, io, path::PathBuf, process};

use onebrc_scan::{run, Config, Error, Summary};

fn main() {
    env_logger::init();
    match try_main() {
        Ok(summary) => eprintln!("{}", summary),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

fn try_main() -> Result<Summary, Error> {
    let mut args = env::args_os();
    let program = args
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    let measurements_path = PathBuf::from(args.next().ok_or(Error::Usage { program })?);
    let config = Config::from_env()?;
    run(&measurements_path, &config, io::stdout().lock())
}
