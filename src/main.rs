mod ads;
mod args;

use clap::Parser;
use log::{debug, info, LevelFilter};
use snafu::{whatever, ErrorCompat};

use crate::ads::{list_sheets, plan_from_args, run_batch, AdsResult};
use crate::args::Args;

fn run(args: &Args) -> AdsResult<()> {
    if args.list_sheets {
        let path = match &args.factors {
            Some(p) => p.clone(),
            None => whatever!("--list-sheets requires --factors"),
        };
        for name in list_sheets(&path)? {
            println!("{}", name);
        }
        return Ok(());
    }

    let plan = plan_from_args(args)?;
    debug!("plan: {:?}", plan);
    let out_path = run_batch(&plan)?;
    info!("Output archive: {}", out_path.display());
    println!("{}", out_path.display());
    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("An error occurred:");
        for cause in ErrorCompat::iter_chain(&e) {
            eprintln!("  {}", cause);
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
