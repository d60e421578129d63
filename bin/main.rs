use clap::Parser;

#[derive(Debug, clap::Parser)]
#[command(long_about = None)]
struct Args {
    /// Result output directory
    #[arg(long, default_value_t = String::from("results/"))]
    output: String,
    /// Number of problem instances sampled per experiment
    #[arg(long, default_value_t = 10)]
    num_instances: usize,
    /// Number of jobs per generated instance
    #[arg(long, default_value_t = 10)]
    jobs: usize,
    /// Number of machines per generated instance
    #[arg(long, default_value_t = 10)]
    machines: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let summary = ce_rjssp_sim::experiment::run(&ce_rjssp_sim::experiment::ExperimentArgs {
        output: std::path::PathBuf::from(&args.output),
        num_instances: args.num_instances,
        jobs: args.jobs,
        machines: args.machines,
    })?;

    println!("Done. Artifacts saved to {}", args.output);
    log::debug!("{:#?}", summary);

    Ok(())
}
