use clap::Parser;
use log::error;
use std::process::ExitCode;
use std::time::Duration;

use cvprep::{
    cleanup_images, copy_with_unique_id, create_config, prepare_folder_structure, render_tree,
    resolve_model, sweep_recent_images, Args, Command, ConsoleNameProvider, SweepConfig,
    TrainingPlan, Workspace,
};

fn run(args: Args) -> cvprep::Result<()> {
    match args.command {
        Command::Init {
            task,
            group,
            data_root,
        } => {
            let workspace = Workspace::new(data_root);
            let group_dir = match group {
                Some(group) => workspace.init_named_group(task, &group)?,
                None => workspace.init_group(task, &mut ConsoleNameProvider)?,
            };
            println!("{}", group_dir.path.display());
        }
        Command::Split(split) => {
            prepare_folder_structure(&split.path, split.task, &split.split_options())?;
        }
        Command::Config { path, task } => {
            create_config(&path, task)?;
        }
        Command::Prepare(split) => {
            prepare_folder_structure(&split.path, split.task, &split.split_options())?;
            create_config(&split.path, split.task)?;
        }
        Command::Tree { path, files } => {
            print!("{}", render_tree(&path, files)?);
        }
        Command::Cleanup { path } => {
            cleanup_images(&path)?;
        }
        Command::CopyUnique { source, dest_dir } => {
            if let Some(destination) = copy_with_unique_id(&source, &dest_dir) {
                println!("{}", destination.display());
            }
        }
        Command::Sweep {
            source,
            target,
            hours,
        } => {
            let max_age = Duration::from_secs(hours.saturating_mul(3600));
            let config = SweepConfig::new(source, target).with_max_age(max_age);
            sweep_recent_images(&config)?;
        }
        Command::Model { group_dir, run } => {
            println!("{}", resolve_model(&group_dir, run)?.display());
        }
        Command::TrainPlan { group_dir, epochs } => {
            print!("{}", TrainingPlan::for_group(&group_dir, epochs).to_yaml()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
