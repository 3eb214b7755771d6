use std::{
    io::{stdin, stdout},
    process::ExitCode,
};

use anyhow::Result;
use noupstate::{
    arg_parser::{ArgsOptions, Command},
    commands,
    device::DebugfsDevice,
    logger,
};

use tracing::{debug, error};

fn main() -> ExitCode {
    logger::init_logging();

    // Parse the command line arguments
    let args_options = ArgsOptions::parse();

    debug!(
        "noupstate v{}, simple utility tool for changing nouveau pstates. USE AT YOUR OWN RISK!",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(err) = run(args_options) {
        for e in err.chain() {
            error!("{e}");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args_options: ArgsOptions) -> Result<()> {
    let device =
        DebugfsDevice::with_root(&args_options.debugfs_root, args_options.device);

    let mut out = stdout().lock();

    match args_options.command {
        Command::List => commands::list(&device, args_options.json, &mut out),
        Command::Set => {
            let selection = args_options.selection.unwrap_or_default();

            commands::set(
                &device,
                selection,
                args_options.assume_yes,
                &mut stdin().lock(),
                &mut out,
            )
            .map(|_| ())
        }
    }
}
