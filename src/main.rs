use clap::Parser;
use findflash::{Diskutil, MountPointResolver, MountTable};

mod cli;
mod logging;

/// Prints the mount point of every mounted, non-system volume, one per line.
fn main() -> std::process::ExitCode {
	let cli = cli::Cli::parse();
	logging::init(cli.verbose);
	let result = findflash::mounts().and_then(|table| {
		let stdout = std::io::stdout();
		let mut out = stdout.lock();
		run(&cli, &table, &mut out)
	});
	std::process::ExitCode::from(exit_status(&result))
}

fn run<W: std::io::Write>(cli: &cli::Cli, table: &MountTable, out: &mut W) -> findflash::Result<findflash::Summary> {
	let diskutil = Diskutil::new();
	let resolver: &dyn MountPointResolver = match cli.resolver {
		cli::Resolver::Diskutil => &diskutil,
		cli::Resolver::MountTable => table,
	};
	findflash::run(table, resolver, &cli.options(), out)
}

// Success is 0 even when nothing was printed.  Any error that reaches here ended the run, so it is 1.
fn exit_status(result: &findflash::Result<findflash::Summary>) -> u8 {
	match result {
		Ok(summary) => {
			log::debug!("{:?}", summary);
			0
		}
		Err(e) => {
			eprintln!("findflash: {}", e);
			1
		}
	}
}
