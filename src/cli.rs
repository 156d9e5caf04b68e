use clap::{Parser, ValueEnum};

/// Prints the mount point of every mounted volume except those at /, /home, /dev and /net, one per line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
	/// Backslash-escape characters a shell would treat specially
	#[arg(long)]
	pub escape: bool,

	/// Append a tab and the free space of each volume
	#[arg(long)]
	pub free: bool,

	/// Where mount points are looked up
	#[arg(long, value_enum, default_value_t = Resolver::Diskutil)]
	pub resolver: Resolver,

	/// Log every device that is looked up
	#[arg(short, long)]
	pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Resolver {
	/// Ask `diskutil info` about each device
	Diskutil,
	/// Use the mount table that was already read
	MountTable,
}

impl Cli {
	pub fn options(&self) -> findflash::Options {
		findflash::Options {
			format: if self.escape { findflash::OutputFormat::ShellEscaped } else { findflash::OutputFormat::Plain },
			free_space: self.free,
		}
	}
}
