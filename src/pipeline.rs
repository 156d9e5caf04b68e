//! Drives a [DeviceLister] and a [MountPointResolver] and prints what they find.

use crate::{DeviceLister, MountPointResolver, OutputFormat};

/// How each line of output is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
	pub format: OutputFormat,
	/// Append a tab and the free space of the volume to every line.
	pub free_space: bool,
}

/// What happened to the devices of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
	/// Devices reported by the lister.
	pub listed: usize,
	/// Mount points written to the output.
	pub printed: usize,
	/// Devices that reported no mount point.
	pub unmounted: usize,
	/// Devices whose lookup failed.
	pub failed: usize,
}

/// Lists devices once, resolves each in the order listed and writes one mount point per line to `out`.
///
/// A device that cannot be resolved is logged and skipped; only a failure to list devices or to write output ends the run early.
///
/// # Examples
/// ```
/// # use findflash::{MountTable, Options};
/// let table = MountTable::parse("/dev/disk1s1 on / (apfs, local)\n/dev/disk2s1 on /Volumes/Backup (hfs, local)\n").unwrap();
/// let mut out = Vec::new();
/// let summary = findflash::run(&table, &table, &Options::default(), &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "/Volumes/Backup\n");
/// assert_eq!(summary.printed, 1);
/// ```
pub fn run<L, R, W>(lister: &L, resolver: &R, options: &Options, out: &mut W) -> crate::Result<Summary>
where
	L: DeviceLister + ?Sized,
	R: MountPointResolver + ?Sized,
	W: std::io::Write,
{
	let devices = lister.list_devices()?;
	let mut summary = Summary { listed: devices.len(), ..Summary::default() };
	for device in &devices {
		match resolver.resolve(device) {
			Ok(Some(mount_point)) => {
				log::debug!("{} is mounted at {}", device, mount_point);
				write_line(out, &mount_point, options)?;
				summary.printed += 1;
			}
			Ok(None) => {
				log::debug!("{} has no mount point", device);
				summary.unmounted += 1;
			}
			Err(e) if e.is_per_device() => {
				log::warn!("skipping {}: {}", device, e);
				summary.failed += 1;
			}
			Err(e) => return Err(e),
		}
	}
	out.flush()?;
	Ok(summary)
}

fn write_line<W: std::io::Write>(out: &mut W, mount_point: &str, options: &Options) -> crate::Result<()> {
	let path = options.format.apply(mount_point);
	if options.free_space {
		match crate::space::avail_space(mount_point) {
			Ok(bytes) => {
				writeln!(out, "{}\t{}", path, crate::space::human_readable(bytes))?;
				return Ok(());
			}
			Err(e) => log::warn!("no free space for {}: {}", mount_point, e),
		}
	}
	writeln!(out, "{}", path)?;
	Ok(())
}
