//! Snapshot of the operating system's mount table, read by running `mount` with no arguments.

use crate::{Device, DeviceLister, Mount, MountPointResolver};

/// The mounted filesystems at the moment the table was read.  The table is read once and never refreshed, so every question asked of it during a run sees the same state.
///
/// # Examples
/// ```
/// # use findflash::{DeviceLister, MountTable};
/// let table = MountTable::parse("/dev/disk1s1 on / (apfs, local, journaled)\n/dev/disk2s1 on /Volumes/Backup (hfs, local, nodev)\n").unwrap();
/// let devices = table.list_devices().unwrap();
/// assert_eq!(devices.len(), 1);
/// assert_eq!(devices[0].as_str(), "/dev/disk2s1");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MountTable {
	mounts: std::vec::Vec<Mount>,
}

impl MountTable {
	/// Reads the live mount table.  You can also call [crate::mounts()] for convenience.
	pub fn read() -> crate::Result<MountTable> {
		MountTable::read_from(std::process::Command::new("mount"))
	}

	/// Runs `command` and parses its standard output as a mount table.  Fails with [crate::Error::Enumeration] if the command cannot be run, exits unsuccessfully or prints something that is not UTF-8.
	pub fn read_from(mut command: std::process::Command) -> crate::Result<MountTable> {
		let program = command.get_program().to_string_lossy().into_owned();
		log::debug!("reading mount table from `{}`", program);
		let output = command.output().map_err(crate::Error::Enumeration)?;
		if !output.status.success() {
			let stderr = std::string::String::from_utf8_lossy(&output.stderr);
			let message = format!("`{}` {}: {}", program, output.status, stderr.trim());
			return Err(crate::Error::Enumeration(std::io::Error::new(std::io::ErrorKind::Other, message)));
		}
		let text = std::string::String::from_utf8(output.stdout)
			.map_err(|e| crate::Error::Enumeration(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
		MountTable::parse(&text)
	}

	/// Parses the output of `mount`.  Blank lines are skipped; any other line that is not understood fails the whole table with [crate::Error::Parse].
	pub fn parse(text: &str) -> crate::Result<MountTable> {
		let mut mounts = std::vec::Vec::new();
		for line in crate::to_lines(text) {
			match parsers::parse_line(line) {
				Ok((_, mount)) => mounts.push(mount),
				Err(_) => return Err(crate::ParseError::new(line).into()),
			}
		}
		log::debug!("mount table has {} entries", mounts.len());
		Ok(MountTable { mounts })
	}

	pub fn mounts(&self) -> &[Mount] {
		&self.mounts
	}

	pub fn len(&self) -> usize {
		self.mounts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mounts.is_empty()
	}

	/// Returns the first entry for `device`, if it is mounted at all.
	pub fn find(&self, device: &Device) -> std::option::Option<&Mount> {
		self.mounts.iter().find(|mount| mount.device == device.as_str())
	}
}

impl From<std::vec::Vec<Mount>> for MountTable {
	fn from(mounts: std::vec::Vec<Mount>) -> MountTable {
		MountTable { mounts }
	}
}

impl IntoIterator for MountTable {
	type Item = Mount;
	type IntoIter = std::vec::IntoIter<Mount>;

	fn into_iter(self) -> Self::IntoIter {
		self.mounts.into_iter()
	}
}

impl<'a> IntoIterator for &'a MountTable {
	type Item = &'a Mount;
	type IntoIter = std::slice::Iter<'a, Mount>;

	fn into_iter(self) -> Self::IntoIter {
		self.mounts.iter()
	}
}

impl DeviceLister for MountTable {
	fn list_devices(&self) -> crate::Result<std::vec::Vec<Device>> {
		let mut devices = std::vec::Vec::new();
		for mount in &self.mounts {
			if mount.is_system() {
				log::debug!("skipping system mount {}", mount);
				continue;
			}
			devices.push(Device::new(mount.device.clone())?);
		}
		Ok(devices)
	}
}

/// Answers from the snapshot instead of asking `diskutil`, for hosts that do not have it.
impl MountPointResolver for MountTable {
	fn resolve(&self, device: &Device) -> crate::Result<std::option::Option<std::string::String>> {
		Ok(self.find(device).map(|mount| mount.mount_point.clone()))
	}
}

// Encapsulate individual nom parsers in a private submodule.  Only [parsers::parse_line()] is used outside of it.
pub(self) mod parsers {
	use crate::Mount;

	// Extract the device, which ends at the first " on ".  Devices such as `map auto_home` contain spaces of their own, so whitespace is not a delimiter here.
	fn device(i: &str) -> nom::IResult<&str, &str> {
		nom::combinator::verify(
			nom::sequence::terminated(nom::bytes::complete::take_until(" on "), nom::bytes::complete::tag(" on ")),
			|device: &str| !device.trim().is_empty(),
		)(i)
	}

	// Parse the parenthesized options into a vector of strings.  BSD mount separates them with ", ".
	fn mount_options(i: &str) -> nom::IResult<&str, std::vec::Vec<std::string::String>> {
		nom::sequence::delimited(
			nom::character::complete::char('('),
			nom::multi::separated_list(
				nom::sequence::terminated(nom::character::complete::char(','), nom::character::complete::space0),
				nom::combinator::map(nom::bytes::complete::is_not(",)"), |option: &str| option.trim().to_string()),
			),
			nom::character::complete::char(')'),
		)(i)
	}

	// Parse a line of `mount` output into a Mount struct:
	// ```ignore
	// /dev/disk2s1 on /Volumes/My Disk (msdos, local, nodev, nosuid)
	// ```
	// The mount point may contain spaces and even " (", so the options are taken to start at the last " (" on the line.
	pub fn parse_line(i: &str) -> nom::IResult<&str, Mount> {
		let (i, device) = device(i)?;
		let split = match i.rfind(" (") {
			Some(split) => split,
			None => return Err(nom::Err::Error((i, nom::error::ErrorKind::TakeUntil))),
		};
		let mount_point = &i[..split];
		if mount_point.is_empty() {
			return Err(nom::Err::Error((i, nom::error::ErrorKind::Verify)));
		}
		let (i, mut options) = nom::combinator::all_consuming(nom::sequence::terminated(
			mount_options,
			nom::character::complete::space0,
		))(&i[split + 1..])?;
		// BSD mount lists the filesystem type as the first option.
		let file_system_type = if options.is_empty() { std::string::String::new() } else { options.remove(0) };
		Ok((i, Mount {
			device: device.to_string(),
			mount_point: mount_point.to_string(),
			file_system_type,
			options,
		}))
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn test_device() {
			assert_eq!(device("/dev/disk2s1 on /Volumes/Backup (hfs)"), Ok(("/Volumes/Backup (hfs)", "/dev/disk2s1")));
			assert_eq!(device("map auto_home on /home (autofs)"), Ok(("/home (autofs)", "map auto_home")));
			assert!(device("/dev/disk2s1 /Volumes/Backup").is_err());
			assert!(device(" on /Volumes/Backup (hfs)").is_err());
		}

		#[test]
		fn test_mount_options() {
			assert_eq!(mount_options("(apfs, local, journaled)"), Ok(("", vec!["apfs".to_string(), "local".to_string(), "journaled".to_string()])));
			assert_eq!(mount_options("()"), Ok(("", vec![])));
			assert!(mount_options("apfs, local").is_err());
		}

		#[test]
		fn test_parse_line_bsd() {
			let (_, mount) = parse_line("/dev/disk2s1 on /Volumes/My Disk (msdos, local, nodev, nosuid, noowners)").unwrap();
			assert_eq!(mount.device, "/dev/disk2s1");
			assert_eq!(mount.mount_point, "/Volumes/My Disk");
			assert_eq!(mount.file_system_type, "msdos");
			assert_eq!(mount.options, vec!["local", "nodev", "nosuid", "noowners"]);
		}

		#[test]
		fn test_parse_line_type_in_mount_point() {
			let (_, mount) = parse_line("/dev/disk4s1 on /Volumes/Disk type B (msdos, local, nodev)").unwrap();
			assert_eq!(mount.mount_point, "/Volumes/Disk type B");
			assert_eq!(mount.file_system_type, "msdos");
			assert_eq!(mount.options, vec!["local", "nodev"]);
		}

		#[test]
		fn test_parse_line_parenthesis_in_mount_point() {
			let (_, mount) = parse_line("/dev/disk3s2 on /Volumes/Photos (2019) (exfat, local)").unwrap();
			assert_eq!(mount.mount_point, "/Volumes/Photos (2019)");
			assert_eq!(mount.file_system_type, "exfat");
			assert_eq!(mount.options, vec!["local"]);
		}

		#[test]
		fn test_parse_line_rejects_garbage() {
			assert!(parse_line("not a mount line").is_err());
			assert!(parse_line("/dev/disk2s1 on /Volumes/Backup").is_err());
			assert!(parse_line("/dev/disk2s1 on /Volumes/Backup (hfs, local) trailing").is_err());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MACOS_MOUNT: &str = "\
/dev/disk3s1s1 on / (apfs, sealed, local, read-only, journaled)
devfs on /dev (devfs, local, nobrowse)
/dev/disk3s5 on /System/Volumes/Data (apfs, local, journaled, nobrowse, protect)
map auto_home on /System/Volumes/Data/home (autofs, automounted, nobrowse)
map -hosts on /net (autofs, nosuid, automounted, nobrowse)
/dev/disk4s1 on /Volumes/My Disk (msdos, local, nodev, nosuid, noowners)
";

	#[test]
	fn test_parse_keeps_every_entry_in_order() {
		let table = MountTable::parse(MACOS_MOUNT).unwrap();
		assert_eq!(table.len(), 6);
		let devices: std::vec::Vec<&str> = table.mounts().iter().map(|m| m.device.as_str()).collect();
		assert_eq!(devices, vec!["/dev/disk3s1s1", "devfs", "/dev/disk3s5", "map auto_home", "map -hosts", "/dev/disk4s1"]);
	}

	#[test]
	fn test_list_devices_excludes_system_mounts() {
		let table = MountTable::parse(MACOS_MOUNT).unwrap();
		let devices: std::vec::Vec<std::string::String> = table.list_devices().unwrap().into_iter().map(|d| d.to_string()).collect();
		assert_eq!(devices, vec!["/dev/disk3s5", "map auto_home", "/dev/disk4s1"]);
	}

	#[test]
	fn test_parse_error_names_line() {
		match MountTable::parse("/dev/disk2s1 on /Volumes/Backup (hfs)\nwhat is this\n") {
			Err(crate::Error::Parse(e)) => assert_eq!(e.line(), "what is this"),
			other => panic!("unexpected result {:?}", other),
		}
	}

	#[test]
	fn test_blank_table() {
		let table = MountTable::parse("\n  \n").unwrap();
		assert!(table.is_empty());
		assert!(table.list_devices().unwrap().is_empty());
	}

	#[test]
	fn test_resolve_from_snapshot() {
		let table = MountTable::parse(MACOS_MOUNT).unwrap();
		let device = Device::new("/dev/disk4s1").unwrap();
		assert_eq!(table.resolve(&device).unwrap(), Some("/Volumes/My Disk".to_string()));
		let gone = Device::new("/dev/disk9s9").unwrap();
		assert_eq!(table.resolve(&gone).unwrap(), None);
	}

	#[test]
	fn test_list_devices_rejects_empty_device() {
		let table = MountTable::from(vec![Mount { mount_point: "/Volumes/X".to_string(), ..Mount::default() }]);
		assert!(matches!(table.list_devices(), Err(crate::Error::EmptyDevice)));
	}

	#[cfg(unix)]
	#[test]
	fn test_read_from_command() {
		let mut command = std::process::Command::new("sh");
		command.arg("-c").arg("printf '%s\\n' '/dev/disk1s1 on / (apfs, local)' '/dev/disk2s1 on /Volumes/Backup (hfs, local)'");
		let table = MountTable::read_from(command).unwrap();
		assert_eq!(table.len(), 2);
		assert_eq!(table.mounts()[1].mount_point, "/Volumes/Backup");
	}

	#[cfg(unix)]
	#[test]
	fn test_read_from_failing_command() {
		let mut command = std::process::Command::new("sh");
		command.arg("-c").arg("echo broken >&2; exit 3");
		match MountTable::read_from(command) {
			Err(crate::Error::Enumeration(e)) => assert!(e.to_string().contains("broken")),
			other => panic!("unexpected result {:?}", other),
		}
		let missing = std::process::Command::new("/nonexistent/findflash-mount");
		assert!(matches!(MountTable::read_from(missing), Err(crate::Error::Enumeration(_))));
	}
}
