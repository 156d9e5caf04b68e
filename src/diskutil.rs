//! Resolves mount points by asking `diskutil info <device>`.

use crate::{Device, Error, MountPointResolver};

const MOUNT_POINT: &str = "Mount Point";

/// Runs `diskutil info` once per device and reads its `Mount Point` field.
#[derive(Clone, Debug)]
pub struct Diskutil {
	program: std::ffi::OsString,
}

impl Default for Diskutil {
	fn default() -> Diskutil {
		Diskutil::with_program("diskutil")
	}
}

impl Diskutil {
	pub fn new() -> Diskutil {
		Diskutil::default()
	}

	/// Uses `program` in place of `diskutil`.  It is invoked as `program info <device>` and must print `Key: Value` lines.
	pub fn with_program<S: Into<std::ffi::OsString>>(program: S) -> Diskutil {
		Diskutil { program: program.into() }
	}

	/// Runs `diskutil info` for `device` and parses what it prints.
	pub fn info(&self, device: &Device) -> crate::Result<VolumeInfo> {
		log::debug!("querying {:?} for {}", self.program, device);
		let output = std::process::Command::new(&self.program)
			.arg("info")
			.arg(device.as_str())
			.output()
			.map_err(|e| Error::resolution(device, e))?;
		if !output.status.success() {
			return Err(failure(device, &output));
		}
		Ok(VolumeInfo::parse(&std::string::String::from_utf8_lossy(&output.stdout)))
	}
}

impl MountPointResolver for Diskutil {
	fn resolve(&self, device: &Device) -> crate::Result<std::option::Option<std::string::String>> {
		Ok(self.info(device)?.mount_point().map(str::to_string))
	}
}

// diskutil reports unknown disks on stdout, so fall back to it when stderr is empty.
fn failure(device: &Device, output: &std::process::Output) -> Error {
	let stderr = std::string::String::from_utf8_lossy(&output.stderr);
	let stdout = std::string::String::from_utf8_lossy(&output.stdout);
	let reason = match (stderr.trim(), stdout.trim()) {
		("", "") => format!("exited with {}", output.status),
		("", stdout) => stdout.to_string(),
		(stderr, _) => stderr.to_string(),
	};
	let lowered = reason.to_lowercase();
	let device = device.to_string();
	if lowered.contains("permission") || lowered.contains("not permitted") {
		Error::PermissionDenied { device, reason }
	} else {
		Error::NotFound { device, reason }
	}
}

/// The `Key: Value` properties printed by `diskutil info`, in the order they were printed.
///
/// # Examples
/// ```
/// # use findflash::VolumeInfo;
/// let info = VolumeInfo::parse("   Device Node:   /dev/disk2s1\n   Mount Point:   /Volumes/My Disk\n");
/// assert_eq!(info.get("Device Node"), Some("/dev/disk2s1"));
/// assert_eq!(info.mount_point(), Some("/Volumes/My Disk"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VolumeInfo {
	properties: std::vec::Vec<(std::string::String, std::string::String)>,
}

impl VolumeInfo {
	/// Lines that are not `Key: Value` pairs, such as blank lines and section headings, are ignored.
	pub fn parse(text: &str) -> VolumeInfo {
		// Only the indentation is trimmed; a mount point may end in a space.
		let properties = text
			.lines()
			.map(str::trim_start)
			.filter(|line| !line.is_empty())
			.filter_map(|line| parsers::property(line).ok())
			.map(|(_, (key, value))| (key.to_string(), value.to_string()))
			.collect();
		VolumeInfo { properties }
	}

	/// Returns the first value printed for `key`.
	pub fn get(&self, key: &str) -> std::option::Option<&str> {
		self.properties.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns the mount point, or `None` if the field is absent, empty, or reads `Not applicable ...` as it does for unmounted volumes and whole disks.
	pub fn mount_point(&self) -> std::option::Option<&str> {
		self.get(MOUNT_POINT).filter(|value| !value.is_empty() && !value.starts_with("Not applicable"))
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

pub(self) mod parsers {
	// Split a line at its first colon.  Values may contain further colons, and only the padding after the colon is removed from them.
	pub fn property(i: &str) -> nom::IResult<&str, (&str, &str)> {
		nom::combinator::map(
			nom::sequence::separated_pair(
				nom::combinator::verify(nom::bytes::complete::take_until(":"), |key: &str| !key.trim().is_empty()),
				nom::character::complete::char(':'),
				nom::combinator::rest,
			),
			|(key, value): (&str, &str)| (key.trim(), value.trim_start()),
		)(i)
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn test_property() {
			assert_eq!(property("Mount Point:   /Volumes/My Disk"), Ok(("", ("Mount Point", "/Volumes/My Disk"))));
			assert_eq!(property("Volume Name:   a:b"), Ok(("", ("Volume Name", "a:b"))));
			assert_eq!(property("Mount Point:"), Ok(("", ("Mount Point", ""))));
			assert_eq!(property("Mount Point:   /Volumes/Disk "), Ok(("", ("Mount Point", "/Volumes/Disk "))));
			assert!(property("no colon here").is_err());
			assert!(property(": orphan value").is_err());
		}
	}
}
