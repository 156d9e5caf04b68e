//! Lists the mount points of mounted volumes on macOS, leaving out the system-reserved mounts at `/`, `/home`, `/dev` and `/net`.
//!
//! The work is split in two stages.  A [DeviceLister] reports which devices are mounted (normally a [MountTable] snapshot taken by running `mount`), and a [MountPointResolver] looks up where each device is mounted (normally [Diskutil], which asks `diskutil info`).  [pipeline::run()] drives both and prints one path per line.  Text parsing of command output is kept behind these two traits so the driver never sees it.

pub mod diskutil;
pub mod format;
pub mod mount_table;
pub mod pipeline;
pub mod space;

pub use diskutil::{Diskutil, VolumeInfo};
pub use format::OutputFormat;
pub use mount_table::MountTable;
pub use pipeline::{run, Options, Summary};

/// Mount points that are never reported.  Matching is exact, so `/Volumes/home` or `/dev/fd` are not excluded.
pub const SYSTEM_MOUNT_POINTS: [&str; 4] = ["/", "/home", "/dev", "/net"];

/// Returns true if `mount_point` is one of the [SYSTEM_MOUNT_POINTS].
///
/// # Examples
/// ```
/// assert!(findflash::is_system_mount_point("/home"));
/// assert!(!findflash::is_system_mount_point("/home/backup"));
/// ```
pub fn is_system_mount_point(mount_point: &str) -> bool {
	SYSTEM_MOUNT_POINTS.contains(&mount_point)
}

/// Splits command output into lines, trimming each one and dropping the blank ones.
///
/// # Examples
/// ```
/// assert_eq!(findflash::to_lines("  a \n\n b\n"), vec!["a", "b"]);
/// ```
pub fn to_lines(text: &str) -> std::vec::Vec<&str> {
	text.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Identifies a storage volume by its device node, e.g. `/dev/disk2s1`.  A device identifier is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Device(std::string::String);

impl Device {
	/// Wraps a device identifier, failing with [Error::EmptyDevice] if it is empty.
	///
	/// # Examples
	/// ```
	/// # use findflash::Device;
	/// let device = Device::new("/dev/disk2s1").unwrap();
	/// assert_eq!(device.as_str(), "/dev/disk2s1");
	/// assert!(Device::new("").is_err());
	/// ```
	pub fn new<S: Into<std::string::String>>(id: S) -> Result<Device> {
		let id = id.into();
		if id.is_empty() {
			return Err(Error::EmptyDevice);
		}
		Ok(Device(id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for Device {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl std::str::FromStr for Device {
	type Err = Error;

	fn from_str(s: &str) -> Result<Device> {
		Device::new(s)
	}
}

/// Describes a mounted filesystem as reported by `mount`, see `man 8 mount` for more details.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Mount {
	/// The device from which the filesystem is mounted, e.g. /dev/disk2s1
	pub device: std::string::String,
	/// Where in the root filesystem the device is mounted, e.g. /Volumes/My Disk
	pub mount_point: std::string::String,
	/// The filesystem type, e.g. apfs
	pub file_system_type: std::string::String,
	/// The remaining mount options, e.g. ["local", "nodev", "nosuid"]
	pub options: std::vec::Vec<std::string::String>,
}

impl Mount {
	/// Returns true if this filesystem is mounted at one of the [SYSTEM_MOUNT_POINTS].
	pub fn is_system(&self) -> bool {
		is_system_mount_point(&self.mount_point)
	}
}

/// Implements `Display` for `Mount` to simulate the output of the BSD mount command.
///
/// # Examples
/// ```
/// # use findflash::Mount;
/// # use std::string::String;
/// let mount = Mount {
/// 	device: String::from("/dev/disk2s1"),
/// 	mount_point: String::from("/Volumes/My Disk"),
/// 	file_system_type: String::from("msdos"),
/// 	options: vec![String::from("local"), String::from("nodev")]
/// };
/// assert_eq!(mount.to_string(), "/dev/disk2s1 on /Volumes/My Disk (msdos, local, nodev)");
/// ```
impl std::fmt::Display for Mount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let fields: std::vec::Vec<&str> = std::iter::once(self.file_system_type.as_str())
			.chain(self.options.iter().map(std::string::String::as_str))
			.filter(|field| !field.is_empty())
			.collect();
		write!(f, "{} on {} ({})", self.device, self.mount_point, fields.join(", "))
	}
}

/// Reports the devices currently mounted outside the [SYSTEM_MOUNT_POINTS].
pub trait DeviceLister {
	/// Returns device identifiers in the order the operating system reported them.
	fn list_devices(&self) -> Result<std::vec::Vec<Device>>;
}

/// Looks up where a single device is mounted.
pub trait MountPointResolver {
	/// Returns the mount point of `device` verbatim, or `None` if the device has no mount point (for example because it was unmounted after it was listed).  Failures are specific to this device and are reported as [Error::NotFound] or [Error::PermissionDenied].
	fn resolve(&self, device: &Device) -> Result<std::option::Option<std::string::String>>;
}

/// The nom crate's error types do not cleanly implement std::error::Error.  This structure is a custom error type that implements Error and remembers which line of input could not be parsed.
#[derive(Default, Clone, PartialEq)]
pub struct ParseError {
	line: std::string::String,
}

impl ParseError {
	pub fn new<S: Into<std::string::String>>(line: S) -> ParseError {
		ParseError { line: line.into() }
	}

	/// The line of input that could not be parsed.
	pub fn line(&self) -> &str {
		&self.line
	}
}

impl std::fmt::Display for ParseError {
	/// Indicate which line could not be parsed.
	/// # Examples
	/// ```
	/// # use findflash::ParseError;
	/// assert_eq!(format!("{}", ParseError::new("garbage")), "unrecognized mount table line: garbage")
	/// ```
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "unrecognized mount table line: {}", self.line)
	}
}

impl std::fmt::Debug for ParseError {
	/// The debug output is the same as the display output, there is nothing more to add.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		<ParseError as std::fmt::Display>::fmt(self, f)
	}
}

impl std::error::Error for ParseError {}

/// Everything that can go wrong while listing mount points.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// The mount table could not be read at all.
	#[error("could not read the mount table: {0}")]
	Enumeration(#[source] std::io::Error),

	/// The mount table was read but one of its lines is not understood.
	#[error(transparent)]
	Parse(#[from] ParseError),

	/// Metadata for a device could not be found.
	#[error("no metadata for {device}: {reason}")]
	NotFound { device: std::string::String, reason: std::string::String },

	/// Metadata for a device exists but may not be read.
	#[error("permission denied reading metadata for {device}: {reason}")]
	PermissionDenied { device: std::string::String, reason: std::string::String },

	/// A device identifier was empty.
	#[error("device identifier is empty")]
	EmptyDevice,

	/// Writing output or reading filesystem statistics failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Classifies a failed lookup of `device` by the kind of I/O error behind it.
	pub fn resolution(device: &Device, err: std::io::Error) -> Error {
		let device = device.to_string();
		let reason = err.to_string();
		match err.kind() {
			std::io::ErrorKind::PermissionDenied => Error::PermissionDenied { device, reason },
			_ => Error::NotFound { device, reason },
		}
	}

	/// Returns true for errors that only affect a single device.
	pub fn is_per_device(&self) -> bool {
		matches!(self, Error::NotFound { .. } | Error::PermissionDenied { .. })
	}
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convenience method equivalent to `MountTable::read()`.
pub fn mounts() -> Result<MountTable> {
	MountTable::read()
}
