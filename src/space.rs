//! Free space on a mounted volume, reported the way `df -h` would print it.

const UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count with the largest unit that keeps the value at or above one, rounding down.  Sizes past exabytes stay in exabytes.
///
/// # Examples
/// ```
/// # use findflash::space::human_readable;
/// assert_eq!(human_readable(1023), "1023B");
/// assert_eq!(human_readable(3 * 1024 * 1024 - 1), "2MB");
/// ```
pub fn human_readable(bytes: u64) -> std::string::String {
	let mut value = bytes;
	let mut unit = 0;
	while value >= 1024 && unit < UNITS.len() - 1 {
		value /= 1024;
		unit += 1;
	}
	format!("{}{}", value, UNITS[unit])
}

/// Bytes available to an unprivileged user on the filesystem holding `path`.
///
/// `statvfs` counts free space in fragments rather than blocks, so this is the fragment size times the number of fragments available.
pub fn avail_space<P: AsRef<std::path::Path>>(path: P) -> crate::Result<u64> {
	let stats = nix::sys::statvfs::statvfs(path.as_ref()).map_err(std::io::Error::from)?;
	Ok((stats.fragment_size() as u64).saturating_mul(stats.blocks_available() as u64))
}
