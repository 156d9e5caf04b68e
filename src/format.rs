//! How a resolved mount point is written out.

/// Output style for mount point paths.  Plain text is the default because the output is meant to be read, not pasted back into a shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
	/// The path exactly as resolved, spaces and all.
	Plain,
	/// The path with shell metacharacters backslash-escaped.
	ShellEscaped,
}

impl Default for OutputFormat {
	fn default() -> OutputFormat {
		OutputFormat::Plain
	}
}

impl OutputFormat {
	/// # Examples
	/// ```
	/// # use findflash::OutputFormat;
	/// assert_eq!(OutputFormat::Plain.apply("/Volumes/My Disk"), "/Volumes/My Disk");
	/// assert_eq!(OutputFormat::ShellEscaped.apply("/Volumes/My Disk"), "/Volumes/My\\ Disk");
	/// ```
	pub fn apply<'a>(&self, path: &'a str) -> std::borrow::Cow<'a, str> {
		match self {
			OutputFormat::Plain => std::borrow::Cow::Borrowed(path),
			OutputFormat::ShellEscaped => shell_escape(path),
		}
	}
}

fn is_shell_safe(c: char) -> bool {
	c.is_ascii_alphanumeric() || "_-./,:@%+=".contains(c)
}

/// Prefixes every character a POSIX shell would treat specially with a backslash.  The empty string becomes `''` so that it survives as an argument.
pub fn shell_escape(s: &str) -> std::borrow::Cow<'_, str> {
	if s.is_empty() {
		return std::borrow::Cow::Borrowed("''");
	}
	if s.chars().all(is_shell_safe) {
		return std::borrow::Cow::Borrowed(s);
	}
	let mut escaped = std::string::String::with_capacity(s.len() + 8);
	for c in s.chars() {
		if !is_shell_safe(c) {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	std::borrow::Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_plain_is_verbatim() {
		for path in &["/Volumes/My Disk", "/Volumes/it's", "/Volumes/a\\b", ""] {
			assert_eq!(OutputFormat::Plain.apply(path), *path);
		}
		assert_eq!(OutputFormat::default(), OutputFormat::Plain);
	}

	#[test]
	fn test_shell_escape() {
		assert_eq!(shell_escape("/Volumes/Backup"), "/Volumes/Backup");
		assert_eq!(shell_escape("/Volumes/NIKON D4"), "/Volumes/NIKON\\ D4");
		assert_eq!(shell_escape("/Volumes/it's (old)"), "/Volumes/it\\'s\\ \\(old\\)");
		assert_eq!(shell_escape("/Volumes/$HOME"), "/Volumes/\\$HOME");
		assert_eq!(shell_escape(""), "''");
	}

	#[test]
	fn test_safe_paths_are_borrowed() {
		assert!(matches!(shell_escape("/Volumes/Backup-2"), std::borrow::Cow::Borrowed(_)));
		assert!(matches!(shell_escape("/Volumes/My Disk"), std::borrow::Cow::Owned(_)));
	}
}
