/// Logs go to stderr so that stdout only ever carries mount points.  `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
		.target(env_logger::Target::Stderr)
		.init();
}
