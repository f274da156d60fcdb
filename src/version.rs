/// Build version reported by `server --version` and the startup log.
/// `SUBSCRIPTIONS_VERSION` set at compile time overrides the crate version.
pub const VERSION: &str = match option_env!("SUBSCRIPTIONS_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
