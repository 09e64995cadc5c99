use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "irc26=info,actix_web=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// filter; a second call leaves the first subscriber in place.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
