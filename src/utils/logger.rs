use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log target of this crate's own events (`flight_delay`).
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Filter used when `RUST_LOG` is unset: verbose runs show this crate's
/// debug events plus info from dependencies; otherwise only our info.
fn default_directives(verbose: bool) -> String {
    if verbose {
        format!("{}=debug,info", CRATE_TARGET)
    } else {
        format!("{}=info", CRATE_TARGET)
    }
}

pub fn init_cli_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(false), "flight_delay=info");
        assert_eq!(default_directives(true), "flight_delay=debug,info");
    }
}
