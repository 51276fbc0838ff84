pub mod config;
pub mod country;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod explore;
pub mod history;
pub mod load;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod policy;

pub use config::Config;
pub use error::HarmonizeError;

/// Column names of the persisted final dataset.
pub mod columns {
    pub const COUNTRY: &str = "Country";
    pub const COUNTRY_CODE: &str = "Country Code";
    pub const YEAR: &str = "Year";
    pub const GINI: &str = "Gini Coefficient";
}

/// Install a `tracing` subscriber with an `EnvFilter`, defaulting to `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ginicast=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
