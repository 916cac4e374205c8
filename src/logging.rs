use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

/// Log to stderr, `RUST_LOG` first, `-v`/`-q` on top when given.
pub fn setup<Level>(verbosity: clap_verbosity_flag::Verbosity<Level>)
where
    Level: clap_verbosity_flag::LogLevel,
{
    let mut env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    if verbosity.is_present() {
        let directive = tracing_subscriber::filter::Directive::from(verbosity.tracing_level_filter());
        env_filter = env_filter.add_directive(directive);
    }

    let subscriber = tracing_subscriber::registry::Registry::default().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter),
    );

    tracing::subscriber::set_global_default(subscriber).expect("Setting up logger works");
}
