#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Setting up error reporting failed")]
    InstallingColorEyre(#[source] color_eyre::Report),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("Serial link error")]
    Link(#[from] crate::serial::LinkError),

    #[error("Clock task failed to complete")]
    Join(#[source] tokio::task::JoinError),

    #[error("Failed to listen for Ctrl-C")]
    Signal(#[source] std::io::Error),
}
