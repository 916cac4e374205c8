use clap::Parser;

/// Port used by `reset` when none is given.
pub const RESET_PLACEHOLDER_PORT: &str = "port";

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Path of an optional configuration file
    #[clap(long, short)]
    pub config: Option<camino::Utf8PathBuf>,

    /// Serial port of the display, overrides the configuration file
    #[clap(long, short)]
    pub port: Option<String>,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Default, clap::Subcommand)]
pub enum Command {
    /// Drive the clock until interrupted (default)
    #[default]
    Run,

    /// Reset the device through DTR and exit
    Reset {
        #[clap(default_value = RESET_PLACEHOLDER_PORT)]
        port: String,
    },

    VerifyConfig,

    /// Print the byte stream of one frame instead of sending it
    Render {
        /// Render this local time (HH:MM:SS) instead of now
        #[clap(long, value_parser = parse_time)]
        at: Option<chrono::NaiveTime>,
    },
}

fn parse_time(s: &str) -> Result<chrono::NaiveTime, chrono::ParseError> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M:%S")
}
