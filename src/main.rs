use crate::clock::TimeSource;

mod cli;
mod clock;
mod clock_task;
mod color;
mod config;
mod error;
mod frame;
mod logging;
mod protocol;
mod serial;

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::eyre::Result<()> {
    setup_panic();
    color_eyre::install().map_err(crate::error::Error::InstallingColorEyre)?;
    let cli = <crate::cli::Cli as clap::Parser>::parse();
    crate::logging::setup(cli.verbosity);

    let cfg = crate::config::Config::load_optional(cli.config.as_deref()).await?;

    match cli.command.unwrap_or_default() {
        cli::Command::Run => {
            run(cli.port, cfg).await?;
        }
        cli::Command::Reset { port } => {
            reset(&port, &cfg).await?;
        }
        cli::Command::VerifyConfig => {
            tracing::info!("Configuration verified");
        }
        cli::Command::Render { at } => {
            render(at);
        }
    }

    Ok(())
}

fn setup_panic() {
    human_panic::setup_panic!(human_panic::Metadata::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
    .authors(env!("CARGO_PKG_AUTHORS")));
}

async fn run(
    port: Option<String>,
    config: crate::config::Config,
) -> Result<(), crate::error::Error> {
    let port = port.unwrap_or_else(|| config.serial.port.clone());
    let mut link =
        crate::serial::SerialLink::open(&port, config.serial.baud_rate, config.serial.timeout)?;

    link.reset(config.serial.reset_hold).await?;
    tracing::info!(boot_delay = ?config.serial.boot_delay, "Waiting for device to boot");
    tokio::time::sleep(config.serial.boot_delay).await;

    let cancellation_token = tokio_util::sync::CancellationToken::new();
    let mut task = crate::clock_task::ClockTask::new(
        link,
        crate::clock::LocalClock::default(),
        cancellation_token.clone(),
        &config.display,
    );
    let mut handle = tokio::task::spawn_blocking(move || task.run());

    tokio::select! {
        result = &mut handle => {
            result.map_err(crate::error::Error::Join)??;
        }

        ctrl_c = tokio::signal::ctrl_c() => {
            ctrl_c.map_err(crate::error::Error::Signal)?;
            tracing::info!("Ctrl-C received, shutting down");
            cancellation_token.cancel();
            handle.await.map_err(crate::error::Error::Join)??;
        }
    }

    Ok(())
}

async fn reset(port: &str, config: &crate::config::Config) -> Result<(), crate::error::Error> {
    let mut link =
        crate::serial::SerialLink::open(port, config.reset.baud_rate, config.serial.timeout)?;
    link.reset(config.serial.reset_hold).await?;
    tracing::info!(port = link.name(), "Device reset");
    Ok(())
}

fn render(at: Option<chrono::NaiveTime>) {
    use chrono::Timelike;

    let sample = match at {
        Some(at) => {
            crate::clock::TimeSample::from_hms(at.hour() as u8, at.minute() as u8, at.second() as u8)
        }
        None => crate::clock::LocalClock::default().now(),
    };

    let mut frame = crate::frame::FrameBuffer::new();
    crate::clock::ClockFace.render(&mut frame, &sample);
    let stream = crate::protocol::encode_frame(&frame);
    println!("{}", String::from_utf8_lossy(&stream));
}
