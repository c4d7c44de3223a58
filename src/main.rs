mod body;
mod config;
mod cors;
mod err;
mod http;
mod opt;
mod routes;
mod server;
mod tcp;

use clap::Parser;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let options = match opt::Options::try_parse() {
        Ok(options) => options,
        Err(e) if e.use_stderr() => {
            init_logging(0);
            log::error!("{}", e.to_string().trim_end());
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    init_logging(options.verbose);

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: opt::Options) -> Result<(), err::StartupError> {
    let opt::Options {
        verbose: _,
        port,
        bind,
        directory,
    } = options;

    let config = config::Config::new(SocketAddr::new(bind, port), directory)?;
    server::run(config, interrupted()).await
}

fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .target(env_logger::Target::Stdout)
        .init();
}

/// Resolves on Ctrl+C. The handler is installed right away, before anything is bound.
fn interrupted() -> impl Future<Output = ()> {
    let listener = interrupt_listener();
    async move {
        match listener {
            Ok(mut interrupt) => {
                interrupt.recv().await;
            }
            Err(e) => {
                log::error!("Unable to listen for Ctrl+C, running until killed: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(unix)]
fn interrupt_listener() -> Result<tokio::signal::unix::Signal, io::Error> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_listener() -> Result<tokio::signal::windows::CtrlC, io::Error> {
    tokio::signal::windows::ctrl_c()
}
