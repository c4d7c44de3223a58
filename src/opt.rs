use clap::{ArgAction, Parser};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Options {
    /// Logging verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Port to listen on
    #[arg(default_value_t = 8000, value_parser = port)]
    pub port: u16,

    /// Address to listen on
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    #[arg(
        short,
        long,
        help = "Directory to serve (--help for more)",
        long_help = r"Directory to serve:
    - defaults to the directory containing this executable
    - request paths never resolve outside of it"
    )]
    pub directory: Option<PathBuf>,
}

fn port(arg: &str) -> Result<u16, String> {
    arg.parse().map_err(|_| String::from("Invalid port number"))
}
