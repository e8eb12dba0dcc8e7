use std::{net::SocketAddr, time::Duration};

use anyhow::bail;
use clap::Parser;
use ferroflake::SONYFLAKE_EPOCH;

/// Runtime configuration for the `ferroflake-server` binary.
///
/// Every value can come from a CLI flag, an environment variable, or a
/// `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferroflake-server",
    version,
    about = "Serves Sonyflake-style IDs over HTTP and the memcached text protocol"
)]
pub struct CliArgs {
    /// Address for the HTTP front.
    ///
    /// Environment variable: `HTTP_ADDR`
    #[arg(long, env = "HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub http_addr: SocketAddr,

    /// Address for the memcached text protocol front.
    ///
    /// Environment variable: `MEMCACHE_ADDR`
    #[arg(long, env = "MEMCACHE_ADDR", default_value = "127.0.0.1:11211")]
    pub memcache_addr: SocketAddr,

    /// Machine ID to embed in every ID, overriding the one derived from the
    /// host's first non-loopback IPv4 address.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID")]
    pub machine_id: Option<u16>,

    /// Epoch as milliseconds since 1970-01-01 UTC. Defaults to
    /// 2014-09-01 UTC.
    ///
    /// Environment variable: `EPOCH_MILLIS`
    #[arg(long, env = "EPOCH_MILLIS", default_value_t = SONYFLAKE_EPOCH.as_millis() as u64)]
    pub epoch_millis: u64,

    /// Length of one time unit in milliseconds.
    ///
    /// Environment variable: `TICK_MILLIS`
    #[arg(long, env = "TICK_MILLIS", default_value_t = 10)]
    pub tick_millis: u64,

    /// Longest accepted memcache command line, in bytes.
    ///
    /// Environment variable: `MAX_LINE_LENGTH`
    #[arg(long, env = "MAX_LINE_LENGTH", default_value_t = 8192)]
    pub max_line_length: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub memcache_addr: SocketAddr,
    pub machine_id: Option<u16>,
    pub epoch: Duration,
    pub tick: Duration,
    pub max_line_length: usize,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.tick_millis == 0 {
            bail!("TICK_MILLIS must be greater than 0");
        }

        if args.max_line_length == 0 {
            bail!("MAX_LINE_LENGTH must be greater than 0");
        }

        if args.http_addr == args.memcache_addr {
            bail!(
                "HTTP_ADDR and MEMCACHE_ADDR must differ (both are {})",
                args.http_addr
            );
        }

        // An epoch in the future is rejected when the clock is built.
        Ok(Self {
            http_addr: args.http_addr,
            memcache_addr: args.memcache_addr,
            machine_id: args.machine_id,
            epoch: Duration::from_millis(args.epoch_millis),
            tick: Duration::from_millis(args.tick_millis),
            max_line_length: args.max_line_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use ferroflake::{Error, SystemClock};

    use super::*;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["ferroflake-server"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags_are_used() {
        let config = ServerConfig::try_from(parse(&[
            "--http-addr",
            "127.0.0.1:9000",
            "--memcache-addr",
            "127.0.0.1:9001",
            "--machine-id",
            "513",
            "--epoch-millis",
            "1735689600000",
            "--tick-millis",
            "20",
            "--max-line-length",
            "128",
        ]))
        .unwrap();

        assert_eq!(config.http_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.memcache_addr, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.machine_id, Some(513));
        assert_eq!(config.epoch, Duration::from_millis(1_735_689_600_000));
        assert_eq!(config.tick, Duration::from_millis(20));
        assert_eq!(config.max_line_length, 128);
    }

    #[test]
    fn rejects_zero_tick() {
        let err = ServerConfig::try_from(parse(&["--tick-millis", "0"])).unwrap_err();
        assert!(err.to_string().contains("TICK_MILLIS"));
    }

    #[test]
    fn rejects_zero_line_length() {
        let err = ServerConfig::try_from(parse(&["--max-line-length", "0"])).unwrap_err();
        assert!(err.to_string().contains("MAX_LINE_LENGTH"));
    }

    #[test]
    fn rejects_shared_address() {
        let err = ServerConfig::try_from(parse(&[
            "--http-addr",
            "127.0.0.1:7000",
            "--memcache-addr",
            "127.0.0.1:7000",
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn future_epoch_fails_when_building_the_clock() {
        let config =
            ServerConfig::try_from(parse(&["--epoch-millis", &u64::MAX.to_string()])).unwrap();
        assert_eq!(
            SystemClock::with_epoch(config.epoch).unwrap_err(),
            Error::EpochInFuture
        );
    }

    #[test]
    fn rejects_out_of_range_machine_id() {
        assert!(CliArgs::try_parse_from(["ferroflake-server", "--machine-id", "65536"]).is_err());
    }
}
