use std::path::PathBuf;

use clap::Parser;
use snag_fetch::Config;
use snag_net::IpFamily;

#[derive(Clone, Debug, Parser)]
#[command(name = "snag", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct App {
    /// URLs to fetch, in order. The first failure stops the run.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Show a progress bar while downloading
    #[arg(short, long)]
    pub progress: bool,

    /// Write to this file instead of the object's name (single URL only)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// User name for authentication
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for authentication
    #[arg(short = 'k', long = "pass", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Do not follow HTTP redirects
    #[arg(short = 'f', long)]
    pub no_follow: bool,

    /// Verify the peer's TLS certificate and host name
    #[arg(short, long)]
    pub verify: bool,

    /// Allow TLS 1.0
    #[arg(long)]
    pub tls10: bool,

    /// Allow TLS 1.1
    #[arg(long)]
    pub tls11: bool,

    /// Continue a partially downloaded file
    #[arg(short = 'c', long = "continue")]
    pub resume: bool,

    /// Use IPv4 addresses only
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Use IPv6 addresses only
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Print protocol traffic
    #[arg(short, long)]
    pub debug: bool,
}

impl App {
    pub fn config(&self) -> Config {
        let family = if self.ipv4 {
            IpFamily::V4
        } else if self.ipv6 {
            IpFamily::V6
        } else {
            IpFamily::Any
        };

        Config::default()
            .show_progress(self.progress)
            .follow_redirects(!self.no_follow)
            .resume(self.resume)
            .debug(self.debug)
            .verify_peer(self.verify)
            .allow_tls10(self.tls10)
            .allow_tls11(self.tls11)
            .ip_family(family)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Result<App, clap::Error> {
        App::try_parse_from(std::iter::once("snag").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        App::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let app = parse(&["http://h/f"]).unwrap();
        let config = app.config();
        assert!(!config.show_progress);
        assert!(config.follow_redirects);
        assert!(!config.transport.verify_peer);
        assert_eq!(config.transport.ip_family, IpFamily::Any);
        assert_eq!(app.urls, ["http://h/f"]);
    }

    #[test]
    fn test_flags() {
        let app = parse(&[
            "-p", "-f", "-v", "-c", "-6", "-d", "--tls10", "-u", "bob", "-k", "pw", "ftp://h/f",
        ])
        .unwrap();
        let config = app.config();
        assert!(config.show_progress);
        assert!(!config.follow_redirects);
        assert!(config.transport.verify_peer);
        assert!(config.transport.allow_tls10);
        assert!(!config.transport.allow_tls11);
        assert!(config.resume);
        assert!(config.debug);
        assert_eq!(config.transport.ip_family, IpFamily::V6);
        assert_eq!(app.user.as_deref(), Some("bob"));
        assert_eq!(app.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_family_flags_conflict() {
        assert!(parse(&["-4", "-6", "http://h/f"]).is_err());
    }

    #[test]
    fn test_url_required() {
        assert!(parse(&["-p"]).is_err());
    }
}
