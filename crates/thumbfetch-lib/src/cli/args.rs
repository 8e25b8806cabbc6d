use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    Fetch {
        config_path: Option<String>,
        token_id: Option<String>,
        endpoint: Option<String>,
        catalog_file: Option<String>,
        base_origin: Option<String>,
        output_dir: Option<String>,
        renditions: Vec<String>,
        max_parallelism: Option<usize>,
        timeout_secs: Option<u64>,
        fail_on_error: bool,
    },
    List {
        config_path: Option<String>,
        token_id: Option<String>,
        endpoint: Option<String>,
        catalog_file: Option<String>,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "thumbfetch",
    version,
    author = "Nick Guletskii",
    about = "Fetch a photo catalog listing and download the selected thumbnail sizes of every photo"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Fetch the catalog and download thumbnails for every photo
    Fetch {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Sets a custom config file"
        )]
        config: Option<String>,

        #[arg(
            long = "token-id",
            value_name = "TOKEN",
            help = "Overrides the catalog access token"
        )]
        token_id: Option<String>,

        #[arg(
            long = "endpoint",
            value_name = "URL",
            help = "Overrides the catalog listing endpoint"
        )]
        endpoint: Option<String>,

        #[arg(
            long = "catalog-file",
            value_name = "FILE",
            help = "Reads a saved catalog response instead of querying the endpoint"
        )]
        catalog_file: Option<String>,

        #[arg(
            long = "base-origin",
            value_name = "URL",
            help = "Overrides the origin prepended to relative thumbnail URLs"
        )]
        base_origin: Option<String>,

        #[arg(
            short = 'o',
            long = "output-dir",
            value_name = "DIR",
            help = "Overrides the output directory for downloaded thumbnails"
        )]
        output_dir: Option<String>,

        #[arg(
            short = 'r',
            long = "rendition",
            value_name = "ID",
            help = "Thumbnail sizes to download (repeat or use comma-separated values)",
            action = ArgAction::Append,
            value_delimiter = ','
        )]
        renditions: Vec<String>,

        #[arg(
            long = "max-parallelism",
            value_name = "N",
            help = "Maximum number of photos downloaded at once"
        )]
        max_parallelism: Option<usize>,

        #[arg(
            long = "timeout-secs",
            value_name = "SECONDS",
            help = "Timeout for each thumbnail request"
        )]
        timeout_secs: Option<u64>,

        #[arg(
            long = "fail-on-error",
            help = "Exit with an error if any download failed"
        )]
        fail_on_error: bool,
    },

    /// Fetch the catalog and list photos with their available sizes
    List {
        #[arg(
            short = 'c',
            long = "config",
            value_name = "FILE",
            help = "Sets a custom config file"
        )]
        config: Option<String>,

        #[arg(
            long = "token-id",
            value_name = "TOKEN",
            help = "Overrides the catalog access token"
        )]
        token_id: Option<String>,

        #[arg(
            long = "endpoint",
            value_name = "URL",
            help = "Overrides the catalog listing endpoint"
        )]
        endpoint: Option<String>,

        #[arg(
            long = "catalog-file",
            value_name = "FILE",
            help = "Reads a saved catalog response instead of querying the endpoint"
        )]
        catalog_file: Option<String>,
    },
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Fetch {
            config,
            token_id,
            endpoint,
            catalog_file,
            base_origin,
            output_dir,
            renditions,
            max_parallelism,
            timeout_secs,
            fail_on_error,
        } => Command::Fetch {
            config_path: config,
            token_id,
            endpoint,
            catalog_file,
            base_origin,
            output_dir,
            renditions,
            max_parallelism,
            timeout_secs,
            fail_on_error,
        },
        CliCommand::List {
            config,
            token_id,
            endpoint,
            catalog_file,
        } => Command::List {
            config_path: config,
            token_id,
            endpoint,
            catalog_file,
        },
    };

    Args { command, log_level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_comma_separated_renditions() {
        let cli = Cli::try_parse_from([
            "thumbfetch",
            "-v",
            "fetch",
            "--token-id",
            "abc",
            "-r",
            "x1024,x128",
            "-r",
            "w512",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let CliCommand::Fetch {
            token_id,
            renditions,
            fail_on_error,
            ..
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(token_id.as_deref(), Some("abc"));
        assert_eq!(renditions, vec!["x1024", "x128", "w512"]);
        assert!(!fail_on_error);
    }
}
