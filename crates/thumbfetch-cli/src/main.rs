use thumbfetch_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_fetch, run_list};
use thumbfetch_lib::error::ThumbFetchError;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), ThumbFetchError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;

    match command {
        ResolvedCommand::Fetch(params) => {
            run_fetch(params).await?;
        }
        ResolvedCommand::List(params) => run_list(params).await?,
    }

    Ok(())
}
