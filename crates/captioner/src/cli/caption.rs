//! The `captioner caption` command: caption one local file.

use std::path::PathBuf;

use clap::Args;
use captioner_core::Config;

/// Arguments for the `caption` command.
#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image file to caption
    pub image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Caption the image and print `{"caption": ..., "action": ...}` to stdout.
pub async fn execute(args: CaptionArgs, config: Config) -> anyhow::Result<()> {
    let processor = super::load_processor(&config).await?;
    let result = processor.process_path(&args.image).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
