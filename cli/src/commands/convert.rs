use anyhow::Result;
use admcentroid::{run_convert, ConvertOptions};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ConvertArgs) -> Result<()> {
    let options = ConvertOptions {
        input: args.input.clone(),
        output: args.output.clone(),
        names: args.names.clone(),
        export_name: args.export_name.clone(),
        null_rows: args.null_rows.into(),
    };
    tracing::debug!(?options, "convert options");

    let cities = run_convert(&options)?;
    println!("Converted {cities} cities to {}", options.output.display());

    Ok(())
}
