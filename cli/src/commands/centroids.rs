use anyhow::Result;
use admcentroid::{run_centroids, CentroidOptions};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CentroidsArgs) -> Result<()> {
    let options = CentroidOptions {
        provider: args.method.into(),
        out: args.out.clone(),
        work_dir: args.work_dir.clone(),
        null_rows: args.null_rows.into(),
        schema: args.schema_policy(),
        layer_policy: args.layer_policy(),
    };
    tracing::debug!(?options, "centroids options");

    let rows = run_centroids(&options)?;
    println!("Wrote {rows} rows to {}", options.out.display());

    Ok(())
}
