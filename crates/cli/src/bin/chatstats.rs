//! chatstats CLI binary entrypoint.

fn main() -> anyhow::Result<()> {
    chatstats_cli::app::run()?;
    Ok(())
}
