fn main() -> anyhow::Result<()> {
    ashar::cli::run_cli()
}
