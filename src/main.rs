fn main() -> anyhow::Result<()> {
    textplate::run()?;
    Ok(())
}
