fn main() -> anyhow::Result<()> {
    storyline_lib::run()
}
