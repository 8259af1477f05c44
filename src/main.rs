fn main() -> anyhow::Result<()> {
    case_query::run()
}
