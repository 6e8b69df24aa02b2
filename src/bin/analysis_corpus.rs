use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    analysis_corpus::apps::run_pipeline(std::env::args().skip(1))?;
    Ok(())
}
