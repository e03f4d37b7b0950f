use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_sampler_core::io::{list_files, read_file};
use rs_sampler_core::model::corpus_model::CorpusModel;
use rs_sampler_core::{sample, scale, GenerationInput, SampleError};

const BUILTIN_CORPUS: &str = "\
It was the best of times, it was the worst of times,
it was the age of wisdom, it was the age of foolishness,
it was the epoch of belief, it was the epoch of incredulity,
it was the season of Light, it was the season of Darkness,
it was the spring of hope, it was the winter of despair,
we had everything before us, we had nothing before us,
we were all going direct to Heaven, we were all going direct the other way.";

/// Every line of the .txt corpora of `folder`, or the built-in text if there are none.
fn load_lines(folder: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut lines: Vec<String> = Vec::new();
    if let Ok(files) = list_files(folder, "txt") {
        for file in files {
            log::info!("Reading {}", file);
            lines.extend(read_file(folder.join(file))?);
        }
    }
    if lines.is_empty() {
        log::info!("No corpus in {}, using the built-in text", folder.display());
        lines = BUILTIN_CORPUS.lines().map(str::to_owned).collect();
    }
    Ok(lines)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let lines = load_lines(Path::new("./data"))?;

    // N-gram table looking at up to 6 previous characters
    let model = CorpusModel::from_lines(&lines, 6)?;
    log::info!("Corpus: {} characters, {} distinct", model.corpus().len(), model.vocabulary().symbols().len());

    // Fixed seed: the output below is the same on every run
    let mut rng = StdRng::seed_from_u64(1337);

    // Diversity reshapes a distribution before drawing from it
    let distribution = [0.5, 0.3, 0.15, 0.05];
    for diversity in [0.2, 1.0, 5.0] {
        let scaled: Vec<String> = scale(&distribution, diversity)?.iter().map(|p| format!("{:.3}", p)).collect();
        println!("Diversity {}: {:?} -> drew index {}", diversity, scaled, sample(&distribution, diversity, &mut rng)?);
    }

    // Generate 120 characters after a 40 character seed window
    let mut input = GenerationInput::default();
    input.length = 120;
    input.set_window_size(40)?;

    for diversity in [0.2, 0.5, 1.0, 1.2] {
        input.set_diversity(diversity)?;
        println!("\n----- diversity: {}", diversity);
        println!("{}", model.generate(&input, &mut rng)?);
    }

    // Invalid values are rejected
    match input.set_diversity(0.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("\nDiversity 0.0 is invalid: {}", e),
    }
    input.set_window_size(model.corpus().len() + 1)?;
    match model.generate(&input, &mut rng) {
        Err(SampleError::InvalidParameter(e)) => println!("Window too large: {}", e),
        _ => println!("Should not happen"),
    }

    Ok(())
}
