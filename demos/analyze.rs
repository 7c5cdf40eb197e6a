//! Console inspection of a single image.
//!
//! Run with: cargo run --example analyze -- <image_path> [quality] [ela_output]

use std::{env, path::Path, process};

use image_ela::{AnalysisConfig, Inspector, error::Result, report::render_text};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: {} <image_path> [quality] [ela_output]", args[0]);
        println!();
        println!("  image_path  - Image to inspect (JPEG, PNG, ...)");
        println!("  quality     - Recompression quality, 1-100 (default: 90)");
        println!("  ela_output  - Where to write the ELA image (default: ela_result.png)");
        return Ok(());
    }

    let image_path = &args[1];
    let quality = match args.get(2).map(|q| q.parse::<u8>()) {
        Some(Ok(q)) => q,
        Some(Err(_)) => {
            eprintln!("Error: quality must be a number between 1 and 100");
            process::exit(2);
        }
        None => 90,
    };
    let ela_output = args.get(3).map(|s| s.as_str()).unwrap_or("ela_result.png");

    if !Path::new(image_path).exists() {
        eprintln!("File not found! Please check the path.");
        process::exit(1);
    }

    let inspector = Inspector::open(image_path)?.with_config(AnalysisConfig {
        ela_quality: quality,
        ..AnalysisConfig::default()
    });
    let report = inspector.full_analysis()?;

    report.ela.save(ela_output)?;
    println!("ELA image written to {}", ela_output);
    println!();
    print!("{}", render_text(&report));

    Ok(())
}
