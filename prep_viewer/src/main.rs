use anyhow::Context;
use mnist_prep::core_modules::flattener::unflatten;
use mnist_prep::core_modules::reader::read_record;
use mnist_prep::core_modules::resizer::TARGET_SIDE;
use std::env;
use std::path::Path;

mod png_helper;

fn main() -> anyhow::Result<()> {
    // --- 1. Argument Parsing ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        println!("Usage: prep_viewer <prepared_file> <record_index> <output_png>");
        return Ok(());
    }
    let input_path = Path::new(&args[1]);
    let index: usize = args[2]
        .parse()
        .with_context(|| format!("record index {:?} is not a number", args[2]))?;
    let output_path = Path::new(&args[3]);

    // --- 2. Record Lookup ---
    let sample = read_record(input_path, index)
        .with_context(|| format!("cannot read record {} of {}", index, input_path.display()))?;
    let image = unflatten(&sample.image, TARGET_SIDE, TARGET_SIDE)?;

    // --- 3. Rendering ---
    let rendered = png_helper::render(&image, png_helper::DEFAULT_SCALE);
    png_helper::save(output_path, &rendered)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    println!(
        "Record {} (label {}, {} of 64 pixels set) saved to {}",
        index,
        sample.label,
        image.count_ones(),
        output_path.display()
    );
    Ok(())
}
