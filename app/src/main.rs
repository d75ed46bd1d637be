// Renders a batch of sketches through the dataset adapter and exports the
// leading eigenimages of the batch as PNG files.
//
// Usage: eigenimages <cache_dir> [split] [batch] [components] [class ...]
mod eigen;

use std::error::Error;
use std::path::{Path, PathBuf};

use eigen::generate_eigenimages;
use image::GrayImage;
use ndarray::Array2;
use sketchraster::{DatasetConfig, SketchDataset, Vocabulary};

/// Canvas size used for every rendered sketch in the batch.
const IMAGE_SIZE: (u32, u32) = (224, 224);

fn load_vocabulary(cache_dir: &Path) -> Result<Vocabulary, Box<dyn Error>> {
    let text = std::fs::read_to_string(cache_dir.join("classes.txt"))?;
    Ok(Vocabulary::from_names(
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    ))
}

fn save_png(canvas: &Array2<u8>, path: &Path) -> Result<(), Box<dyn Error>> {
    let (height, width) = canvas.dim();
    let pixels: Vec<u8> = canvas.iter().copied().collect();
    let img = GrayImage::from_raw(width as u32, height as u32, pixels)
        .ok_or("pixel buffer does not match the canvas size")?;
    img.save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cache_dir = PathBuf::from(args.first().map(String::as_str).unwrap_or("."));
    let split = args.get(1).cloned().unwrap_or_else(|| "train".to_string());
    let batch: usize = args.get(2).map(|v| v.parse()).transpose()?.unwrap_or(100);
    let components: usize = args.get(3).map(|v| v.parse()).transpose()?.unwrap_or(5);
    let class_subset = if args.len() > 4 {
        Some(args[4..].to_vec())
    } else {
        None
    };

    let vocabulary = load_vocabulary(&cache_dir)?;
    let config = DatasetConfig {
        split,
        image_size: IMAGE_SIZE,
        cache_dir,
        class_subset,
    };
    let dataset = SketchDataset::open(&config, vocabulary)?;
    println!(
        "Loaded {} records from the {:?} split",
        dataset.len(),
        config.split
    );

    let take = batch.min(dataset.len());
    let mut images = Vec::with_capacity(take);
    for position in 0..take {
        images.push(dataset.get(position)?.image);
    }
    println!("Rendered {} images at {:?}", images.len(), IMAGE_SIZE);

    let requested = components.min(images.len());
    let basis = generate_eigenimages(&images, requested)?;
    for (i, eigenimage) in basis.iter().enumerate() {
        let path = PathBuf::from(format!("eigenimage_{i}.png"));
        save_png(eigenimage, &path)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
