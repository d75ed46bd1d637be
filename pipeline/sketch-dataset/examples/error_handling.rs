//! Example demonstrating proper error handling with the sketch dataset.
//!
//! This example shows how to handle various error conditions that can occur
//! when building and reading a dataset, replacing panics with proper
//! Result-based error handling.

use sketch_dataset::{DatasetError, RecordStore, SketchDataset, Vocabulary};
use sketchraster_helpers::{PenMove, RawRecord};

fn square(word: usize) -> RawRecord {
    RawRecord::new(
        word,
        vec![
            PenMove::new(0, 0, 0),
            PenMove::new(10, 0, 0),
            PenMove::new(0, 10, 0),
            PenMove::new(-10, 0, 1),
        ],
    )
}

fn main() {
    println!("Sketch Dataset Error Handling Examples");
    println!("======================================");

    let vocabulary = Vocabulary::from_names(["ant", "bee", "cat"]);

    // Example 1: Handle an invalid image size
    println!("\n1. Handling an invalid image size (0x64):");
    match SketchDataset::new(
        RecordStore::from_records(vec![square(0)]),
        vocabulary.clone(),
        (0, 64),
        None,
    ) {
        Ok(_) => println!("   Dataset created successfully"),
        Err(e @ DatasetError::InvalidImageSize { .. }) => {
            println!("   ✓ Caught expected error: {}", e)
        }
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 2: Handle an out-of-bounds access
    println!("\n2. Handling an out-of-bounds position:");
    let dataset = SketchDataset::new(
        RecordStore::from_records(vec![square(0), square(1)]),
        vocabulary.clone(),
        (64, 64),
        None,
    )
    .expect("image size is valid");

    match dataset.get(5) {
        Ok(item) => println!("   Got item {:?}", item.name),
        Err(e @ DatasetError::OutOfBounds { .. }) => {
            println!("   ✓ Caught expected error: {}", e)
        }
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 3: A record with no points fails for that item only
    println!("\n3. Handling a record with an empty drawing:");
    let dataset = SketchDataset::new(
        RecordStore::from_records(vec![square(0), RawRecord::new(1, vec![]), square(2)]),
        vocabulary.clone(),
        (64, 64),
        None,
    )
    .expect("image size is valid");

    for position in 0..dataset.len() {
        match dataset.get(position) {
            Ok(item) => println!("   ✓ Item {}: name={:?}", position, item.name),
            Err(e @ DatasetError::EmptyDrawing { .. }) => {
                println!("   ✓ Caught expected error: {}", e)
            }
            Err(e) => println!("   ✗ Unexpected error: {}", e),
        }
    }

    // Example 4: Demonstrate error propagation in a function
    println!("\n4. Error propagation in functions:");

    fn first_item_name() -> Result<String, DatasetError> {
        let dataset = SketchDataset::new(
            RecordStore::from_records(vec![square(2)]),
            Vocabulary::from_names(["ant", "bee", "cat"]),
            (32, 32),
            None,
        )?;
        let item = dataset.get(0)?;
        Ok(item.name)
    }

    match first_item_name() {
        Ok(name) => println!("   ✓ First item is a {:?}", name),
        Err(e) => println!("   ✗ Lookup failed: {}", e),
    }

    println!("\n5. Error types and their meanings:");
    println!("   - InvalidImageSize: both canvas dimensions must be positive");
    println!("   - OutOfBounds: position past the end of the (possibly filtered) view");
    println!("   - EmptyDrawing: the record's drawing has no points to normalize");
    println!("   - MissingRecord: the source failed to produce a record it reported");
    println!("   - UnknownClassId: the vocabulary cannot name the record's class");

    println!("\nAll examples completed successfully!");
}
