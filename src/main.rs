// This is a simple example showing how to use the sketchraster library
use sketchraster::{PenMove, RawRecord, RecordStore, SketchDataset, Vocabulary, render_drawing};

fn main() {
    println!("sketchraster library example");

    // Decode, fit and draw one delta-encoded drawing by hand.
    let drawing = vec![
        PenMove::new(10, 0, 0),
        PenMove::new(0, 10, 0),
        PenMove::new(-5, -5, 1),
    ];
    let canvas = render_drawing(&drawing, (64, 64)).expect("drawing has points");
    let inked = canvas.iter().filter(|&&px| px > 0).count();
    println!(
        "Rendered a {:?} canvas with {} inked pixels",
        canvas.dim(),
        inked
    );

    // The same transform, run through the dataset adapter.
    let store = RecordStore::from_records(vec![RawRecord::new(0, drawing)]);
    let vocabulary = Vocabulary::from_names(["face"]);
    let dataset = SketchDataset::new(store, vocabulary, (64, 64), None).expect("valid size");
    let item = dataset.get(0).expect("record renders");
    println!("Item 0: name={:?} label={}", item.name, item.label);
}
