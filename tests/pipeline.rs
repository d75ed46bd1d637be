use approx::assert_abs_diff_eq;
use ndarray::Array2;
use sketchraster::{
    INK, PenMove, Point, RawRecord, RecordStore, SketchDataset, Vocabulary, decode_drawing,
    normalize_strokes, rasterize_strokes,
};

fn moves(raw: &[(i32, i32, i32)]) -> Vec<PenMove> {
    raw.iter().map(|&t| PenMove::from(t)).collect()
}

#[test]
fn stage_by_stage_matches_the_worked_scenario() {
    // One stroke: (10,0) -> (10,10) -> (5,5), bounding box 5 x 10.
    let drawing = moves(&[(10, 0, 0), (0, 10, 0), (-5, -5, 1)]);

    let strokes = decode_drawing(&drawing);
    assert_eq!(strokes.len(), 1);
    assert_eq!(
        strokes[0].points,
        vec![
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(5.0, 5.0)
        ]
    );

    // Fitting to 100x100 scales by min(100/5, 100/10) * 0.9 = 9.
    let norm = normalize_strokes(&strokes, (100, 100)).unwrap();
    let expected = [(45.0, 0.0), (45.0, 90.0), (0.0, 45.0)];
    for (p, &(x, y)) in norm[0].points.iter().zip(&expected) {
        assert_abs_diff_eq!(p.x, x, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, y, epsilon = 1e-4);
    }

    let canvas = rasterize_strokes(&norm, (100, 100));
    assert_eq!(canvas.dim(), (100, 100));
    assert_eq!(canvas[[45, 45]], INK);
    assert_eq!(canvas[[67, 22]], INK);
    assert_eq!(canvas[[99, 99]], 0);
}

#[test]
fn adapter_runs_the_same_transform_per_item() {
    let store = RecordStore::from_records(vec![
        RawRecord::new(1, moves(&[(10, 0, 0), (0, 10, 0), (-5, -5, 1)])),
        RawRecord::new(0, moves(&[(0, 0, 0), (8, 0, 1)])),
    ]);
    let vocabulary = Vocabulary::from_names(["ant", "face"]);

    let dataset = SketchDataset::new(store, vocabulary, (100, 100), None).unwrap();
    assert_eq!(dataset.len(), 2);

    let item = dataset.get(0).unwrap();
    assert_eq!(item.name, "face");
    assert_eq!(item.label, 1);

    let by_hand: Array2<u8> = {
        let strokes = decode_drawing(&moves(&[(10, 0, 0), (0, 10, 0), (-5, -5, 1)]));
        let norm = normalize_strokes(&strokes, (100, 100)).unwrap();
        rasterize_strokes(&norm, (100, 100))
    };
    assert_eq!(item.image, by_hand);
}

#[test]
fn filtered_adapter_remaps_labels_contiguously() {
    let square = [(0, 0, 0), (10, 0, 0), (0, 10, 0), (-10, 0, 1)];
    let store = RecordStore::from_records(vec![
        RawRecord::new(2, moves(&square)),
        RawRecord::new(0, moves(&square)),
        RawRecord::new(1, moves(&square)),
        RawRecord::new(2, moves(&square)),
    ]);
    let vocabulary = Vocabulary::from_names(["ant", "bee", "cat"]);
    let subset = vec!["cat".to_string(), "ant".to_string()];

    let dataset = SketchDataset::new(store, vocabulary, (32, 32), Some(&subset)).unwrap();

    // Kept records in original order: cat, ant, cat.
    assert_eq!(dataset.len(), 3);
    let names: Vec<_> = dataset.iter().map(|i| i.unwrap()).collect();
    assert_eq!(
        names.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        vec!["cat", "ant", "cat"]
    );
    // Sorted subset {ant, cat} gives ant -> 0, cat -> 1.
    assert_eq!(
        names.iter().map(|i| i.label).collect::<Vec<_>>(),
        vec![1, 0, 1]
    );
}
