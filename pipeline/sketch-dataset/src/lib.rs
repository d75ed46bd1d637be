use std::collections::{BTreeSet, HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array2;
use sketchraster_helpers::{ClassId, RawRecord};
use stroke_render::render_drawing;

/// Errors that can occur while building or reading a [`SketchDataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// Both canvas dimensions must be positive.
    InvalidImageSize { width: u32, height: u32 },
    /// Position past the end of the (possibly filtered) view.
    OutOfBounds { position: usize, len: usize },
    /// The record at this view position has a drawing with no points.
    EmptyDrawing { position: usize },
    /// The record source failed to produce a record it reported as present.
    MissingRecord { index: usize },
    /// A record carries a class id the vocabulary does not know.
    UnknownClassId { id: ClassId },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::InvalidImageSize { width, height } => {
                write!(f, "Image size {width}x{height} must be positive in both dimensions")
            }
            DatasetError::OutOfBounds { position, len } => {
                write!(f, "Position {position} is out of bounds for a dataset of length {len}")
            }
            DatasetError::EmptyDrawing { position } => {
                write!(f, "Record at position {position} has a drawing with no points")
            }
            DatasetError::MissingRecord { index } => {
                write!(f, "Record source returned no record for raw index {index}")
            }
            DatasetError::UnknownClassId { id } => {
                write!(f, "Class id {id} is not present in the vocabulary")
            }
        }
    }
}

impl Error for DatasetError {}

/// Errors that can occur while loading records from a JSONL dump.
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    /// A line that is not a valid record; `line` is 1-based.
    Parse { line: usize, source: serde_json::Error },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "Failed to read records: {err}"),
            LoadError::Parse { line, source } => {
                write!(f, "Invalid record on line {line}: {source}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

/// Errors from [`SketchDataset::open`], which both loads a record store and
/// constructs the adapter over it.
#[derive(Debug)]
pub enum OpenError {
    Load(LoadError),
    Dataset(DatasetError),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenError::Load(err) => write!(f, "{err}"),
            OpenError::Dataset(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OpenError::Load(err) => Some(err),
            OpenError::Dataset(err) => Some(err),
        }
    }
}

impl From<LoadError> for OpenError {
    fn from(err: LoadError) -> Self {
        OpenError::Load(err)
    }
}

impl From<DatasetError> for OpenError {
    fn from(err: DatasetError) -> Self {
        OpenError::Dataset(err)
    }
}

/// The fixed table mapping raw class ids to canonical class names.
///
/// The table is injected at construction wherever it is needed; nothing in
/// this crate consults a global vocabulary. Ids are the positions in the
/// name list the table was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
}

impl Vocabulary {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Vocabulary {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self, id: ClassId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(id, name)` pairs in id order.
    pub fn entries(&self) -> impl Iterator<Item = (ClassId, &str)> {
        self.names.iter().enumerate().map(|(id, n)| (id, n.as_str()))
    }

    /// Ids of every entry whose canonical name is in `names`, in id order.
    /// Names the vocabulary does not know contribute nothing.
    pub fn resolve<'a, I>(&self, names: I) -> BTreeSet<ClassId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: HashSet<&str> = names.into_iter().collect();
        self.entries()
            .filter(|(_, name)| wanted.contains(name))
            .map(|(id, _)| id)
            .collect()
    }
}

/// The result of restricting a record collection to a subset of classes:
/// the raw indices that survive, in their original order, and the
/// contiguous label map over the requested class names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFilter {
    kept_indices: Vec<usize>,
    label_map: HashMap<String, usize>,
}

impl ClassFilter {
    /// Resolves `requested` names against the vocabulary, scans the word
    /// column once in original order, and assigns contiguous labels
    /// `[0, K)` to the lexicographically sorted requested names.
    ///
    /// A requested name the vocabulary does not know matches no records;
    /// it still receives a label, and a diagnostic is printed for it.
    /// Sorting the names first makes the label assignment identical across
    /// runs regardless of the order the names were supplied in.
    pub fn build(requested: &[String], vocabulary: &Vocabulary, word_column: &[ClassId]) -> Self {
        let requested: BTreeSet<&str> = requested.iter().map(String::as_str).collect();

        let allowed_ids = vocabulary.resolve(requested.iter().copied());
        let resolved: HashSet<&str> = allowed_ids
            .iter()
            .filter_map(|&id| vocabulary.name(id))
            .collect();
        for name in &requested {
            if !resolved.contains(name) {
                eprintln!("warning: requested class {name:?} is not in the vocabulary; it will match no records");
            }
        }

        let kept_indices = word_column
            .iter()
            .enumerate()
            .filter(|&(_, word)| allowed_ids.contains(word))
            .map(|(index, _)| index)
            .collect();

        // BTreeSet iteration order is lexicographic.
        let label_map = requested
            .iter()
            .enumerate()
            .map(|(label, name)| (name.to_string(), label))
            .collect();

        ClassFilter {
            kept_indices,
            label_map,
        }
    }

    /// Raw record indices that survived the filter, in original order.
    pub fn kept_indices(&self) -> &[usize] {
        &self.kept_indices
    }

    pub fn label_of(&self, name: &str) -> Option<usize> {
        self.label_map.get(name).copied()
    }

    pub fn num_classes(&self) -> usize {
        self.label_map.len()
    }

    pub fn label_map(&self) -> &HashMap<String, usize> {
        &self.label_map
    }
}

/// A random-access collection of raw sketch records.
///
/// This is the seam to the upstream data source: the adapter only needs
/// indexed access, a bulk-readable word column for fast filtering, and a
/// length. Forwarding impls for `&S` and `Arc<S>` let several adapters
/// share one source.
pub trait RecordSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, index: usize) -> Option<&RawRecord>;

    /// The raw class id of every record, aligned with record indices.
    fn word_column(&self) -> Vec<ClassId>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn record(&self, index: usize) -> Option<&RawRecord> {
        (**self).record(index)
    }

    fn word_column(&self) -> Vec<ClassId> {
        (**self).word_column()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Arc<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn record(&self, index: usize) -> Option<&RawRecord> {
        (**self).record(index)
    }

    fn word_column(&self) -> Vec<ClassId> {
        (**self).word_column()
    }
}

/// In-memory record collection, loadable from a line-delimited JSON dump
/// where each line is one record: `{"word": 3, "drawing": [[dx,dy,lift], ...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<RawRecord>,
}

impl RecordStore {
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        RecordStore { records }
    }

    /// Reads records from line-delimited JSON. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] on read failure, [`LoadError::Parse`] with the
    /// 1-based line number on the first malformed record.
    pub fn from_jsonl<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut records = Vec::new();
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| LoadError::Parse {
                line: idx + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(RecordStore { records })
    }

    /// Opens the `<cache_dir>/<split>.jsonl` dump of one dataset split.
    /// Both values are opaque pass-through configuration.
    pub fn open_split(cache_dir: &Path, split: &str) -> Result<Self, LoadError> {
        let path = cache_dir.join(format!("{split}.jsonl"));
        Self::from_jsonl(File::open(path)?)
    }
}

impl RecordSource for RecordStore {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Option<&RawRecord> {
        self.records.get(index)
    }

    fn word_column(&self) -> Vec<ClassId> {
        self.records.iter().map(|r| r.word).collect()
    }
}

/// Construction options for a [`SketchDataset`], matching the recognized
/// knobs of the upstream loader: the split partition, the canvas size, the
/// local cache location, and an optional class-name subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub split: String,
    pub image_size: (u32, u32),
    pub cache_dir: PathBuf,
    pub class_subset: Option<Vec<String>>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            split: "train".to_string(),
            image_size: (256, 256),
            cache_dir: PathBuf::from("."),
            class_subset: None,
        }
    }
}

/// One rendered dataset item: the rasterized sketch, its canonical class
/// name, and its label: the remapped contiguous id when the dataset was
/// built with a class subset, the raw class id otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    pub image: Array2<u8>,
    pub name: String,
    pub label: usize,
}

/// Random-access view over a record source that renders each sketch to a
/// fixed-size grayscale canvas on demand.
///
/// When a class subset is requested the filter runs once at construction
/// and the dataset becomes a view over the kept records, addressed by new
/// contiguous positions in original record order. Nothing is cached or
/// mutated after construction, so a dataset can be read from several
/// threads, and independent datasets may share one source.
#[derive(Debug, Clone)]
pub struct SketchDataset<S: RecordSource> {
    source: S,
    vocabulary: Vocabulary,
    image_size: (u32, u32),
    filter: Option<ClassFilter>,
}

impl SketchDataset<RecordStore> {
    /// Loads the configured split from disk and builds the adapter over it.
    ///
    /// # Errors
    ///
    /// [`OpenError::Load`] when the JSONL dump cannot be read, otherwise
    /// any [`DatasetError`] from construction.
    pub fn open(config: &DatasetConfig, vocabulary: Vocabulary) -> Result<Self, OpenError> {
        let store = RecordStore::open_split(&config.cache_dir, &config.split)?;
        let dataset = Self::new(
            store,
            vocabulary,
            config.image_size,
            config.class_subset.as_deref(),
        )?;
        Ok(dataset)
    }
}

impl<S: RecordSource> SketchDataset<S> {
    /// Builds the adapter, running the class filter eagerly when a subset
    /// is requested.
    ///
    /// An empty subset matches no classes and yields a dataset of length
    /// 0, an explicit empty view rather than a silent fallback to the
    /// full collection.
    ///
    /// # Errors
    ///
    /// [`DatasetError::InvalidImageSize`] unless both canvas dimensions
    /// are positive.
    pub fn new(
        source: S,
        vocabulary: Vocabulary,
        image_size: (u32, u32),
        class_subset: Option<&[String]>,
    ) -> Result<Self, DatasetError> {
        let (width, height) = image_size;
        if width == 0 || height == 0 {
            return Err(DatasetError::InvalidImageSize { width, height });
        }

        let filter = class_subset
            .map(|subset| ClassFilter::build(subset, &vocabulary, &source.word_column()));

        Ok(SketchDataset {
            source,
            vocabulary,
            image_size,
            filter,
        })
    }

    /// Length of the (possibly filtered) view.
    pub fn len(&self) -> usize {
        match &self.filter {
            Some(filter) => filter.kept_indices().len(),
            None => self.source.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The contiguous label map, present only when a subset was requested.
    pub fn label_map(&self) -> Option<&HashMap<String, usize>> {
        self.filter.as_ref().map(ClassFilter::label_map)
    }

    /// Renders the item at `position` in the view.
    ///
    /// Each access independently runs decode, normalize and rasterize on
    /// the raw record; a failure here affects this item only.
    ///
    /// # Errors
    ///
    /// [`DatasetError::OutOfBounds`] past the end of the view,
    /// [`DatasetError::EmptyDrawing`] for a record with no points, and
    /// [`DatasetError::UnknownClassId`] when the vocabulary cannot name
    /// the record's class.
    pub fn get(&self, position: usize) -> Result<DatasetItem, DatasetError> {
        let len = self.len();
        let out_of_bounds = DatasetError::OutOfBounds { position, len };
        let index = match &self.filter {
            Some(filter) => *filter.kept_indices().get(position).ok_or(out_of_bounds)?,
            None => {
                if position >= len {
                    return Err(out_of_bounds);
                }
                position
            }
        };

        let record = self
            .source
            .record(index)
            .ok_or(DatasetError::MissingRecord { index })?;

        let image = render_drawing(&record.drawing, self.image_size)
            .map_err(|_| DatasetError::EmptyDrawing { position })?;

        let name = self
            .vocabulary
            .name(record.word)
            .ok_or(DatasetError::UnknownClassId { id: record.word })?
            .to_string();

        let label = match &self.filter {
            // A record the filter kept must have its name in the label
            // map; anything else is a broken filter, not a runtime state.
            Some(filter) => filter
                .label_of(&name)
                .expect("record kept by the class filter has no entry in the label map"),
            None => record.word,
        };

        Ok(DatasetItem { image, name, label })
    }

    /// Items in view order.
    pub fn iter(&self) -> impl Iterator<Item = Result<DatasetItem, DatasetError>> + '_ {
        (0..self.len()).map(move |position| self.get(position))
    }
}
