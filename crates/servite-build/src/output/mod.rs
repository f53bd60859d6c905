//! Bundler output model and disk writer.

pub mod writer;

pub use writer::{empty_dir, write_bundle};

/// A script emitted by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    /// Path relative to the out dir, e.g. `assets/islands.3f2a.js`
    pub file_name: String,
    /// Entry name, when the chunk was produced for a named input
    pub name: Option<String>,
    pub is_entry: bool,
    pub facade_module_id: Option<String>,
    pub code: String,
}

impl OutputChunk {
    pub fn new(file_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            name: None,
            is_entry: false,
            facade_module_id: None,
            code: code.into(),
        }
    }

    pub fn entry(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.is_entry = true;
        self
    }

    pub fn facade(mut self, module_id: impl Into<String>) -> Self {
        self.facade_module_id = Some(module_id.into());
        self
    }
}

/// Any non-script file emitted by the bundler (HTML, CSS, manifests, images).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    pub file_name: String,
    pub source: Vec<u8>,
}

impl OutputAsset {
    pub fn new(file_name: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Chunk(OutputChunk),
    Asset(OutputAsset),
}

impl OutputItem {
    pub fn file_name(&self) -> &str {
        match self {
            OutputItem::Chunk(chunk) => &chunk.file_name,
            OutputItem::Asset(asset) => &asset.file_name,
        }
    }

    pub fn contents(&self) -> &[u8] {
        match self {
            OutputItem::Chunk(chunk) => chunk.code.as_bytes(),
            OutputItem::Asset(asset) => &asset.source,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, OutputItem::Asset(_))
    }
}

impl From<OutputChunk> for OutputItem {
    fn from(chunk: OutputChunk) -> Self {
        OutputItem::Chunk(chunk)
    }
}

impl From<OutputAsset> for OutputItem {
    fn from(asset: OutputAsset) -> Self {
        OutputItem::Asset(asset)
    }
}

/// Everything one bundler invocation emitted, in emission order.
///
/// The first chunk is the entry chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    pub items: Vec<OutputItem>,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: impl Into<OutputItem>) {
        self.items.push(item.into());
    }

    pub fn with(mut self, item: impl Into<OutputItem>) -> Self {
        self.push(item);
        self
    }

    pub fn chunks(&self) -> impl Iterator<Item = &OutputChunk> {
        self.items.iter().filter_map(|item| match item {
            OutputItem::Chunk(chunk) => Some(chunk),
            OutputItem::Asset(_) => None,
        })
    }

    pub fn assets(&self) -> impl Iterator<Item = &OutputAsset> {
        self.items.iter().filter_map(|item| match item {
            OutputItem::Asset(asset) => Some(asset),
            OutputItem::Chunk(_) => None,
        })
    }

    pub fn assets_mut(&mut self) -> impl Iterator<Item = &mut OutputAsset> {
        self.items.iter_mut().filter_map(|item| match item {
            OutputItem::Asset(asset) => Some(asset),
            OutputItem::Chunk(_) => None,
        })
    }

    pub fn entry_chunk(&self) -> Option<&OutputChunk> {
        self.chunks().next()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(OutputItem::file_name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
