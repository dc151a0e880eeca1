//! Archive report

use dumpscope_format::{Document, Value};

/// Field name of the header in the rendered report
pub const HEADER_KEY: &str = "header";
/// Field name of the metadata list in the rendered report
pub const COLLECTION_METADATA_KEY: &str = "collectionMetadata";

/// What an archive walk produced: the header and one metadata document per
/// collection, in stream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Archive header, special keys decoded
    pub header: Document,
    /// Collection metadata documents with any `metadata` string expanded
    pub collection_metadata: Vec<Document>,
}

impl Report {
    /// The report as a two-field document
    pub fn to_document(&self) -> Document {
        self.clone().into_document()
    }

    /// Consume the report into a two-field document
    pub fn into_document(self) -> Document {
        let collections = self
            .collection_metadata
            .into_iter()
            .map(Value::Document)
            .collect::<Vec<_>>();
        Document::new()
            .with(HEADER_KEY, self.header)
            .with(COLLECTION_METADATA_KEY, collections)
    }
}
