//! dumpscope Test Utilities
//!
//! This crate provides shared builders for archive-shaped test input.

use dumpscope_format::constants::{ARCHIVE_MAGIC, TERMINATOR};
use dumpscope_format::encode_document;

pub use dumpscope_format::{Document, Value};

/// Builder for archive byte streams
pub struct ArchiveBuilder {
    magic: u32,
    header: Document,
    metadata: Vec<Document>,
    terminator: bool,
    trailing: Vec<u8>,
}

impl ArchiveBuilder {
    /// Create a builder for a well-formed archive with an empty header
    pub fn new() -> Self {
        Self {
            magic: ARCHIVE_MAGIC,
            header: Document::new(),
            metadata: Vec::new(),
            terminator: true,
            trailing: Vec::new(),
        }
    }

    /// Override the magic number
    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Set the header document
    pub fn header(mut self, header: Document) -> Self {
        self.header = header;
        self
    }

    /// Append a raw metadata document
    pub fn metadata(mut self, doc: Document) -> Self {
        self.metadata.push(doc);
        self
    }

    /// Append a metadata document in the layout mongodump writes
    pub fn collection(self, db: &str, collection: &str, metadata_json: &str) -> Self {
        self.metadata(
            Document::new()
                .with("db", db)
                .with("collection", collection)
                .with("metadata", metadata_json)
                .with("size", Value::Int64(0))
                .with("type", "collection"),
        )
    }

    /// Leave out the terminator
    pub fn without_terminator(mut self) -> Self {
        self.terminator = false;
        self
    }

    /// Append bytes after the terminator, standing in for data blocks
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    /// Build the archive bytes
    pub fn build(self) -> Vec<u8> {
        let mut bytes = self.magic.to_le_bytes().to_vec();
        bytes.extend(document_bytes(&self.header));
        for doc in &self.metadata {
            bytes.extend(document_bytes(doc));
        }
        if self.terminator {
            bytes.extend(TERMINATOR);
        }
        bytes.extend(self.trailing);
        bytes
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire bytes of `doc`
pub fn document_bytes(doc: &Document) -> Vec<u8> {
    encode_document(doc).expect("test documents have no NUL bytes in keys")
}

/// Header as written by mongodump 100.7.1 against a 8.0 server
pub fn mongodump_header() -> Document {
    Document::new()
        .with("concurrent_collections", 4i32)
        .with("version", "0.1")
        .with("server_version", "8.0.3-120-gbc35ab4")
        .with("tool_version", "100.7.1")
}

/// (db, collection, uuid, extra index) for the collections of a small dump
const MONGODUMP_COLLECTIONS: &[(&str, &str, &str, Option<(&str, &str)>)] = &[
    ("testDB", "testColl", "f4df33f029b34b4fbd5326b5b5c286f3", None),
    (
        "admin",
        "system.users",
        "ce53ac21899e478fb7e5402dd85bfafb",
        Some(("user", "user_1_db_1")),
    ),
    (
        "admin",
        "system.roles",
        "89759f7707b647eea4badf6e74f21a1a",
        Some(("role", "role_1_db_1")),
    ),
    ("admin", "system.version", "15e5e744f67d4c15bbd4983c4c4a40f5", None),
];

/// Metadata JSON strings for a small dump, in archive order
pub fn mongodump_metadata_json() -> Vec<(&'static str, &'static str, String)> {
    MONGODUMP_COLLECTIONS
        .iter()
        .map(|&(db, coll, uuid, extra)| {
            let mut indexes = vec![r#"{"v":{"$numberInt":"2"},"key":{"_id":{"$numberInt":"1"}},"name":"_id_"}"#.to_string()];
            if let Some((field, name)) = extra {
                indexes.push(format!(
                    r#"{{"v":{{"$numberInt":"2"}},"key":{{"{field}":{{"$numberInt":"1"}},"db":{{"$numberInt":"1"}}}},"name":"{name}","unique":true}}"#
                ));
            }
            let json = format!(
                r#"{{"indexes":[{}],"uuid":"{uuid}","collectionName":"{coll}","type":"collection"}}"#,
                indexes.join(",")
            );
            (db, coll, json)
        })
        .collect()
}

/// Decoded form of one entry of [`mongodump_metadata_json`]
pub fn mongodump_expected_metadata(coll: &str, uuid: &str, extra: Option<(&str, &str)>) -> Document {
    let mut indexes = vec![Value::Document(
        Document::new()
            .with("v", 2i32)
            .with("key", Document::new().with("_id", 1i32))
            .with("name", "_id_"),
    )];
    if let Some((field, name)) = extra {
        indexes.push(Value::Document(
            Document::new()
                .with("v", 2i32)
                .with("key", Document::new().with(field, 1i32).with("db", 1i32))
                .with("name", name)
                .with("unique", true),
        ));
    }
    Document::new()
        .with("indexes", indexes)
        .with("uuid", uuid)
        .with("collectionName", coll)
        .with("type", "collection")
}

/// Archive bytes for a small four-collection dump
pub fn mongodump_archive() -> Vec<u8> {
    let mut builder = ArchiveBuilder::new().header(mongodump_header());
    for (db, coll, json) in mongodump_metadata_json() {
        builder = builder.collection(db, coll, &json);
    }
    builder.trailing(&[0x10, 0, 0, 0]).build()
}

/// Expected collection metadata documents for [`mongodump_archive`]
pub fn mongodump_expected_collections() -> Vec<Document> {
    MONGODUMP_COLLECTIONS
        .iter()
        .map(|&(db, coll, uuid, extra)| {
            Document::new()
                .with("db", db)
                .with("collection", coll)
                .with("metadata", mongodump_expected_metadata(coll, uuid, extra))
                .with("size", Value::Int64(0))
                .with("type", "collection")
        })
        .collect()
}
