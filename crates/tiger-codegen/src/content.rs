//! Collaborator seam for external content reads.
//!
//! Vector elements may inline the markup of an external file via their
//! `src` attribute. The serializer never touches the filesystem
//! directly; it reads through this trait so tests (and other hosts) can
//! substitute their own source.

use std::io;

/// Reads external text content by path.
pub trait ContentSource {
    fn read_text(&self, path: &str) -> io::Result<String>;
}

/// Default filesystem-backed content source.
pub struct FsContentSource;

impl ContentSource for FsContentSource {
    fn read_text(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
