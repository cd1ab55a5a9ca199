use std::io::{Cursor, Read};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use thiserror::Error;
use zip::{result::ZipError, ZipArchive};

lazy_static! {
    static ref DEX_ENTRY: Regex = Regex::new(r"^classes[0-9]*\.dex$").unwrap();
}

pub const MANIFEST_ENTRY: &str = "AndroidManifest.xml";

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Failed to read archive: {0}")]
    Zip(#[from] ZipError),
    #[error("Failed to read entry {name}: {source}")]
    Entry {
        name: String,
        source: std::io::Error,
    },
}

/// Raw bytes of one `classesN.dex` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexSection {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Whether an archive entry is a DEX section: `classes.dex`, `classes2.dex`, ...
pub fn is_dex_entry(name: &str) -> bool {
    DEX_ENTRY.is_match(name)
}

/// An opened APK. Entries are only inflated when asked for.
pub struct Apk<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Apk<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, ContainerError> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(buf))?,
        })
    }

    /// DEX sections in archive order
    pub fn dex_sections(&mut self) -> Result<Vec<DexSection>, ContainerError> {
        let mut sections = Vec::new();
        for i in 0..self.archive.len() {
            let Some(name) = self.archive.name_for_index(i) else {
                continue;
            };
            if !is_dex_entry(name) {
                debug!("Skipping {name}");
                continue;
            }
            let name = name.to_string();
            let mut file = self.archive.by_index(i)?;
            // Declared sizes are untrusted
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)
                .map_err(|source| ContainerError::Entry {
                    name: name.clone(),
                    source,
                })?;
            debug!("{name} - {} bytes", bytes.len());
            sections.push(DexSection { name, bytes });
        }
        Ok(sections)
    }

    /// Raw binary `AndroidManifest.xml`, if the archive has one
    pub fn manifest(&mut self) -> Result<Option<Vec<u8>>, ContainerError> {
        let mut file = match self.archive.by_name(MANIFEST_ENTRY) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|source| ContainerError::Entry {
                name: MANIFEST_ENTRY.into(),
                source,
            })?;
        Ok(Some(buf))
    }
}

/// Every DEX section of the package, in archive order
pub fn extract(buf: &[u8]) -> Result<Vec<DexSection>, ContainerError> {
    Apk::new(buf)?.dex_sections()
}
