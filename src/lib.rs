//! Disassemble the DEX sections of an APK into smali-like text and browse it.
//!
//! Pipeline: APK bytes -> [`apk`] sections -> [`dex::ClassDecoder`] records -> [`smali::render`]
//! -> [`index::ClassIndex`] -> query and navigation through [`session::Session`].

pub mod apk;
pub mod config;
pub mod dex;
mod errors;
pub mod index;
pub mod manifest;
pub mod session;
pub mod smali;

use log::{debug, warn};

use crate::{apk::Apk, dex::ClassDecoder, index::ClassIndex};
pub use errors::LoadError;

/// Everything one package load produces
#[derive(Debug)]
pub struct Package {
    /// `package` attribute of the manifest, when readable
    pub package_name: Option<String>,
    pub index: ClassIndex,
}

/// Decode every DEX section of an APK and index all of its classes.
/// Any section failing to decode fails the whole load.
pub fn load(buf: &[u8], decoder: &dyn ClassDecoder) -> Result<Package, LoadError> {
    let mut apk = Apk::new(buf)?;
    let package_name = read_package_name(&mut apk);
    let sections = apk.dex_sections()?;
    debug!("{} DEX sections", sections.len());
    let mut records = Vec::new();
    for section in &sections {
        records.extend(decoder.decode(section)?);
    }
    Ok(Package {
        package_name,
        index: ClassIndex::build(records),
    })
}

fn read_package_name(apk: &mut Apk) -> Option<String> {
    let buf = match apk.manifest() {
        Ok(Some(buf)) => buf,
        Ok(None) => {
            debug!("No {}", apk::MANIFEST_ENTRY);
            return None;
        }
        Err(e) => {
            warn!("{e}");
            return None;
        }
    };
    match manifest::package_name(&buf) {
        Ok(package_name) => package_name,
        Err(e) => {
            warn!("Failed to parse manifest: {e}");
            None
        }
    }
}
