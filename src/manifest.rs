use axmldecoder::{Node, ParseError, XmlDocument};

/// The `package` attribute of a binary `AndroidManifest.xml`
pub fn package_name(buf: &[u8]) -> Result<Option<String>, ParseError> {
    let doc: XmlDocument = axmldecoder::parse(buf)?;
    let root = doc.get_root();
    match root {
        Some(Node::Element(root)) => Ok(root.get_attributes().get("package").map(|s| s.into())),
        Some(other) => {
            log::warn!("Unexpected root node: {other:?}");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Descriptor prefix shared by the application's own classes, `com.example.app` -> `Lcom/example/app`
pub fn app_class_prefix(package: &str) -> String {
    format!("L{}", package.replace('.', "/"))
}
