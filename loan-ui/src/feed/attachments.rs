use shared_types::{ChatTurn, Document};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Image,
    Other,
}

impl AttachmentKind {
    /// Decided by the extension of the title, falling back to the URL path
    /// when the title does not name a previewable file.
    pub fn classify(document: &Document) -> Self {
        match Self::from_name(&document.title) {
            AttachmentKind::Other => Self::from_name(&document.image_url),
            kind => kind,
        }
    }

    fn from_name(name: &str) -> Self {
        match extension_of(name).as_deref() {
            Some("pdf") => AttachmentKind::Pdf,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => AttachmentKind::Image,
            _ => AttachmentKind::Other,
        }
    }
}

fn extension_of(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').next().unwrap_or_default();
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Documents attached to a turn; empty when the payload is absent or bad.
pub fn turn_documents(turn: &ChatTurn) -> Vec<Document> {
    turn.parse_payload()
        .ok()
        .flatten()
        .map(|payload| payload.documents)
        .unwrap_or_default()
}
