//! Text extraction for uploaded files

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::DocChatError;
use crate::errors::Result;

/// Separator appended after each file's text in the combined document
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Resolve the format from the declared MIME type, falling back to the file extension
    #[must_use]
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        match mime.as_deref() {
            Some("application/pdf") => Some(Self::Pdf),
            Some(ct) if ct.starts_with("text/") => Some(Self::PlainText),
            Some(_) => None,
            None => {
                let extension = file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase());
                match extension.as_deref() {
                    Some("pdf") => Some(Self::Pdf),
                    Some("txt" | "text" | "md") => Some(Self::PlainText),
                    _ => None,
                }
            }
        }
    }
}

/// A file as received from an upload surface
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk, inferring its type from the extension
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, None, bytes))
    }

    #[must_use]
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::detect(self.content_type.as_deref(), &self.name)
    }
}

/// Outcome for one file of an upload batch
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub kind: Option<DocumentKind>,
    pub characters: usize,
    pub error: Option<String>,
}

/// Combined text of an upload batch plus a report per file
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub text: String,
    pub files: Vec<FileReport>,
}

impl ExtractionReport {
    /// Number of files that produced text without error
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_none()).count()
    }
}

/// Extract the text of a single uploaded file
pub fn extract_text(file: &UploadedFile) -> Result<String> {
    match file.kind() {
        Some(DocumentKind::Pdf) => extract_pdf_text(&file.name, &file.bytes),
        Some(DocumentKind::PlainText) => decode_text(&file.name, &file.bytes),
        None => Err(DocChatError::Extraction {
            file: file.name.clone(),
            reason: format!(
                "unsupported file type {}",
                file.content_type.as_deref().unwrap_or("(none)")
            ),
        }),
    }
}

/// Extract text from a PDF page by page, in page order.
///
/// Pages without extractable text contribute nothing.
pub fn extract_pdf_text(name: &str, bytes: &[u8]) -> Result<String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| DocChatError::Extraction {
        file: name.to_string(),
        reason: e.to_string(),
    })?;

    let pages = document.get_pages();
    let mut text = String::new();

    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug!("{}: page {} has no extractable text ({})", name, page_number, e),
        }
    }

    debug!("{}: extracted {} chars from {} pages", name, text.len(), pages.len());
    Ok(text)
}

/// Decode a plain-text upload as UTF-8
pub fn decode_text(name: &str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|source| DocChatError::Decode {
        file: name.to_string(),
        source,
    })
}

/// Extract every file of a batch.
///
/// A file that fails is recorded in its report and skipped; the rest of the
/// batch still contributes text.
pub fn extract_batch(files: &[UploadedFile]) -> ExtractionReport {
    let mut report = ExtractionReport::default();

    for file in files {
        match extract_text(file) {
            Ok(text) => {
                report.files.push(FileReport {
                    name: file.name.clone(),
                    kind: file.kind(),
                    characters: text.chars().count(),
                    error: None,
                });
                report.text.push_str(&text);
                report.text.push_str(DOCUMENT_SEPARATOR);
            }
            Err(e) => {
                warn!("Skipping {}: {}", file.name, e);
                report.files.push(FileReport {
                    name: file.name.clone(),
                    kind: file.kind(),
                    characters: 0,
                    error: Some(e.user_message()),
                });
            }
        }
    }

    info!(
        "Extracted {} of {} files ({} chars)",
        report.succeeded(),
        files.len(),
        report.text.len()
    );
    report
}

#[cfg(test)]
pub(crate) mod tests {
    use lopdf::content::Content;
    use lopdf::content::Operation;
    use lopdf::dictionary;
    use lopdf::Document;
    use lopdf::Object;
    use lopdf::Stream;

    use super::*;

    /// Build a PDF with one page per entry, each showing the given line
    pub(crate) fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            DocumentKind::detect(Some("application/pdf"), "x"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect(Some("text/plain; charset=utf-8"), "x"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::detect(None, "Report.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), "notes.txt"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::detect(Some("image/png"), "scan.pdf"), None);
        assert_eq!(DocumentKind::detect(None, "archive.zip"), None);
    }

    #[test]
    fn test_decode_plain_text() {
        let file = UploadedFile::new("notes.txt", Some("text/plain"), "héllo".as_bytes().to_vec());
        assert_eq!(extract_text(&file).unwrap(), "héllo");
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let file = UploadedFile::new("bad.txt", Some("text/plain"), vec![0x66, 0xff, 0x6f]);
        let err = extract_text(&file).unwrap_err();
        assert!(matches!(err, DocChatError::Decode { ref file, .. } if file == "bad.txt"));
    }

    #[test]
    fn test_unsupported_type_is_extraction_error() {
        let file = UploadedFile::new("photo.png", Some("image/png"), vec![1, 2, 3]);
        assert!(matches!(
            extract_text(&file),
            Err(DocChatError::Extraction { .. })
        ));
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let file = UploadedFile::new("broken.pdf", Some("application/pdf"), b"not a pdf".to_vec());
        assert!(matches!(
            extract_text(&file),
            Err(DocChatError::Extraction { .. })
        ));
    }

    #[test]
    fn test_extract_pdf_pages_in_order() {
        let bytes = pdf_with_pages(&["First page.", "Second page."]);
        let text = extract_pdf_text("two.pdf", &bytes).unwrap();

        let first = text.find("First page.").unwrap();
        let second = text.find("Second page.").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_batch_skips_failed_files() {
        let files = vec![
            UploadedFile::new("a.txt", Some("text/plain"), b"alpha".to_vec()),
            UploadedFile::new("b.txt", Some("text/plain"), vec![0xff]),
            UploadedFile::new("c.txt", Some("text/plain"), b"gamma".to_vec()),
        ];

        let report = extract_batch(&files);
        assert_eq!(report.text, "alpha\n\ngamma\n\n");
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert!(report.files[1].error.is_some());
        assert_eq!(report.files[2].characters, 5);
    }
}
