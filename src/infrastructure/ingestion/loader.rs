//! File-system document loader for PDF, Word and plain text files

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::domain::ingestion::{DocumentLoader, DocumentSegment, FileType};
use crate::domain::DomainError;

const DOCX_BODY: &str = "word/document.xml";
const PAGE_BREAK: char = '\u{c}';

static PARAGRAPH_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</w:p>|<w:br\s*/>").unwrap());
static TAB: Lazy<Regex> = Lazy::new(|| Regex::new(r"<w:tab\s*/>").unwrap());
static XML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Loads documents from disk.
///
/// PDFs yield one segment per page, other formats a single segment.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentLoader;

impl FileDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    fn source_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    fn read_pdf(path: &Path) -> Result<Vec<String>, DomainError> {
        let text = pdf_extract::extract_text(path).map_err(|e| {
            DomainError::ingestion(format!("Failed to read PDF {}: {}", path.display(), e))
        })?;

        Ok(text.split(PAGE_BREAK).map(str::to_string).collect())
    }

    fn read_docx(path: &Path) -> Result<Vec<String>, DomainError> {
        let file = std::fs::File::open(path).map_err(|e| {
            DomainError::ingestion(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| {
            DomainError::ingestion(format!("Not a valid Word document {}: {}", path.display(), e))
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY)
            .map_err(|e| {
                DomainError::ingestion(format!("Missing {} in {}: {}", DOCX_BODY, path.display(), e))
            })?
            .read_to_string(&mut xml)
            .map_err(|e| DomainError::ingestion(format!("Failed to read {}: {}", path.display(), e)))?;

        Ok(vec![docx_xml_to_text(&xml)])
    }

    async fn read_txt(path: &Path) -> Result<Vec<String>, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::ingestion(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let text = String::from_utf8(bytes).map_err(|_| {
            DomainError::ingestion(format!("{} is not valid UTF-8 text", path.display()))
        })?;

        Ok(vec![text])
    }

    async fn blocking<F>(path: &Path, read: F) -> Result<Vec<String>, DomainError>
    where
        F: FnOnce(&Path) -> Result<Vec<String>, DomainError> + Send + 'static,
    {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || read(&path))
            .await
            .map_err(|e| DomainError::internal(format!("Document reader task failed: {}", e)))?
    }
}

/// Flatten WordprocessingML to text, one paragraph per line
fn docx_xml_to_text(xml: &str) -> String {
    let text = PARAGRAPH_END.replace_all(xml, "\n");
    let text = TAB.replace_all(&text, "\t");
    let text = XML_TAG.replace_all(&text, "");

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    // `&amp;` goes last so "&amp;#38;" stays literal
    let text = NUMERIC_ENTITY
        .replace_all(&text, |caps: &Captures| decode_char_ref(caps))
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_char_ref(caps: &Captures) -> String {
    let code = match (caps.get(1), caps.get(2)) {
        (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
        (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
        _ => None,
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| caps[0].to_string())
}

#[async_trait]
impl DocumentLoader for FileDocumentLoader {
    async fn load(&self, path: &Path, file_type: FileType) -> Result<Vec<DocumentSegment>, DomainError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DomainError::ingestion(format!("File not found: {}", path.display())));
        }

        let texts = match file_type {
            FileType::Pdf => Self::blocking(path, Self::read_pdf).await?,
            FileType::Docx => Self::blocking(path, Self::read_docx).await?,
            FileType::Txt => Self::read_txt(path).await?,
        };

        let source = Self::source_name(path);
        let segments: Vec<DocumentSegment> = texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .enumerate()
            .map(|(index, text)| DocumentSegment::new(source.clone(), index, text))
            .collect();

        debug!(source = %source, file_type = %file_type, segments = segments.len(), "Document loaded");

        Ok(segments)
    }
}
