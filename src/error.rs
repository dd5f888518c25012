use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// Structurally unusable input: empty file, unreadable header row,
    /// not a ZIP archive, missing worksheet part.
    InvalidSheet(String),
    /// The receipt-number filter matched no rows; nothing was rendered.
    NoMatchingRows(String),
    Pdf(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidSheet(msg) => write!(f, "invalid spreadsheet: {msg}"),
            Error::NoMatchingRows(number) => {
                write!(f, "no rows match receipt number {number}")
            }
            Error::Pdf(msg) => write!(f, "PDF generation failed: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::InvalidSheet(format!("malformed XML: {e}"))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::InvalidSheet(format!("unreadable archive: {e}"))
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::InvalidSheet(format!("unreadable delimited text: {e}"))
    }
}
