use super::types::FileKind;
use super::ExtractionError;

/// An uploaded report after name and type checks.
#[derive(Debug, Clone)]
pub struct UploadedReport {
    pub filename: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

impl UploadedReport {
    pub fn new(original_name: &str, bytes: Vec<u8>) -> Result<Self, ExtractionError> {
        let filename = secure_filename(original_name);
        if filename.is_empty() {
            return Err(ExtractionError::UnsupportedFormat(original_name.to_string()));
        }
        let kind = FileKind::from_filename(&filename)?;
        Ok(Self {
            filename,
            kind,
            bytes,
        })
    }
}

/// Reduce an upload name to a safe flat ASCII file name.
///
/// Path separators become spaces, whitespace runs collapse to `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading/trailing `.`/`_` are
/// stripped so `../../etc/passwd` turns into `etc_passwd`.
pub fn secure_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    filtered.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_paths_and_odd_characters() {
        assert_eq!(secure_filename("My Report (1).pdf"), "My_Report_1.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\scans\\blood test.PNG"), "C_scans_blood_test.PNG");
        assert_eq!(secure_filename("résumé.jpg"), "rsum.jpg");
    }

    #[test]
    fn upload_requires_allowed_extension() {
        let ok = UploadedReport::new("lab results.JPG", vec![1, 2, 3]).unwrap();
        assert_eq!(ok.filename, "lab_results.JPG");
        assert_eq!(ok.kind, FileKind::Jpeg);

        assert!(UploadedReport::new("report.docx", vec![]).is_err());
        assert!(UploadedReport::new("...", vec![]).is_err());
    }
}
