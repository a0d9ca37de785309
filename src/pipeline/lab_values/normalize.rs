/// Lower-case OCR output. Keyword matching runs on this form only.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_keeps_layout() {
        assert_eq!(normalize_text("HbA1c: 6.1 %\nTSH 2.0"), "hba1c: 6.1 %\ntsh 2.0");
    }
}
