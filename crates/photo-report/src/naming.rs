use crate::constants::{FALLBACK_FILE_STEM, FILE_NAME_PREFIX};

/// Make a report id safe for file names.
///
/// Every character that is not an ASCII letter or digit becomes `_`. An empty
/// (or all-whitespace) id yields the fallback stem.
pub fn sanitize_report_id(report_id: &str) -> String {
    let trimmed = report_id.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILE_STEM.to_string();
    }
    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Output file name for a report: `Relatorio_Fiscalizacao_<id>.pdf`
pub fn report_file_name(report_id: &str) -> String {
    format!("{}{}.pdf", FILE_NAME_PREFIX, sanitize_report_id(report_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_report_id("2024/7-000123-4"), "2024_7_000123_4");
        assert_eq!(sanitize_report_id("Obra São João"), "Obra_S_o_Jo_o");
        assert_eq!(sanitize_report_id("abc123"), "abc123");
    }

    #[test]
    fn test_empty_id_falls_back() {
        assert_eq!(sanitize_report_id(""), "relatorio");
        assert_eq!(sanitize_report_id("   "), "relatorio");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            report_file_name("0042/7-123456-1"),
            "Relatorio_Fiscalizacao_0042_7_123456_1.pdf"
        );
        assert_eq!(report_file_name(""), "Relatorio_Fiscalizacao_relatorio.pdf");
    }
}
