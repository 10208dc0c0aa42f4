use crate::constants::*;
use crate::layout::PageGeometry;
use crate::types::*;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the size-budget compressor
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompressionParams {
    /// Maximum encoded size per photo in bytes
    pub max_bytes: usize,
    /// Longer edge after the pre-scale clamp (pixels)
    pub max_dimension: u32,
    /// Resolution floor for the downscale fallback (pixels)
    pub min_dimension: u32,
    pub quality_low: f32,
    pub quality_high: f32,
    pub quality_start: f32,
    /// Number of encode attempts in the quality bisection
    pub rounds: u32,
    /// Scale applied per fallback step
    pub shrink_factor: f32,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_dimension: MAX_DIMENSION_PX,
            min_dimension: MIN_DIMENSION_PX,
            quality_low: QUALITY_LOW,
            quality_high: QUALITY_HIGH,
            quality_start: QUALITY_START,
            rounds: BISECTION_ROUNDS,
            shrink_factor: SHRINK_FACTOR,
        }
    }
}

impl CompressionParams {
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let factors = [
            self.quality_low,
            self.quality_high,
            self.quality_start,
            self.shrink_factor,
        ];
        if factors.iter().any(|v| !v.is_finite()) {
            return Err(ReportError::Config(
                "Quality bounds and shrink factor must be finite".to_string(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(ReportError::Config(
                "Byte budget must be greater than zero".to_string(),
            ));
        }
        if self.min_dimension == 0 || self.min_dimension > self.max_dimension {
            return Err(ReportError::Config(format!(
                "Resolution floor {} must be between 1 and the {} px cap",
                self.min_dimension, self.max_dimension
            )));
        }
        let in_unit = |q: f32| (0.0..=1.0).contains(&q);
        if !in_unit(self.quality_low) || !in_unit(self.quality_high) {
            return Err(ReportError::Config(
                "Quality bounds must lie in 0.0..=1.0".to_string(),
            ));
        }
        if self.quality_low > self.quality_high {
            return Err(ReportError::Config(format!(
                "Quality bounds are inverted ({} > {})",
                self.quality_low, self.quality_high
            )));
        }
        if self.quality_start < self.quality_low || self.quality_start > self.quality_high {
            return Err(ReportError::Config(format!(
                "Start quality {} lies outside {}..={}",
                self.quality_start, self.quality_low, self.quality_high
            )));
        }
        if self.rounds == 0 {
            return Err(ReportError::Config(
                "At least one bisection round is required".to_string(),
            ));
        }
        if !(self.shrink_factor > 0.0 && self.shrink_factor < 1.0) {
            return Err(ReportError::Config(format!(
                "Shrink factor {} must lie strictly between 0 and 1",
                self.shrink_factor
            )));
        }
        Ok(())
    }

    /// Every field as plain bits, floats by bit pattern
    #[allow(clippy::type_complexity)]
    fn key(&self) -> (usize, u32, u32, u32, u32, u32, u32, u32) {
        (
            self.max_bytes,
            self.max_dimension,
            self.min_dimension,
            self.quality_low.to_bits(),
            self.quality_high.to_bits(),
            self.quality_start.to_bits(),
            self.rounds,
            self.shrink_factor.to_bits(),
        )
    }
}

// Parameters are part of the compression cache key. Equality and hashing
// both compare floats by bit pattern so they always agree.
impl PartialEq for CompressionParams {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CompressionParams {}

impl Hash for CompressionParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Header and footer wording.
///
/// `{id}`, `{date}`, `{page}` and `{total}` are substituted when pages are
/// assembled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReportText {
    pub title: String,
    pub report_label: String,
    pub date_label: String,
    pub footer_note: String,
    pub page_label: String,
}

impl Default for ReportText {
    fn default() -> Self {
        Self {
            title: "Relatório de Fiscalização".to_string(),
            report_label: "Relatório nº {id}".to_string(),
            date_label: "Data: {date}".to_string(),
            footer_note: "Fotos da data da fiscalização".to_string(),
            page_label: "Página {page} de {total}".to_string(),
        }
    }
}

impl ReportText {
    pub fn report_label_for(&self, report_id: &str) -> String {
        self.report_label.replace("{id}", report_id)
    }

    pub fn date_label_for(&self, date: &str) -> String {
        self.date_label.replace("{date}", date)
    }

    pub fn page_label_for(&self, page: usize, total: usize) -> String {
        self.page_label
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// Complete report configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReportOptions {
    /// Free-text report identifier, shown in the header and used in the file name
    pub report_id: String,

    pub photos_per_page: PhotosPerPage,
    pub compression: CompressionParams,
    pub geometry: PageGeometry,
    pub text: ReportText,

    /// Date printed in the header (dd/mm/yyyy). Today's date when unset.
    pub date: Option<String>,

    /// Compress photos concurrently on the blocking pool
    pub parallel: bool,

    /// Image drawn at the left of every header band
    pub logo: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            report_id: String::new(),
            photos_per_page: PhotosPerPage::Two,
            compression: CompressionParams::default(),
            geometry: PageGeometry::default(),
            text: ReportText::default(),
            date: None,
            parallel: true,
            logo: None,
        }
    }
}

impl ReportOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ReportError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Report id as printed in headers; a placeholder when none was entered
    pub fn display_report_id(&self) -> &str {
        let id = self.report_id.trim();
        if id.is_empty() {
            PLACEHOLDER_REPORT_ID
        } else {
            id
        }
    }

    /// Header date, falling back to today
    pub fn resolved_date(&self) -> String {
        match &self.date {
            Some(date) if !date.trim().is_empty() => date.trim().to_string(),
            _ => chrono::Local::now().format("%d/%m/%Y").to_string(),
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.compression.validate()?;
        self.geometry.validate(self.photos_per_page)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_signed_zero_is_a_distinct_key() {
        let positive = CompressionParams {
            quality_low: 0.0,
            ..Default::default()
        };
        let negative = CompressionParams {
            quality_low: -0.0,
            ..Default::default()
        };
        assert_ne!(positive, negative);

        let set: HashSet<_> = [positive, negative].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_nan_params_equal_themselves() {
        let params = CompressionParams {
            quality_start: f32::NAN,
            ..Default::default()
        };
        assert_eq!(params, params);

        let set: HashSet<_> = [params, params].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&params));
    }
}
