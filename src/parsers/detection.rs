//! Picks the parser that owns a document.
//!
//! Every parser may claim the content; the strongest claim at or above the
//! detector's floor wins. Ties go to the family listed first in [`FAMILIES`].

use super::traits::{FormatConfidence, FormatMatch, ParseError, SbomParser};
use super::{CycloneDxParser, SpdxParser, SwidParser};
use crate::model::{SbomData, SbomFormat};

/// Families in tie-break order
pub const FAMILIES: [SbomFormat; 3] = [SbomFormat::Spdx, SbomFormat::CycloneDx, SbomFormat::Swid];

/// Weakest claim the default detector accepts
pub const MIN_CONFIDENCE: FormatConfidence = FormatConfidence::Low;

/// Winning family and its claim, or the reasons nothing won
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Found {
        format: SbomFormat,
        claim: FormatMatch,
    },
    Unknown {
        reasons: Vec<String>,
    },
}

impl Detection {
    #[must_use]
    pub const fn format(&self) -> Option<SbomFormat> {
        match self {
            Self::Found { format, .. } => Some(*format),
            Self::Unknown { .. } => None,
        }
    }

    #[must_use]
    pub const fn claim(&self) -> Option<&FormatMatch> {
        match self {
            Self::Found { claim, .. } => Some(claim),
            Self::Unknown { .. } => None,
        }
    }
}

/// Routes content to the SPDX, `CycloneDX` or SWID parser
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector {
    spdx: SpdxParser,
    cyclonedx: CycloneDxParser,
    swid: SwidParser,
    floor: FormatConfidence,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_floor(MIN_CONFIDENCE)
    }

    /// Detector that ignores claims weaker than `floor`
    #[must_use]
    pub const fn with_floor(floor: FormatConfidence) -> Self {
        Self {
            spdx: SpdxParser::new(),
            cyclonedx: CycloneDxParser::new(),
            swid: SwidParser::new(),
            floor,
        }
    }

    fn parser(&self, format: SbomFormat) -> &dyn SbomParser {
        match format {
            SbomFormat::Spdx => &self.spdx,
            SbomFormat::CycloneDx => &self.cyclonedx,
            SbomFormat::Swid => &self.swid,
        }
    }

    #[must_use]
    pub fn detect(&self, content: &str) -> Detection {
        if content.trim().is_empty() {
            return Detection::Unknown {
                reasons: vec!["empty content".to_string()],
            };
        }

        let mut best: Option<(SbomFormat, FormatMatch)> = None;
        let mut rejected = Vec::new();
        for format in FAMILIES {
            let Some(claim) = self.parser(format).detect(content) else {
                continue;
            };
            tracing::debug!(
                format = %format,
                confidence = %claim.confidence,
                encoding = %claim.encoding,
                "Format claim"
            );
            if claim.confidence < self.floor {
                rejected.push(format!(
                    "{format} claim at {} is below {}",
                    claim.confidence, self.floor
                ));
                continue;
            }
            if best
                .as_ref()
                .map_or(true, |(_, top)| claim.confidence > top.confidence)
            {
                best = Some((format, claim));
            }
        }

        match best {
            Some((format, claim)) => {
                if let Some(note) = claim.note {
                    tracing::warn!(format = %format, note, "Weak format match");
                }
                Detection::Found { format, claim }
            }
            None => {
                let mut reasons = vec!["no parser recognized the content".to_string()];
                reasons.extend(rejected);
                Detection::Unknown { reasons }
            }
        }
    }

    /// Parse `content` with the parser that claims it
    pub fn parse_str(&self, content: &str) -> Result<SbomData, ParseError> {
        match self.detect(content) {
            Detection::Found { format, claim } => {
                tracing::debug!(format = %format, encoding = %claim.encoding, "Parsing");
                self.parser(format).parse_str(content)
            }
            Detection::Unknown { reasons } => Err(ParseError::UnknownFormat(format!(
                "expected SPDX, CycloneDX or SWID ({})",
                reasons.join("; ")
            ))),
        }
    }
}
