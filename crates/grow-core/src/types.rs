use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

/// Who an assessment is about; also the path segment responses live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Individual,
    Organization,
}

impl Audience {
    pub fn all() -> &'static [Audience] {
        &[Audience::Individual, Audience::Organization]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Audience::Individual => "individual",
            Audience::Organization => "organization",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Audience {
    type Err = crate::error::GrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(Audience::Individual),
            "organization" => Ok(Audience::Organization),
            _ => Err(crate::error::GrowError::InvalidAudience(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AssessmentKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Career,
    DigitalTwin,
    Organization,
    Diagnostic,
    GrowthSeeker,
}

impl AssessmentKind {
    pub fn all() -> &'static [AssessmentKind] {
        &[
            AssessmentKind::Career,
            AssessmentKind::DigitalTwin,
            AssessmentKind::Organization,
            AssessmentKind::Diagnostic,
            AssessmentKind::GrowthSeeker,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentKind::Career => "career",
            AssessmentKind::DigitalTwin => "digital_twin",
            AssessmentKind::Organization => "organization",
            AssessmentKind::Diagnostic => "diagnostic",
            AssessmentKind::GrowthSeeker => "growth_seeker",
        }
    }

    pub fn audience(self) -> Audience {
        match self {
            AssessmentKind::Organization | AssessmentKind::Diagnostic => Audience::Organization,
            AssessmentKind::Career
            | AssessmentKind::DigitalTwin
            | AssessmentKind::GrowthSeeker => Audience::Individual,
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentKind {
    type Err = crate::error::GrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // URLs use hyphens, stored data uses underscores; accept both.
        match s.replace('-', "_").as_str() {
            "career" => Ok(AssessmentKind::Career),
            "digital_twin" => Ok(AssessmentKind::DigitalTwin),
            "organization" => Ok(AssessmentKind::Organization),
            "diagnostic" => Ok(AssessmentKind::Diagnostic),
            "growth_seeker" => Ok(AssessmentKind::GrowthSeeker),
            _ => Err(crate::error::GrowError::InvalidKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Band
// ---------------------------------------------------------------------------

/// Coarse reading of a category percentage used for the result text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Strong,
    Developing,
    NeedsFocus,
}

impl Band {
    pub fn as_str(self) -> &'static str {
        match self {
            Band::Strong => "strong",
            Band::Developing => "developing",
            Band::NeedsFocus => "needs_focus",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_hyphen_and_underscore() {
        assert_eq!(
            "digital-twin".parse::<AssessmentKind>().unwrap(),
            AssessmentKind::DigitalTwin
        );
        assert_eq!(
            "growth_seeker".parse::<AssessmentKind>().unwrap(),
            AssessmentKind::GrowthSeeker
        );
        assert!("quiz".parse::<AssessmentKind>().is_err());
    }

    #[test]
    fn kind_audience_mapping() {
        assert_eq!(AssessmentKind::Career.audience(), Audience::Individual);
        assert_eq!(AssessmentKind::DigitalTwin.audience(), Audience::Individual);
        assert_eq!(AssessmentKind::Organization.audience(), Audience::Organization);
        assert_eq!(AssessmentKind::Diagnostic.audience(), Audience::Organization);
    }

    #[test]
    fn audience_rejects_unknown() {
        assert!("team".parse::<Audience>().is_err());
        assert_eq!("organization".parse::<Audience>().unwrap().to_string(), "organization");
    }

    #[test]
    fn kind_display_matches_serde() {
        for &kind in AssessmentKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
