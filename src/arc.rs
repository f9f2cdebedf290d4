// ARC recommendation codes (`x.xxxx.x`).
//
// The last group names the area of the plant the recommendation applies to.
use crate::error::{ReportError, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ApplicationArea {
    ManufacturingProcess,
    ProcessSupport,
    BuildingAndGrounds,
    Administrative,
    Unknown,
}

impl ApplicationArea {
    fn from_code(code: &str) -> Self {
        match code {
            "1" => Self::ManufacturingProcess,
            "2" => Self::ProcessSupport,
            "3" => Self::BuildingAndGrounds,
            "4" => Self::Administrative,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ApplicationArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ManufacturingProcess => "Manufacturing Process",
            Self::ProcessSupport => "Process Support",
            Self::BuildingAndGrounds => "Building and Grounds",
            Self::Administrative => "Administrative",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// A validated ARC number, kept in the exact text it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArcCode {
    text: String,
    application: ApplicationArea,
}

impl ArcCode {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let groups: Vec<&str> = text.split('.').collect();
        let well_formed = groups.len() == 3
            && groups
                .iter()
                .all(|g| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit()));
        if !well_formed {
            return Err(ReportError::InvalidArc(text.to_string()));
        }
        Ok(Self {
            text: text.to_string(),
            application: ApplicationArea::from_code(groups[2]),
        })
    }

    pub fn application(&self) -> ApplicationArea {
        self.application
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ArcCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_application() {
        let arc = ArcCode::parse(" 2.4236.1 ").expect("valid code");
        assert_eq!(arc.as_str(), "2.4236.1");
        assert_eq!(arc.application(), ApplicationArea::ManufacturingProcess);
        assert_eq!(arc.application().to_string(), "Manufacturing Process");
    }

    #[test]
    fn unknown_application_is_not_an_error() {
        let arc = ArcCode::parse("2.7142.9").expect("valid shape");
        assert_eq!(arc.application(), ApplicationArea::Unknown);
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in ["2.4236", "2.42a6.1", "2..1", "", "2.4236.1.0"] {
            assert!(
                matches!(ArcCode::parse(bad), Err(ReportError::InvalidArc(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
