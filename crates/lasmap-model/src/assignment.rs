//! User-facing value of a curve row's "base name" cell.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classification::{Classification, CurveStatus};
use crate::lookup::{clean_name, same_name};

/// Text shown (and accepted) for an ignored curve.
pub const IGNORE_MARKER: &str = "[IGNORE]";

/// Text shown (and accepted) for "make this field its own base name".
pub const NEW_BASE_MARKER: &str = "[NEW BASE]";

/// What the analyst has assigned to a curve row.
///
/// Equality compares base names case-insensitively after trimming, which is
/// the same rule the dictionary applies, so `Base("gr") == Base("GR")`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Assignment {
    /// Nothing assigned yet.
    #[default]
    Unset,
    /// Exclude this field name from mapping.
    Ignore,
    /// Promote the field name itself to a base name.
    NewBase,
    /// Map to the named base (existing or typed ad hoc).
    Base(String),
}

impl Assignment {
    /// Parses the text of an edited cell.
    pub fn parse(text: &str) -> Self {
        let trimmed = clean_name(text);
        if trimmed.is_empty() {
            Self::Unset
        } else if trimmed.eq_ignore_ascii_case(IGNORE_MARKER) {
            Self::Ignore
        } else if trimmed.eq_ignore_ascii_case(NEW_BASE_MARKER) {
            Self::NewBase
        } else {
            Self::Base(trimmed.to_string())
        }
    }

    /// Builds a base-name assignment. Blank names become
    /// [`Assignment::Unset`] and marker text becomes the marker it spells.
    pub fn base(name: &str) -> Self {
        Self::parse(name)
    }

    /// Re-reads a [`Assignment::Base`] built directly from marker or blank
    /// text as the value that text stands for.
    pub fn normalized(self) -> Self {
        match self {
            Self::Base(name) => Self::parse(&name),
            other => other,
        }
    }

    /// The committed value a freshly classified row starts with.
    pub fn from_classification(classification: &Classification) -> Self {
        match classification {
            Classification::Unknown => Self::Unset,
            Classification::Ignored => Self::Ignore,
            Classification::Mapped(base) => Self::Base(base.clone()),
        }
    }

    pub fn status(&self) -> CurveStatus {
        match self {
            Self::Unset => CurveStatus::Unknown,
            Self::Ignore => CurveStatus::Ignored,
            Self::NewBase | Self::Base(_) => CurveStatus::Mapped,
        }
    }

    pub fn base_name(&self) -> Option<&str> {
        match self {
            Self::Base(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unset, Self::Unset)
            | (Self::Ignore, Self::Ignore)
            | (Self::NewBase, Self::NewBase) => true,
            (Self::Base(left), Self::Base(right)) => same_name(left, right),
            _ => false,
        }
    }
}

impl Eq for Assignment {}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Ignore => f.write_str(IGNORE_MARKER),
            Self::NewBase => f.write_str(NEW_BASE_MARKER),
            Self::Base(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Assignment {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_markers_case_insensitively() {
        assert_eq!(Assignment::parse("[ignore]"), Assignment::Ignore);
        assert_eq!(Assignment::parse(" [New Base] "), Assignment::NewBase);
        assert_eq!(Assignment::parse("  "), Assignment::Unset);
        assert_eq!(Assignment::parse("GR"), Assignment::Base("GR".to_string()));
    }

    #[test]
    fn base_equality_ignores_case() {
        assert_eq!(Assignment::base("gr"), Assignment::base("GR "));
        assert_ne!(Assignment::base("GR"), Assignment::Ignore);
    }

    #[test]
    fn marker_text_is_never_a_base_name() {
        assert_eq!(Assignment::base("[IGNORE]"), Assignment::Ignore);
        assert_eq!(Assignment::base(" [new base]"), Assignment::NewBase);
        assert_eq!(Assignment::base(""), Assignment::Unset);
        assert_eq!(
            Assignment::Base("[Ignore]".to_string()).normalized(),
            Assignment::Ignore
        );
        assert_eq!(
            Assignment::Base(" RHOB ".to_string()).normalized(),
            Assignment::Base("RHOB".to_string())
        );
        let value = Assignment::base("[IGNORE]");
        assert_eq!(Assignment::parse(&value.to_string()), value);
    }

    #[test]
    fn display_round_trips_markers() {
        for value in [Assignment::Ignore, Assignment::NewBase, Assignment::base("CAL")] {
            assert_eq!(Assignment::parse(&value.to_string()), value);
        }
        assert_eq!(Assignment::Unset.to_string(), "");
    }
}
