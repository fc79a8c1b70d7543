use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{2}-\d{3}$").expect("static id regex"))
}

fn file_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(FR|AR)-\d{3}\.ya?ml$").expect("static file name regex"))
}

/// True for `FR-001.yaml`, `AR-123.yml`; false for anything else.
pub fn is_requirement_file_name(name: &str) -> bool {
    file_name_re().is_match(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    Functional,
    Architectural,
    Other,
}

/// An `XX-NNN` requirement identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementId(String);

impl RequirementId {
    pub fn parse(s: &str) -> Option<Self> {
        id_re().is_match(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> RequirementKind {
        match &self.0[..2] {
            "FR" => RequirementKind::Functional,
            "AR" => RequirementKind::Architectural,
            _ => RequirementKind::Other,
        }
    }
}

impl TryFrom<String> for RequirementId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("not a requirement id: {s:?}"))
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.0
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
