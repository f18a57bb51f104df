//! Phase selections such as `validate = "all"` or `dump_after = ["addEntryPoint"]`.

use indexmap::IndexSet;
use serde::Deserialize;

/// A set of phase names, or every phase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPhaseSet")]
pub enum PhaseSet {
    All,
    Only(IndexSet<String>),
}

impl PhaseSet {
    /// A selection of no phases.
    pub fn none() -> Self {
        PhaseSet::Only(IndexSet::new())
    }

    /// A selection of the named phases.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PhaseSet::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, phase: &str) -> bool {
        match self {
            PhaseSet::All => true,
            PhaseSet::Only(names) => names.contains(phase),
        }
    }
}

impl Default for PhaseSet {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPhaseSet {
    Keyword(String),
    List(Vec<String>),
}

impl TryFrom<RawPhaseSet> for PhaseSet {
    type Error = String;

    fn try_from(raw: RawPhaseSet) -> Result<Self, Self::Error> {
        match raw {
            RawPhaseSet::Keyword(keyword) if keyword == "all" => Ok(PhaseSet::All),
            RawPhaseSet::Keyword(keyword) if keyword == "none" => Ok(PhaseSet::none()),
            RawPhaseSet::Keyword(other) => Err(format!(
                "expected \"all\", \"none\" or a list of phase names, found \"{}\"",
                other
            )),
            RawPhaseSet::List(names) => Ok(PhaseSet::of(names)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        phases: PhaseSet,
    }

    fn parse(value: &str) -> Result<PhaseSet, toml::de::Error> {
        toml::from_str::<Wrapper>(&format!("phases = {}", value)).map(|w| w.phases)
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("\"all\"").unwrap(), PhaseSet::All);
        assert_eq!(parse("\"none\"").unwrap(), PhaseSet::none());
        assert!(parse("\"some\"").is_err());
    }

    #[test]
    fn test_list() {
        let set = parse("[\"SpecialBackendChecks\", \"addEntryPoint\"]").unwrap();

        assert!(set.contains("addEntryPoint"));
        assert!(!set.contains("CopyDefaultValuesToActual"));
    }
}
