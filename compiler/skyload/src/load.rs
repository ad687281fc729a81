//! Import edges and the chain of locations that reached them.

use std::sync::OnceLock;

use smallvec::SmallVec;
use sky_ir::{Label, LabelError, Location};

use crate::error::{BuildFileParseError, DependencyStack, ParseErrorKind};

/// One `load` edge: the file containing it, the raw import string and where
/// the string appears.
#[derive(Clone, Debug)]
pub struct LoadImport {
    containing: Label,
    import: String,
    location: Location,
    label: OnceLock<Result<Label, LabelError>>,
}

impl LoadImport {
    pub fn new(containing: Label, import: impl Into<String>, location: Location) -> Self {
        LoadImport {
            containing,
            import: import.into(),
            location,
            label: OnceLock::new(),
        }
    }

    pub fn containing(&self) -> &Label {
        &self.containing
    }

    pub fn import(&self) -> &str {
        &self.import
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// `:name`, resolved in the containing package.
    pub fn is_relative(&self) -> bool {
        self.import.starts_with(':')
    }

    /// Label of the imported file, computed once.
    pub fn label(&self) -> Result<&Label, BuildFileParseError> {
        self.label
            .get_or_init(|| self.containing.relative(&self.import))
            .as_ref()
            .map_err(|error| {
                BuildFileParseError::new(
                    ParseErrorKind::InvalidLabel,
                    format!("Incorrect load location in {}: {error}", self.location),
                )
                .at(self.location.clone())
            })
    }
}

impl PartialEq for LoadImport {
    fn eq(&self, other: &Self) -> bool {
        self.containing == other.containing && self.import == other.import
    }
}

impl Eq for LoadImport {}

/// Locations of the `load` statements that led to the current file,
/// outermost first.
#[derive(Clone, Default, Debug)]
pub struct LoadStack {
    locations: SmallVec<[Location; 4]>,
}

impl LoadStack {
    pub fn empty() -> Self {
        LoadStack::default()
    }

    /// Stack for a top-level request about `location`.
    pub fn top(location: Location) -> Self {
        let mut locations = SmallVec::new();
        locations.push(location);
        LoadStack { locations }
    }

    /// Stack for a dependency imported at `location`.
    #[must_use]
    pub fn child(&self, location: Location) -> Self {
        let mut locations = self.locations.clone();
        locations.push(location);
        LoadStack { locations }
    }

    pub fn depth(&self) -> usize {
        self.locations.len()
    }

    /// Innermost first, as errors print it.
    pub fn to_dependency_stack(&self) -> DependencyStack {
        DependencyStack::from(self.locations.iter().rev().cloned().collect::<Vec<_>>())
    }
}
