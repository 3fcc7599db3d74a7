use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a gene as it appears in the interaction network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneId(String);

impl GeneId {
    /// Creates a gene identifier from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the gene name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GeneId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for GeneId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a biological process (annotation term).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    /// Creates a process identifier from its term name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the term name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProcessId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ProcessId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unordered pair of processes; the candidate unit of the linkage network.
///
/// The pair is stored normalised (`first <= second`) so `(A, B)` and
/// `(B, A)` are the same link. Self links `(A, A)` are valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(ProcessId, ProcessId)", into = "(ProcessId, ProcessId)")]
pub struct ProcessLink {
    first: ProcessId,
    second: ProcessId,
}

impl ProcessLink {
    /// Creates a normalised link between two processes.
    pub fn new(a: impl Into<ProcessId>, b: impl Into<ProcessId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// Lexicographically smaller endpoint.
    pub fn first(&self) -> &ProcessId {
        &self.first
    }

    /// Lexicographically larger endpoint.
    pub fn second(&self) -> &ProcessId {
        &self.second
    }

    /// Whether both endpoints are the same process.
    pub fn is_self_link(&self) -> bool {
        self.first == self.second
    }
}

impl From<(ProcessId, ProcessId)> for ProcessLink {
    fn from((a, b): (ProcessId, ProcessId)) -> Self {
        Self::new(a, b)
    }
}

impl From<ProcessLink> for (ProcessId, ProcessId) {
    fn from(link: ProcessLink) -> Self {
        (link.first, link.second)
    }
}

impl fmt::Display for ProcessLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.first, self.second)
    }
}

/// Unordered gene pair observed in the interaction network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interaction {
    first: GeneId,
    second: GeneId,
}

impl Interaction {
    /// Creates a normalised interaction.
    pub fn new(a: impl Into<GeneId>, b: impl Into<GeneId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// Returns both genes in normalised order.
    pub fn genes(&self) -> (&GeneId, &GeneId) {
        (&self.first, &self.second)
    }
}
