use std::fmt;
use std::str::FromStr;

/// Sentinel accepted wherever a filter value is parsed.
pub const ALL: &str = "all";

/// A board filter: either everything, or one specific id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    pub fn only(id: impl Into<String>) -> Self {
        Filter::Only(id.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// A missing relation never matches a specific id.
    pub fn matches(&self, id: Option<&str>) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => id == Some(wanted.as_str()),
        }
    }

    pub fn selected(&self) -> Option<&str> {
        match self {
            Filter::All => None,
            Filter::Only(id) => Some(id),
        }
    }

    /// Step through `All, ids[0], ids[1], ...` and wrap around.
    ///
    /// A filter whose id is no longer among `ids` restarts from `All`.
    pub fn cycle<'a>(&self, ids: impl IntoIterator<Item = &'a str>, forward: bool) -> Filter {
        let options: Vec<Option<&str>> = std::iter::once(None)
            .chain(ids.into_iter().map(Some))
            .collect();
        let current = options
            .iter()
            .position(|opt| *opt == self.selected())
            .unwrap_or(0);
        let len = options.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        options[next].map_or(Filter::All, Filter::only)
    }
}

impl From<Option<String>> for Filter {
    fn from(id: Option<String>) -> Self {
        id.map_or(Filter::All, Filter::Only)
    }
}

impl FromStr for Filter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL) {
            Ok(Filter::All)
        } else {
            Ok(Filter::only(s))
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "{ALL}"),
            Filter::Only(id) => write!(f, "{id}"),
        }
    }
}
