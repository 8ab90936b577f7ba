use std::fmt;

/// The assertions that maintain a snapshot argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseAssertion {
    /// Deep-compares the subject with the snapshot value.
    EqualSnapshot,
    /// Compares the textual inspection of the subject with a snapshot string.
    InspectAsSnapshot,
}

impl BaseAssertion {
    pub const ALL: [Self; 2] = [Self::EqualSnapshot, Self::InspectAsSnapshot];

    pub const fn name(self) -> &'static str {
        match self {
            Self::EqualSnapshot => "to equal snapshot",
            Self::InspectAsSnapshot => "to inspect as snapshot",
        }
    }

    /// The name of the `Expectation` method that runs this assertion.
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::EqualSnapshot => "to_equal_snapshot",
            Self::InspectAsSnapshot => "to_inspect_as_snapshot",
        }
    }

    pub fn from_method_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|base| base.method_name() == name)
    }
}

impl fmt::Display for BaseAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An assertion phrase of the form `[prefix] base`, e.g. `when sorted to equal snapshot`.
///
/// The prefix is kept verbatim, including the whitespace that separates it
/// from the base, so the phrase can be rewritten without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionPhrase {
    prefix: String,
    base: BaseAssertion,
}

impl AssertionPhrase {
    pub const fn new(base: BaseAssertion) -> Self {
        Self {
            prefix: String::new(),
            base,
        }
    }

    /// Parse a phrase by matching one of the base assertions at its end.
    ///
    /// The base must be the whole phrase or be preceded by whitespace.
    pub fn parse(phrase: &str) -> Option<Self> {
        BaseAssertion::ALL.into_iter().find_map(|base| {
            let prefix = phrase.strip_suffix(base.name())?;
            if prefix.is_empty() || prefix.ends_with(char::is_whitespace) {
                Some(Self {
                    prefix: prefix.to_string(),
                    base,
                })
            } else {
                None
            }
        })
    }

    pub const fn base(&self) -> BaseAssertion {
        self.base
    }

    /// The words before the base assertion, without surrounding whitespace.
    pub fn adapter(&self) -> Option<&str> {
        let adapter = self.prefix.trim();
        (!adapter.is_empty()).then_some(adapter)
    }

    /// The same phrase with a different base assertion.
    #[must_use]
    pub fn with_base(&self, base: BaseAssertion) -> Self {
        Self {
            prefix: self.prefix.clone(),
            base,
        }
    }
}

impl fmt::Display for AssertionPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.base)
    }
}
