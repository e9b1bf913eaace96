use std::fmt;

/// Apple platform a build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    Macos,
}

impl Platform {
    /// Build order when several platforms are requested.
    pub const ALL: [Self; 2] = [Self::Ios, Self::Macos];

    /// Name as used in destinations and scheme names (`iOS`, `macOS`).
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::Macos => "macOS",
        }
    }

    /// Lower-case name used in file names (`ios`, `macos`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Macos => "macos",
        }
    }

    #[must_use]
    pub fn destination(self) -> String {
        format!("generic/platform={}", self.display_name())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
