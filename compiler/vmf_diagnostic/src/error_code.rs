//! Stable identifiers for every finding kind.
//!
//! Codes are part of the external interface: tooling filters and suppresses
//! by them, and `vmfc explain` looks documentation up by them.

use std::fmt;

/// Error codes for all verifier diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    /// View is not registered in any container
    VMF001,
    /// View is registered but its companion factory registration or
    /// generated stub is missing
    VMF002,
    /// Several constructors match the runtime parameters and none (or more
    /// than one) is marked preferred
    VMF003,
    /// No public constructor starts with the runtime parameters
    VMF004,
}

impl ErrorCode {
    /// All codes, in numeric order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::VMF001,
        ErrorCode::VMF002,
        ErrorCode::VMF003,
        ErrorCode::VMF004,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::VMF001 => "VMF001",
            ErrorCode::VMF002 => "VMF002",
            ErrorCode::VMF003 => "VMF003",
            ErrorCode::VMF004 => "VMF004",
        }
    }

    /// One-line title used in listings and SARIF-style rule tables.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::VMF001 => "view is not registered",
            ErrorCode::VMF002 => "missing companion factory registration",
            ErrorCode::VMF003 => "ambiguous companion constructor",
            ErrorCode::VMF004 => "no matching companion constructor",
        }
    }

    /// Whether the remediation engine has an automatic fix for this code.
    pub fn is_fixable(&self) -> bool {
        !matches!(self, ErrorCode::VMF004)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"VMF002"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
