use serde::Deserialize;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Characters no policy other than [`NamePolicy::Posix`] accepts inside a name.
const PORTABLE_ILLEGAL: &[char] = &[':', '*', '?', '"', '<', '>', '|', '\0'];

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Which filesystem rules a name has to satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamePolicy {
    /// Conservative set that is safe on both POSIX and Windows filesystems.
    #[default]
    Portable,
    /// Only what POSIX itself forbids: `/` and NUL.
    Posix,
    /// Portable rules plus control characters, device names and trailing dots or spaces.
    Windows,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameViolation {
    #[error("name is empty")]
    Empty,
    #[error("'.' and '..' are reserved")]
    Reserved,
    #[error("contains the path separator {0:?}")]
    Separator(char),
    #[error("contains the illegal character {0:?}")]
    IllegalChar(char),
    #[error("is a reserved device name on Windows")]
    DeviceName,
    #[error("ends with a dot or a space")]
    TrailingDotOrSpace,
}

impl NamePolicy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Portable => "portable",
            Self::Posix => "posix",
            Self::Windows => "windows",
        }
    }

    /// Path separators under this policy. A trailing one marks a folder in an outline.
    pub fn separators(&self) -> &'static [char] {
        match self {
            Self::Posix => &['/'],
            Self::Portable | Self::Windows => &['/', '\\'],
        }
    }

    fn is_illegal(&self, c: char) -> bool {
        match self {
            Self::Posix => c == '\0',
            Self::Portable => PORTABLE_ILLEGAL.contains(&c),
            Self::Windows => PORTABLE_ILLEGAL.contains(&c) || c.is_ascii_control(),
        }
    }

    /// Checks a single path component against this policy.
    pub fn validate(&self, name: &str) -> Result<(), NameViolation> {
        if name.is_empty() {
            return Err(NameViolation::Empty);
        }
        if name == "." || name == ".." {
            return Err(NameViolation::Reserved);
        }

        for c in name.chars() {
            if self.separators().contains(&c) {
                return Err(NameViolation::Separator(c));
            }
            if self.is_illegal(c) {
                return Err(NameViolation::IllegalChar(c));
            }
        }

        if *self == Self::Windows {
            if name.ends_with('.') || name.ends_with(' ') {
                return Err(NameViolation::TrailingDotOrSpace);
            }
            // `aux.txt` is just as reserved as `AUX`
            let stem = name.split('.').next().unwrap_or(name);
            if WINDOWS_DEVICE_NAMES
                .iter()
                .any(|device| device.eq_ignore_ascii_case(stem))
            {
                return Err(NameViolation::DeviceName);
            }
        }

        Ok(())
    }
}

impl fmt::Display for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NamePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "portable" => Ok(Self::Portable),
            "posix" => Ok(Self::Posix),
            "windows" => Ok(Self::Windows),
            other => Err(format!(
                "unknown name policy '{other}', expected one of: portable, posix, windows"
            )),
        }
    }
}
