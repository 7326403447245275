//! Closed value sets used by the manifest's top-level fields.
//!
//! Each enum serializes as its lowercase name and parses from the same
//! spelling, so the CLI and the JSON artifact share one vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            /// Every accepted spelling, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}' (expected: {})",
                        $label,
                        Self::NAMES.join(", ")
                    )),
                }
            }
        }
    };
}

choice_enum!(
    /// Operating systems a plugin declares support for.
    Platform, "platform" {
        All => "all",
        Mac => "mac",
        Win => "win",
    }
);

choice_enum!(
    /// CPU architectures a plugin declares support for.
    Arch, "arch" {
        All => "all",
        Arm => "arm",
        X64 => "x64",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all() {
        assert_eq!(Platform::default(), Platform::All);
        assert_eq!(Arch::default(), Arch::All);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("MAC".parse::<Platform>().unwrap(), Platform::Mac);
        assert_eq!(" x64 ".parse::<Arch>().unwrap(), Arch::X64);
    }

    #[test]
    fn parse_rejects_unknown_with_choices() {
        let err = "linux".parse::<Platform>().unwrap_err();
        assert!(err.contains("unknown platform 'linux'"));
        assert!(err.contains("all, mac, win"));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Platform::Win).unwrap(), "\"win\"");
        assert_eq!(serde_json::to_string(&Arch::Arm).unwrap(), "\"arm\"");
        let back: Arch = serde_json::from_str("\"x64\"").unwrap();
        assert_eq!(back, Arch::X64);
    }

    #[test]
    fn names_match_variants() {
        for (value, name) in Platform::all().iter().zip(Platform::NAMES) {
            assert_eq!(value.as_str(), *name);
        }
        assert_eq!(Arch::all().len(), Arch::NAMES.len());
    }
}
