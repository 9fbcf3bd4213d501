//! Named connection points on nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Maximum number of image input handles on a generator node.
pub const MAX_IMAGE_INPUTS: u8 = 5;

const IMAGE_PREFIX: &str = "image-";

/// An input port on a generator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetHandle {
    /// The `prompt` port.
    Prompt,
    /// A numbered `image-{n}` port.
    Image(u8),
}

impl TargetHandle {
    /// Returns true for any `image-*` port.
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

impl fmt::Display for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt => f.write_str("prompt"),
            Self::Image(index) => write!(f, "{IMAGE_PREFIX}{index}"),
        }
    }
}

impl FromStr for TargetHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "prompt" {
            return Ok(Self::Prompt);
        }

        // Only canonical spellings, so each port has exactly one wire name.
        s.strip_prefix(IMAGE_PREFIX)
            .and_then(|raw| raw.parse::<u8>().ok().filter(|index| index.to_string() == raw))
            .map(Self::Image)
            .ok_or_else(|| format!("unknown target handle: {s}"))
    }
}

/// An output port.
///
/// Text and image nodes expose a single unlabeled output, which edges store as
/// a missing source handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SourceHandle {
    /// The text `output` port (also the unlabeled output).
    Output,
    /// The generator `image-output` port.
    ImageOutput,
}

impl SourceHandle {
    /// Parses an optional wire handle; a missing handle is the unlabeled output.
    pub fn parse_optional(handle: Option<&str>) -> Option<Self> {
        match handle {
            None => Some(Self::Output),
            Some(handle) => handle.parse().ok(),
        }
    }
}

/// Which side of an edge a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HandleSide {
    /// The edge leaves the node through this handle.
    Source,
    /// The edge enters the node through this handle.
    Target,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_handles_parse_from_wire_names() {
        assert_eq!("prompt".parse(), Ok(TargetHandle::Prompt));
        assert_eq!("image-0".parse(), Ok(TargetHandle::Image(0)));
        assert_eq!("image-4".parse(), Ok(TargetHandle::Image(4)));
        assert!("image-".parse::<TargetHandle>().is_err());
        assert!("image-x".parse::<TargetHandle>().is_err());
        assert!("output".parse::<TargetHandle>().is_err());
        assert!("image-00".parse::<TargetHandle>().is_err());
        assert!("image-+0".parse::<TargetHandle>().is_err());
        assert!("image-01".parse::<TargetHandle>().is_err());
        assert_eq!("image-10".parse(), Ok(TargetHandle::Image(10)));
        assert_eq!(TargetHandle::Image(3).to_string(), "image-3");
    }

    #[test]
    fn source_handles_parse_from_wire_names() {
        assert_eq!("output".parse(), Ok(SourceHandle::Output));
        assert_eq!("image-output".parse(), Ok(SourceHandle::ImageOutput));
        assert_eq!(SourceHandle::ImageOutput.as_ref(), "image-output");
        assert_eq!(SourceHandle::parse_optional(None), Some(SourceHandle::Output));
        assert_eq!(SourceHandle::parse_optional(Some("prompt")), None);
    }
}
