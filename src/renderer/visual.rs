//! Visual descriptors for render items
//!
//! A visual is resolved once when the body is created, with the precedence
//! per-instance override, then per-kind default, then nothing.

use crate::error::{GameError, GameResult};
use crate::world::level::StaticKind;
use serde::{Deserialize, Deserializer};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const DARK_GRAY: Rgba = Rgba([0x44, 0x44, 0x44, 0xFF]);

    /// Parse "#RRGGBB" or "#AARRGGBB"
    pub fn parse_hex(literal: &str) -> GameResult<Self> {
        let invalid = || GameError::InvalidColor(literal.to_string());
        let digits = literal.trim().strip_prefix('#').ok_or_else(invalid)?;
        let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
        match digits.len() {
            6 => Ok(Rgba([(value >> 16) as u8, (value >> 8) as u8, value as u8, 0xFF])),
            8 => Ok(Rgba([(value >> 16) as u8, (value >> 8) as u8, value as u8, (value >> 24) as u8])),
            _ => Err(invalid()),
        }
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        Rgba::parse_hex(&literal).map_err(serde::de::Error::custom)
    }
}

/// What the compositor draws for a body
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// Named image from the level's sprite lists
    Sprite(String),
    Fill(Rgba),
    None,
}

impl Visual {
    /// Static decor: sprite index wins, then explicit color, then the kind default
    pub fn for_static(
        sprite: Option<&str>,
        color: Option<Rgba>,
        kind_default: Option<Rgba>,
    ) -> Visual {
        if let Some(name) = sprite {
            return Visual::Sprite(name.to_string());
        }
        match color.or(kind_default) {
            Some(rgba) => Visual::Fill(rgba),
            None => Visual::None,
        }
    }

    pub fn sprite_or_none(sprite: Option<&str>) -> Visual {
        sprite.map_or(Visual::None, |name| Visual::Sprite(name.to_string()))
    }
}

/// Render category of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
    StaticDecor(StaticKind),
    Target,
    Obstacle,
    Source,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse_hex("#333333").unwrap(), Rgba([0x33, 0x33, 0x33, 0xFF]));
        assert_eq!(Rgba::parse_hex("#80FF0000").unwrap(), Rgba([0xFF, 0x00, 0x00, 0x80]));
        assert!(Rgba::parse_hex("333333").is_err());
        assert!(Rgba::parse_hex("#12345").is_err());
        assert!(Rgba::parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_static_precedence() {
        let red = Rgba([255, 0, 0, 255]);
        let gray = Rgba::DARK_GRAY;
        assert_eq!(Visual::for_static(Some("brick"), Some(red), Some(gray)), Visual::Sprite("brick".into()));
        assert_eq!(Visual::for_static(None, Some(red), Some(gray)), Visual::Fill(red));
        assert_eq!(Visual::for_static(None, None, Some(gray)), Visual::Fill(gray));
        assert_eq!(Visual::for_static(None, None, None), Visual::None);
    }
}
