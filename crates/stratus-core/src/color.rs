//! Color handling for Stratus diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors are accepted in any CSS syntax and emitted as
//! hexadecimal RGB(A), which is what Graphviz understands.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};

/// A CSS color such as `"white"`, `"#E5F5FD"` or `"rgb(0, 120, 212)"`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_hex().hash(state);
    }
}

impl Color {
    /// Parses a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_core::color::Color;
    ///
    /// let white = Color::new("white").unwrap();
    /// assert_eq!(white.to_hex(), "#ffffff");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns the color as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_core::color::Color;
    ///
    /// let blue = Color::new("rgb(0, 120, 212)").unwrap();
    /// assert_eq!(blue.to_hex(), "#0078d4");
    ///
    /// let faded = Color::new("#0078d480").unwrap();
    /// assert_eq!(faded.to_hex(), "#0078d480");
    /// ```
    pub fn to_hex(&self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        if rgba.a == u8::MAX {
            format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
        }
    }

    /// Returns the alpha component, between 0.0 (transparent) and 1.0 (opaque).
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#2D3436").is_ok());
        assert!(Color::new("white").is_ok());

        let err = Color::new("not-a-color").unwrap_err();
        assert!(err.contains("not-a-color"));
    }

    #[test]
    fn test_default_is_black() {
        assert_eq!(Color::default().to_hex(), "#000000");
    }

    #[test]
    fn test_to_hex_normalizes_case_and_syntax() {
        assert_eq!(Color::new("#AEB6BE").unwrap().to_hex(), "#aeb6be");
        assert_eq!(Color::new("red").unwrap().to_hex(), "#ff0000");
        assert_eq!(Color::new("rgb(255, 255, 255)").unwrap().to_hex(), "#ffffff");
    }

    #[test]
    fn test_display_matches_hex() {
        let color = Color::new("#7B8894").unwrap();
        assert_eq!(color.to_string(), color.to_hex());
    }

    #[test]
    fn test_alpha() {
        let opaque = Color::new("white").unwrap();
        assert!((opaque.alpha() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_color_eq_hash() {
        let a = Color::new("red").unwrap();
        let b = Color::new("red").unwrap();
        let c = Color::new("blue").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }
}
