//! Editor options — parsed from `:set`-style directive strings.
//!
//! The binary reads a directive string from the environment and applies it
//! on top of [`Options::default`]:
//!
//! ```text
//! PGEDIT_OPTIONS="gapsize=128 scrolloff=2 noexpandtab"
//! ```
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                 |
//! |------------------|------------------------|
//! | `option`         | Enable boolean         |
//! | `nooption`       | Disable boolean        |
//! | `option!`        | Toggle boolean         |
//! | `option=N`       | Assign numeric / byte  |
//!
//! # Option names
//!
//! | Full name   | Abbrev | Type    | Default |
//! |-------------|--------|---------|---------|
//! | `gapsize`   | `gs`   | integer | 64      |
//! | `padbyte`   | `pb`   | byte    | `' '`   |
//! | `scrolloff` | `so`   | integer | 0       |
//! | `expandtab` | `et`   | bool    | true    |
//! | `tabstop`   | `ts`   | integer | 4       |
//!
//! `padbyte` takes a single printable ASCII character.

use thiserror::Error;

use crate::gap_buffer::INITIAL_GAP_SIZE;

/// A parsed `:set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option!` — toggle a boolean option.
    Toggle(String),

    /// `option=value` — assign a value.
    Assign(String, String),
}

/// Why a directive could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("option {0} takes a value")]
    NeedsValue(String),
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "expandtab" | "et")
}

/// Returns `true` if `name` is a known valued option (full name or abbreviation).
#[must_use]
pub fn is_value_option(name: &str) -> bool {
    matches!(
        name,
        "gapsize" | "gs" | "padbyte" | "pb" | "scrolloff" | "so" | "tabstop" | "ts"
    )
}

/// Parse a whitespace-separated directive string.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only strip "no" when the rest is a real boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display.
///
/// Returns `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunables for the editing core and the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Gap reserved when a line is opened or reset. At least 1.
    pub gap_size: usize,
    /// Byte used to fill screen cells with no content.
    pub pad_byte: u8,
    /// Lines of context kept around the cursor when scrolling.
    pub scroll_off: usize,
    /// Insert spaces instead of a tab byte.
    pub tab_inserts_spaces: bool,
    /// Spaces inserted per tab when `tab_inserts_spaces` is set. At least 1.
    pub tab_width: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            gap_size: INITIAL_GAP_SIZE,
            pad_byte: b' ',
            scroll_off: 0,
            tab_inserts_spaces: true,
            tab_width: 4,
        }
    }
}

impl Options {
    /// Defaults with every directive in `args` applied in order.
    ///
    /// # Errors
    ///
    /// The first directive that fails to apply.
    pub fn from_set_str(args: &str) -> Result<Self, OptionError> {
        let mut opts = Self::default();
        opts.apply_all(args)?;
        Ok(opts)
    }

    /// Apply every directive in `args` in order.
    ///
    /// # Errors
    ///
    /// The first directive that fails to apply. Earlier directives stay
    /// applied.
    pub fn apply_all(&mut self, args: &str) -> Result<(), OptionError> {
        for directive in parse_set(args) {
            self.apply(&directive)?;
        }
        Ok(())
    }

    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// [`OptionError`] for unknown names, booleans used as values and vice
    /// versa, or values that do not parse.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<(), OptionError> {
        match directive {
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => self.assign(name, value),
        }
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<(), OptionError> {
        match name {
            "expandtab" | "et" => {
                self.tab_inserts_spaces = f(self.tab_inserts_spaces);
                Ok(())
            }
            _ if is_value_option(name) => Err(OptionError::NeedsValue(name.to_string())),
            _ => Err(OptionError::Unknown(name.to_string())),
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        let invalid = || OptionError::InvalidArgument(format!("{name}={value}"));
        match name {
            "gapsize" | "gs" => {
                let n: usize = value.parse().map_err(|_| invalid())?;
                if n == 0 {
                    return Err(invalid());
                }
                self.gap_size = n;
            }
            "padbyte" | "pb" => match value.as_bytes() {
                [b] if b.is_ascii_graphic() || *b == b' ' => self.pad_byte = *b,
                _ => return Err(invalid()),
            },
            "scrolloff" | "so" => {
                self.scroll_off = value.parse().map_err(|_| invalid())?;
            }
            "tabstop" | "ts" => {
                let n: u8 = value.parse().map_err(|_| invalid())?;
                if n == 0 {
                    return Err(invalid());
                }
                self.tab_width = n;
            }
            _ if is_bool_option(name) => return Err(invalid()),
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    /// One-line summary of every option, in directive syntax.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "gapsize={} padbyte={} scrolloff={} {} tabstop={}",
            self.gap_size,
            char::from(self.pad_byte),
            self.scroll_off,
            format_bool("expandtab", self.tab_inserts_spaces),
            self.tab_width,
        )
    }

    /// Bytes inserted for one press of Tab.
    #[must_use]
    pub fn tab_bytes(&self) -> Vec<u8> {
        if self.tab_inserts_spaces {
            vec![b' '; usize::from(self.tab_width)]
        } else {
            vec![b'\t']
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_on_off() {
        assert_eq!(parse_set_arg("expandtab"), SetDirective::On("expandtab".into()));
        assert_eq!(parse_set_arg("noexpandtab"), SetDirective::Off("expandtab".into()));
        assert_eq!(parse_set_arg("noet"), SetDirective::Off("et".into()));
    }

    #[test]
    fn parse_toggle_and_assign() {
        assert_eq!(parse_set_arg("et!"), SetDirective::Toggle("et".into()));
        assert_eq!(
            parse_set_arg("gapsize=128"),
            SetDirective::Assign("gapsize".into(), "128".into())
        );
        assert_eq!(
            parse_set_arg("pb=="),
            SetDirective::Assign("pb".into(), "=".into())
        );
    }

    #[test]
    fn parse_no_prefix_only_for_booleans() {
        assert_eq!(parse_set_arg("nosuch"), SetDirective::On("nosuch".into()));
    }

    #[test]
    fn parse_empty_is_no_directives() {
        assert!(parse_set("   ").is_empty());
    }

    // ── Options ──────────────────────────────────────────────────────────

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.gap_size, INITIAL_GAP_SIZE);
        assert_eq!(o.pad_byte, b' ');
        assert_eq!(o.scroll_off, 0);
        assert!(o.tab_inserts_spaces);
        assert_eq!(o.tab_width, 4);
    }

    #[test]
    fn from_set_str_applies_in_order() {
        let o = Options::from_set_str("gapsize=128 scrolloff=2 noexpandtab ts=8 pb=.").unwrap();
        assert_eq!(o.gap_size, 128);
        assert_eq!(o.scroll_off, 2);
        assert!(!o.tab_inserts_spaces);
        assert_eq!(o.tab_width, 8);
        assert_eq!(o.pad_byte, b'.');
    }

    #[test]
    fn toggle_flips() {
        let o = Options::from_set_str("et!").unwrap();
        assert!(!o.tab_inserts_spaces);
        let o = Options::from_set_str("et! et!").unwrap();
        assert!(o.tab_inserts_spaces);
    }

    #[test]
    fn errors() {
        assert_eq!(
            Options::from_set_str("wrap"),
            Err(OptionError::Unknown("wrap".into()))
        );
        assert_eq!(
            Options::from_set_str("gapsize"),
            Err(OptionError::NeedsValue("gapsize".into()))
        );
        assert!(matches!(
            Options::from_set_str("gapsize=0"),
            Err(OptionError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_set_str("ts=300"),
            Err(OptionError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_set_str("pb=ab"),
            Err(OptionError::InvalidArgument(_))
        ));
        assert!(matches!(
            Options::from_set_str("et=1"),
            Err(OptionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn error_messages() {
        assert_eq!(OptionError::Unknown("x".into()).to_string(), "unknown option: x");
        assert_eq!(
            OptionError::InvalidArgument("so=z".into()).to_string(),
            "invalid argument: so=z"
        );
    }

    #[test]
    fn partial_apply_keeps_earlier_directives() {
        let mut o = Options::default();
        assert!(o.apply_all("so=3 bogus ts=2").is_err());
        assert_eq!(o.scroll_off, 3);
        assert_eq!(o.tab_width, 4);
    }

    #[test]
    fn describe_round_trips() {
        let o = Options::from_set_str("gs=9 so=1 noet ts=2").unwrap();
        let again = Options::from_set_str(&o.describe().replace("padbyte= ", "")).unwrap();
        assert_eq!(again, o);
        assert!(o.describe().contains("noexpandtab"));
    }

    #[test]
    fn tab_bytes() {
        assert_eq!(Options::default().tab_bytes(), b"    ");
        let o = Options::from_set_str("noet").unwrap();
        assert_eq!(o.tab_bytes(), b"\t");
    }

    #[test]
    fn format_bool_on_off() {
        assert_eq!(format_bool("expandtab", true), "expandtab");
        assert_eq!(format_bool("expandtab", false), "noexpandtab");
    }
}
