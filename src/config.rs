//! Keyboard configuration.

/// Options passed to [`Keyboard::init`](crate::state::Keyboard::init).
///
/// ```ignore
/// let options = KeyboardOptions {
///     remember_layout: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardOptions {
    /// Reapply the last chosen layout on the next focus, whatever the field type.
    pub remember_layout: bool,
    /// Compact presentation (single-row key caps, tighter gaps).
    pub compact: bool,
    /// Offer `@` and `_` keys on email-like fields.
    pub alpha_email: bool,
    /// Decimal glyph of the page locale, as produced by formatting `1.1`.
    /// Numeric fields always use `'.'`.
    pub decimal_separator: char,
}

impl Default for KeyboardOptions {
    fn default() -> Self {
        Self {
            remember_layout: true,
            compact: true,
            alpha_email: true,
            decimal_separator: '.',
        }
    }
}
