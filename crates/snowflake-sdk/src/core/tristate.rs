//! Three-valued optional field for update options.

/// An update field that can be left alone, cleared, or set.
///
/// `Clear` and `Set(T)` are distinct requests: `Set(String::new())` sets an
/// empty value, while `Clear` unsets the property entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tristate<T> {
    /// Leave the property unchanged.
    #[default]
    Unspecified,
    /// Unset the property.
    Clear,
    /// Set the property to a value.
    Set(T),
}

impl<T> Tristate<T> {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Tristate::Unspecified)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Tristate::Clear)
    }

    /// The value, when one is being set.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Tristate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<T> for Tristate<T> {
    fn from(value: T) -> Self {
        Tristate::Set(value)
    }
}

impl From<&str> for Tristate<String> {
    fn from(value: &str) -> Self {
        Tristate::Set(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unspecified() {
        let t: Tristate<String> = Tristate::default();
        assert!(t.is_unspecified());
        assert!(t.as_set().is_none());
    }

    #[test]
    fn test_set_empty_is_not_clear() {
        let t: Tristate<String> = "".into();
        assert!(!t.is_clear());
        assert_eq!(t.as_set().map(String::as_str), Some(""));
    }

    #[test]
    fn test_clear() {
        let t: Tristate<i32> = Tristate::Clear;
        assert!(t.is_clear());
        assert!(t.as_set().is_none());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Tristate::from(7), Tristate::Set(7));
    }
}
