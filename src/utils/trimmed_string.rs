use std::fmt::Display;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimmedString(String);

impl TrimmedString {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn non_empty(self) -> Option<TrimmedString> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<String> for TrimmedString {
    fn from(value: String) -> Self {
        TrimmedString::from(value.as_str())
    }
}

impl From<&str> for TrimmedString {
    fn from(value: &str) -> Self {
        TrimmedString(value.trim().to_owned())
    }
}

impl From<TrimmedString> for String {
    fn from(value: TrimmedString) -> Self {
        value.0
    }
}

impl Display for TrimmedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrimmedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::TrimmedString;

    #[test]
    fn untrimmed() {
        assert_eq!(
            TrimmedString::from("  Team  \t Rocket   ").as_ref(),
            "Team  \t Rocket"
        );
    }

    #[test]
    fn blank_is_empty() {
        assert!(TrimmedString::from(" \t\n").non_empty().is_none());
        assert_eq!(
            TrimmedString::from(" AB12 ".to_owned()).non_empty(),
            Some(TrimmedString::from("AB12"))
        );
    }
}
