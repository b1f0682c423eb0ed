use std::{fmt, net::IpAddr};

/// What the user asked to run on, as given with `-t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    None,
    IpAddress(String),
    Identifier(String),
}

impl TargetSpec {
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
            return TargetSpec::None;
        };
        if is_ip_literal(value) {
            TargetSpec::IpAddress(value.to_string())
        } else {
            TargetSpec::Identifier(value.to_string())
        }
    }

    /// The raw requested value, if any.
    pub fn requested(&self) -> Option<&str> {
        match self {
            TargetSpec::None => None,
            TargetSpec::IpAddress(value) | TargetSpec::Identifier(value) => Some(value),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.requested().unwrap_or("<none>"))
    }
}

pub fn is_ip_literal(value: &str) -> bool {
    value.trim().parse::<IpAddr>().is_ok()
}
