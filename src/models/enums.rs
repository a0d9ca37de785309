use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The wire string doubles as the serde name of each variant.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(TestStatus {
    Low => "Low",
    Normal => "Normal",
    High => "High",
});

impl TestStatus {
    /// Display colour used by the front-end and every chart.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#3498db",
            Self::Normal => "#2ecc71",
            Self::High => "#e74c3c",
        }
    }

    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

str_enum!(Urgency {
    Routine => "routine",
    Urgent => "urgent",
    Emergency => "emergency",
});

impl Urgency {
    /// Escalates, never downgrades.
    pub fn escalate(self, to: Urgency) -> Urgency {
        if to.rank() > self.rank() {
            to
        } else {
            self
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Routine => 0,
            Self::Urgent => 1,
            Self::Emergency => 2,
        }
    }
}

str_enum!(Priority {
    High => "High",
    Medium => "Medium",
    Low => "Low",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_round_trip() {
        for status in [TestStatus::Low, TestStatus::Normal, TestStatus::High] {
            assert_eq!(TestStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(TestStatus::from_str("low").is_err());
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(TestStatus::Low.color(), "#3498db");
        assert_eq!(TestStatus::Normal.color(), "#2ecc71");
        assert_eq!(TestStatus::High.color(), "#e74c3c");
    }

    #[test]
    fn urgency_serializes_lowercase() {
        let json = serde_json::to_string(&Urgency::Emergency).unwrap();
        assert_eq!(json, "\"emergency\"");
        let parsed: Urgency = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(parsed, Urgency::Urgent);
    }

    #[test]
    fn urgency_never_downgrades() {
        let u = Urgency::Routine.escalate(Urgency::Emergency);
        assert_eq!(u.escalate(Urgency::Urgent), Urgency::Emergency);
    }

    #[test]
    fn invalid_enum_message_names_field() {
        let err = Priority::from_str("urgent").unwrap_err();
        assert_eq!(err.to_string(), "Invalid enum value for Priority: urgent");
    }
}
