use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr + string-form serde.
/// Serde goes through the wire strings so persisted and API JSON use the
/// exact enum vocabulary ("low", "very-severe", "urgent-care", ...).
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Severity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(Urgency {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(RecommendationType {
    Medication => "medication",
    Lifestyle => "lifestyle",
    Medical => "medical",
});

str_enum!(DurationBucket {
    LessThanDay => "less-than-day",
    OneToThreeDays => "1-3-days",
    FourToSevenDays => "4-7-days",
    OneToTwoWeeks => "1-2-weeks",
    MoreThanTwoWeeks => "more-than-2-weeks",
});

str_enum!(SeverityBucket {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    VerySevere => "very-severe",
});

str_enum!(FacilityType {
    Hospital => "hospital",
    Clinic => "clinic",
    UrgentCare => "urgent-care",
});

str_enum!(Availability {
    Open => "open",
    Closed => "closed",
    Unknown => "unknown",
});
