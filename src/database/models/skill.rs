use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Ordered skill mastery. Declaration order is the ordering, both here and in
/// the `proficiency_level` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "proficiency_level", rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    pub const ALL: [Proficiency; 4] = [
        Proficiency::Beginner,
        Proficiency::Intermediate,
        Proficiency::Advanced,
        Proficiency::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Expert => "expert",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Proficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Proficiency::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("'{}' is not a valid proficiency; expected beginner, intermediate, advanced or expert", s)
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub proficiency: Proficiency,
    pub created_at: DateTime<Utc>,
}

impl Skill {
    pub fn new(profile_id: Uuid, name: impl Into<String>, proficiency: Proficiency) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            name: name.into(),
            proficiency,
            created_at: Utc::now(),
        }
    }

    /// Key used for the per-profile name uniqueness rule.
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_is_ordered() {
        assert!(Proficiency::Beginner < Proficiency::Intermediate);
        assert!(Proficiency::Advanced < Proficiency::Expert);
        assert_eq!(Proficiency::ALL.iter().max(), Some(&Proficiency::Expert));
    }

    #[test]
    fn proficiency_parses_case_insensitively() {
        assert_eq!("Advanced".parse::<Proficiency>(), Ok(Proficiency::Advanced));
        assert!("guru".parse::<Proficiency>().is_err());
    }

    #[test]
    fn name_key_ignores_case_and_padding() {
        assert_eq!(Skill::name_key("  Rust "), Skill::name_key("rust"));
    }
}
