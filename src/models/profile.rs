use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::PosterKind;

/// Account role chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Jobseeker,
    Homeowner,
    Employer,
    Tradesperson,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jobseeker => "jobseeker",
            Self::Homeowner => "homeowner",
            Self::Employer => "employer",
            Self::Tradesperson => "tradesperson",
        }
    }

    /// The poster kind this role maps to, if the role may post jobs at all.
    #[must_use]
    pub const fn poster_kind(self) -> Option<PosterKind> {
        match self {
            Self::Employer => Some(PosterKind::Company),
            Self::Homeowner => Some(PosterKind::Homeowner),
            Self::Jobseeker | Self::Tradesperson => None,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobseeker" => Ok(Self::Jobseeker),
            "homeowner" => Ok(Self::Homeowner),
            "employer" => Ok(Self::Employer),
            "tradesperson" => Ok(Self::Tradesperson),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub role: Role,
    pub display_name: String,
    pub company_name: Option<String>,
    /// Homeowners never carry a nickname; the field stays `None` for them.
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub location: Option<String>,
    pub banned: bool,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing() {
        assert_eq!("employer".parse(), Ok(Role::Employer));
        assert_eq!("homeowner".parse(), Ok(Role::Homeowner));
        assert!("landlord".parse::<Role>().is_err());
    }

    #[test]
    fn poster_kind_mapping() {
        assert_eq!(Role::Employer.poster_kind(), Some(PosterKind::Company));
        assert_eq!(Role::Homeowner.poster_kind(), Some(PosterKind::Homeowner));
        assert_eq!(Role::Jobseeker.poster_kind(), None);
        assert_eq!(Role::Tradesperson.poster_kind(), None);
    }
}
