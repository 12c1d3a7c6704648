use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// No film was released before the first public screening by the Lumière
/// brothers on 1895-12-28.
pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).expect("valid constant date")
}

const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_LOGIN_LEN: usize = 20;

/// MPA rating classification (closed reference set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpaRating {
    pub id: i32,
    pub name: String,
}

/// Film genre tag (closed reference set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// A catalogued film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    /// Identifier assigned by the storage backend on creation
    pub id: i64,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Running time in minutes
    pub duration: i32,
    pub mpa: MpaRating,
    pub genres: Vec<Genre>,
}

impl Film {
    /// Checks the domain constraints that do not need reference data.
    /// Foreign keys (MPA, genres) are validated separately against the
    /// reference collaborator before any write.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("film name must not be blank".to_string()));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::Validation(format!(
                "film description must not exceed {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
        if self.release_date < earliest_release_date() {
            return Err(AppError::Validation(
                "release date must not precede 1895-12-28".to_string(),
            ));
        }
        if self.release_date > Utc::now().date_naive() {
            return Err(AppError::Validation(
                "release date must not be in the future".to_string(),
            ));
        }
        if self.duration <= 0 {
            return Err(AppError::Validation(
                "film duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the storage backend on creation
    pub id: i64,
    pub email: String,
    pub login: String,
    /// Display name; falls back to the login when blank
    pub name: String,
    pub birthday: NaiveDate,
}

impl User {
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("email must not be blank".to_string()));
        }
        if !valid_email_shape(&self.email) {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        if self.login.is_empty() || self.login.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "login must not be blank or contain whitespace".to_string(),
            ));
        }
        if self.login.chars().count() > MAX_LOGIN_LEN {
            return Err(AppError::Validation(format!(
                "login must not exceed {} characters",
                MAX_LOGIN_LEN
            )));
        }
        if self.birthday > Utc::now().date_naive() {
            return Err(AppError::Validation(
                "birthday must not be in the future".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies the display-name default: a blank name becomes the login.
    pub fn normalize(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }
        self
    }
}

fn valid_email_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_film() -> Film {
        Film {
            id: 0,
            name: "The Matrix".to_string(),
            description: "A hacker discovers reality is a simulation".to_string(),
            release_date: NaiveDate::from_ymd_opt(1999, 3, 31).unwrap(),
            duration: 136,
            mpa: MpaRating { id: 4, name: "R".to_string() },
            genres: vec![Genre { id: 6, name: "Action".to_string() }],
        }
    }

    fn sample_user() -> User {
        User {
            id: 0,
            email: "neo@matrix.io".to_string(),
            login: "neo".to_string(),
            name: "Thomas Anderson".to_string(),
            birthday: NaiveDate::from_ymd_opt(1971, 9, 13).unwrap(),
        }
    }

    #[test]
    fn test_valid_film_passes() {
        assert!(sample_film().validate().is_ok());
    }

    #[test]
    fn test_blank_film_name_rejected() {
        let mut film = sample_film();
        film.name = "   ".to_string();
        assert!(film.validate().is_err());
    }

    #[test]
    fn test_overlong_description_rejected() {
        let mut film = sample_film();
        film.description = "x".repeat(201);
        assert!(film.validate().is_err());
    }

    #[test]
    fn test_description_at_limit_accepted() {
        let mut film = sample_film();
        film.description = "x".repeat(200);
        assert!(film.validate().is_ok());
    }

    #[test]
    fn test_release_before_first_screening_rejected() {
        let mut film = sample_film();
        film.release_date = NaiveDate::from_ymd_opt(1895, 12, 27).unwrap();
        assert!(film.validate().is_err());
    }

    #[test]
    fn test_release_on_first_screening_accepted() {
        let mut film = sample_film();
        film.release_date = earliest_release_date();
        assert!(film.validate().is_ok());
    }

    #[test]
    fn test_future_release_rejected() {
        let mut film = sample_film();
        film.release_date = Utc::now().date_naive() + chrono::Days::new(1);
        assert!(film.validate().is_err());
    }

    #[test]
    fn test_nonpositive_duration_rejected() {
        let mut film = sample_film();
        film.duration = 0;
        assert!(film.validate().is_err());
        film.duration = -5;
        assert!(film.validate().is_err());
    }

    #[test]
    fn test_valid_user_passes() {
        assert!(sample_user().validate().is_ok());
    }

    #[test]
    fn test_bad_email_shapes_rejected() {
        for email in ["", "plainaddress", "@nodomain", "nolocal@", "two@@ats"] {
            let mut user = sample_user();
            user.email = email.to_string();
            assert!(user.validate().is_err(), "expected '{}' to be rejected", email);
        }
    }

    #[test]
    fn test_login_with_whitespace_rejected() {
        let mut user = sample_user();
        user.login = "mr anderson".to_string();
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_future_birthday_rejected() {
        let mut user = sample_user();
        user.birthday = Utc::now().date_naive() + chrono::Days::new(1);
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_blank_name_defaults_to_login() {
        let mut user = sample_user();
        user.name = "  ".to_string();
        let user = user.normalize();
        assert_eq!(user.name, "neo");
    }

    #[test]
    fn test_present_name_survives_normalize() {
        let user = sample_user().normalize();
        assert_eq!(user.name, "Thomas Anderson");
    }
}
