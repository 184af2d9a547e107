use super::ApiError;

pub fn validate_id(id: i64, resource: &str) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

pub fn validate_stars(stars: i32) -> Result<i32, ApiError> {
    if !(1..=5).contains(&stars) {
        return Err(ApiError::validation(format!(
            "Invalid rating: {}. Stars must be between 1 and 5",
            stars
        )));
    }
    Ok(stars)
}

pub fn validate_username(name: &str) -> Result<&str, ApiError> {
    if name.len() < 3 || name.len() > 32 {
        return Err(ApiError::validation(
            "Username must be between 3 and 32 characters",
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, digits, hyphens, underscores, and dots",
        ));
    }

    Ok(name)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(password)
}

pub fn validate_body<'a>(body: &'a str, max_len: usize, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{what} cannot be empty")));
    }
    if trimmed.len() > max_len {
        return Err(ApiError::validation(format!(
            "{what} must be {max_len} characters or less"
        )));
    }
    Ok(trimmed)
}
