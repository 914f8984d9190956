//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{CreatePlaylistForm, PlaylistCriteria, RegisterForm};

/// Validate a required text field against its column width
fn validate_text(label: &str, value: &str, max_len: usize) -> Result<(), String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(format!("{} is required", label));
    }

    if value.chars().count() > max_len {
        return Err(format!("{} must be at most {} characters long", label, max_len));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    validate_text("Email", email, 60)?;

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a registration form
pub fn validate_registration(form: &RegisterForm) -> Result<(), String> {
    validate_text("First name", &form.fname, 50)?;
    validate_text("Last name", &form.lname, 50)?;
    validate_email(&form.email)?;

    if form.password.is_empty() {
        return Err("Password is required".to_string());
    }

    if form.password.chars().count() > 50 {
        return Err("Password must be at most 50 characters long".to_string());
    }

    Ok(())
}

/// Parse a danceability bound; the music API scores danceability in `[0, 1]`
pub fn parse_danceability(label: &str, raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} danceability must be a number", label))?;

    if !(0.0..=1.0).contains(&value) {
        return Err(format!(
            "{} danceability must be between 0.0 and 1.0",
            label
        ));
    }

    Ok(value)
}

/// Validate the playlist wizard form and turn it into search criteria
pub fn validate_playlist_form(form: &CreatePlaylistForm) -> Result<PlaylistCriteria, String> {
    validate_text("Genre", &form.genre, 50)?;

    let min_danceability = parse_danceability("Minimum", &form.min_danceability)?;
    let max_danceability = parse_danceability("Maximum", &form.max_danceability)?;

    if min_danceability > max_danceability {
        return Err("Minimum danceability cannot exceed maximum danceability".to_string());
    }

    Ok(PlaylistCriteria {
        // Seed genres are lowercase slugs such as "hip-hop"
        genre: form.genre.trim().to_lowercase(),
        min_danceability,
        max_danceability,
    })
}
