use crate::server::response::ApiError;

const MAX_TITLE_LEN: usize = 200;
const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_video_price(price_cents: i64) -> Result<(), ApiError> {
    if price_cents < 0 {
        return Err(ApiError::bad_request("Price cannot be negative"));
    }
    Ok(())
}

pub fn validate_positive_price(price_cents: i64) -> Result<(), ApiError> {
    if price_cents <= 0 {
        return Err(ApiError::bad_request("Price must be positive"));
    }
    Ok(())
}

pub fn validate_video_count(count: i64) -> Result<(), ApiError> {
    if count < 2 {
        return Err(ApiError::bad_request("Bundles must cover at least 2 videos"));
    }
    Ok(())
}

/// Extracts the media identifier from an external video URL: the `v` query
/// parameter when present, otherwise the last path segment.
pub fn extract_media_id(url: &str) -> Result<String, ApiError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::bad_request("Media URL must be http(s)"));
    }

    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some(id) = pair.strip_prefix("v=") {
                if !id.is_empty() {
                    return Ok(id.to_string());
                }
            }
        }
    }

    // Last path segment, e.g. https://youtu.be/<id>. A bare host has no
    // usable segment.
    let after_scheme = path.split_once("://").map(|(_, rest)| rest).unwrap_or("");
    let segment = match after_scheme.split_once('/') {
        Some((_host, rest)) => rest.trim_end_matches('/').rsplit('/').next().unwrap_or(""),
        None => "",
    };
    if segment.is_empty() {
        return Err(ApiError::bad_request("Could not extract media id from URL"));
    }
    Ok(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_id_from_query_param() {
        let id = extract_media_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn media_id_from_path_segment() {
        let id = extract_media_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn media_id_rejects_non_http() {
        assert!(extract_media_id("ftp://example.com/video").is_err());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
