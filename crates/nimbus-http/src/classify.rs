//! Maps failures to the user-facing [`ErrorCategory`] taxonomy.
//!
//! Classification is total: every input yields exactly one category and
//! nothing here can fail.

use std::error::Error as StdError;

use nimbus_core::ErrorCategory;

use crate::error::HttpError;

/// Classify a failed HTTP request.
pub fn classify(error: &HttpError) -> ErrorCategory {
    match error {
        HttpError::Status { status, .. } => classify_status(*status),
        HttpError::Transport(e) => classify_transport(e),
        HttpError::Decode(_) => ErrorCategory::UnknownError,
    }
}

/// Classify an arbitrary error by walking its source chain.
///
/// The first [`HttpError`] or `reqwest::Error` found decides the category;
/// anything else is [`ErrorCategory::UnknownError`].
pub fn classify_error(error: &(dyn StdError + 'static)) -> ErrorCategory {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(e) = current {
        if let Some(category) = classify_known(e) {
            return category;
        }
        current = e.source();
    }
    ErrorCategory::UnknownError
}

/// Classify an `anyhow::Error` by its chain.
pub fn classify_anyhow(error: &anyhow::Error) -> ErrorCategory {
    error
        .chain()
        .find_map(classify_known)
        .unwrap_or(ErrorCategory::UnknownError)
}

fn classify_known(e: &(dyn StdError + 'static)) -> Option<ErrorCategory> {
    if let Some(category) = e.downcast_ref::<ErrorCategory>() {
        return Some(*category);
    }
    if let Some(http) = e.downcast_ref::<HttpError>() {
        return Some(classify(http));
    }
    e.downcast_ref::<reqwest::Error>().map(classify_transport)
}

fn classify_status(status: u16) -> ErrorCategory {
    match status {
        404 => ErrorCategory::CityNotFound,
        401 => ErrorCategory::InvalidCredentials,
        429 => ErrorCategory::RateLimited,
        408 => ErrorCategory::Timeout,
        _ => ErrorCategory::GenericApiError,
    }
}

fn classify_transport(e: &reqwest::Error) -> ErrorCategory {
    if let Some(status) = e.status() {
        return classify_status(status.as_u16());
    }
    if e.is_timeout() {
        ErrorCategory::Timeout
    } else if e.is_decode() {
        ErrorCategory::UnknownError
    } else {
        ErrorCategory::NetworkError
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped: {0}")]
    struct Wrapper(#[source] HttpError);

    #[test]
    fn test_status_table() {
        let cases = [
            (404, ErrorCategory::CityNotFound),
            (401, ErrorCategory::InvalidCredentials),
            (429, ErrorCategory::RateLimited),
            (408, ErrorCategory::Timeout),
            (500, ErrorCategory::GenericApiError),
            (503, ErrorCategory::GenericApiError),
            (400, ErrorCategory::GenericApiError),
        ];
        for (status, expected) in cases {
            assert_eq!(
                classify(&HttpError::status(status, "")),
                expected,
                "status {}",
                status
            );
        }
    }

    #[test]
    fn test_decode_is_unknown() {
        assert_eq!(
            classify(&HttpError::Decode("expected value".into())),
            ErrorCategory::UnknownError
        );
    }

    #[test]
    fn test_arbitrary_error_is_unknown() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(classify_error(&io), ErrorCategory::UnknownError);

        let any = anyhow::anyhow!("something odd");
        assert_eq!(classify_anyhow(&any), ErrorCategory::UnknownError);
    }

    #[test]
    fn test_source_chain_is_walked() {
        let wrapped = Wrapper(HttpError::status(429, "slow down"));
        assert_eq!(classify_error(&wrapped), ErrorCategory::RateLimited);

        let any = anyhow::Error::new(HttpError::status(401, "bad key")).context("fetching");
        assert_eq!(classify_anyhow(&any), ErrorCategory::InvalidCredentials);
    }

    #[test]
    fn test_category_passes_through() {
        let any = anyhow::Error::new(ErrorCategory::InvalidInput);
        assert_eq!(classify_anyhow(&any), ErrorCategory::InvalidInput);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/", port))
            .send()
            .await
            .unwrap_err();
        assert_eq!(classify(&HttpError::Transport(err)), ErrorCategory::NetworkError);
    }
}
