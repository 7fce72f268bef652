//! Socket address construction.

use url::Url;

use crate::error::ClientError;

/// Build the socket address for `token` from a page origin.
///
/// `http` becomes `ws` and `https` becomes `wss`; socket schemes are kept.
/// The origin's own path, query and fragment are discarded.
pub fn endpoint_url(origin: &str, path: &str, token: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(origin)
        .map_err(|e| ClientError::InvalidOrigin(format!("{}: {}", origin, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::UnsupportedScheme(url.scheme().to_string()))?;

    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("token", token);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_origin() {
        let url = endpoint_url("http://tasks.example.com", "/ws", "42").unwrap();
        assert_eq!(url.as_str(), "ws://tasks.example.com/ws?token=42");
    }

    #[test]
    fn test_https_origin_with_port() {
        let url = endpoint_url("https://localhost:3000", "/ws", "7").unwrap();
        assert_eq!(url.as_str(), "wss://localhost:3000/ws?token=7");
    }

    #[test]
    fn test_socket_origin_kept() {
        let url = endpoint_url("wss://tasks.example.com", "/ws", "1").unwrap();
        assert_eq!(url.scheme(), "wss");
    }

    #[test]
    fn test_origin_path_and_query_replaced() {
        let url = endpoint_url("http://tasks.example.com/board?tab=2#top", "/ws", "3").unwrap();
        assert_eq!(url.as_str(), "ws://tasks.example.com/ws?token=3");
    }

    #[test]
    fn test_token_is_encoded() {
        let url = endpoint_url("http://h", "/ws", "a b&c").unwrap();
        assert_eq!(url.query(), Some("token=a+b%26c"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = endpoint_url("ftp://files.example.com", "/ws", "1").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedScheme(s) if s == "ftp"));
    }

    #[test]
    fn test_invalid_origin() {
        let err = endpoint_url("not a url", "/ws", "1").unwrap_err();
        assert!(matches!(err, ClientError::InvalidOrigin(_)));
    }
}
