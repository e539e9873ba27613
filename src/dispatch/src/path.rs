//! Request path split into resolved and unresolved segments

use crate::signal::ControlSignal;

/// Path of one request
///
/// Segments are consumed strictly left to right, so the resolved and
/// unresolved parts always concatenate to the full original path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestPath {
    segments: Vec<String>,
    consumed: usize,
}

impl RequestPath {
    /// Parse a `/`-separated, percent-encoded path
    ///
    /// Empty segments are skipped, so `/a//b/` reads as `["a", "b"]`.
    pub fn parse(path: &str) -> Result<Self, ControlSignal> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|decoded| decoded.into_owned())
                    .map_err(|_| ControlSignal::BadRequest(format!("invalid path segment '{}'", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_segments(segments))
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self {
            segments,
            consumed: 0,
        }
    }

    pub fn full(&self) -> &[String] {
        &self.segments
    }

    pub fn resolved(&self) -> &[String] {
        &self.segments[..self.consumed]
    }

    pub fn unresolved(&self) -> &[String] {
        &self.segments[self.consumed..]
    }

    /// Next unresolved segment
    pub fn peek(&self) -> Option<&str> {
        self.segments.get(self.consumed).map(String::as_str)
    }

    /// Move the next segment to the resolved part
    pub fn consume(&mut self) -> Option<String> {
        let segment = self.segments.get(self.consumed).cloned()?;
        self.consumed += 1;
        Some(segment)
    }

    /// Move all remaining segments to the resolved part
    pub fn consume_all(&mut self) -> Vec<String> {
        let rest = self.unresolved().to_vec();
        self.consumed = self.segments.len();
        rest
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed == self.segments.len()
    }

    /// URI of the resolved part
    pub fn resolved_uri(&self) -> String {
        uri_of(self.resolved())
    }

    /// URI of the full path
    pub fn uri(&self) -> String {
        uri_of(&self.segments)
    }
}

/// `/`-joined URI of percent-encoded `segments`, `/` when empty
pub fn uri_of(segments: &[String]) -> String {
    let encoded: Vec<_> = segments.iter().map(|s| urlencoding::encode(s)).collect();
    format!("/{}", encoded.join("/"))
}

/// Append `params` to `uri` as a query string
pub fn uri_with_params(uri: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return uri.to_string();
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", uri, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition_holds(path: &RequestPath) -> bool {
        let mut joined = path.resolved().to_vec();
        joined.extend_from_slice(path.unresolved());
        joined == path.full()
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let path = RequestPath::parse("/users//joe/").unwrap();
        assert_eq!(path.full(), &["users".to_string(), "joe".to_string()]);
        assert!(RequestPath::parse("/").unwrap().is_exhausted());
    }

    #[test]
    fn test_parse_decodes_segments() {
        let path = RequestPath::parse("/pages/hello%20world").unwrap();
        assert_eq!(path.full()[1], "hello world");
    }

    #[test]
    fn test_uri_reencodes_segments() {
        let path = RequestPath::parse("/users/a%2Fb/hello%20world").unwrap();
        assert_eq!(path.full()[1], "a/b");
        assert_eq!(path.uri(), "/users/a%2Fb/hello%20world");
        assert_eq!(RequestPath::parse(&path.uri()).unwrap().full(), path.full());
    }

    #[test]
    fn test_parse_rejects_invalid_encoding() {
        let result = RequestPath::parse("/pages/%FF");
        assert!(matches!(result, Err(ControlSignal::BadRequest(_))));
    }

    #[test]
    fn test_partition_invariant_across_steps() {
        let mut path = RequestPath::parse("/_wmi/users/Users/joe").unwrap();
        assert!(partition_holds(&path));

        while path.consume().is_some() {
            assert!(partition_holds(&path));
        }
        assert!(path.is_exhausted());
        assert!(partition_holds(&path));
    }

    #[test]
    fn test_consume_and_peek() {
        let mut path = RequestPath::parse("/_wmi/users/Users").unwrap();
        assert_eq!(path.peek(), Some("_wmi"));
        assert_eq!(path.consume().as_deref(), Some("_wmi"));
        assert_eq!(path.resolved(), &["_wmi".to_string()]);
        assert_eq!(path.unresolved(), &["users".to_string(), "Users".to_string()]);
        assert_eq!(path.resolved_uri(), "/_wmi");

        assert_eq!(path.consume_all(), vec!["users".to_string(), "Users".to_string()]);
        assert!(path.is_exhausted());
        assert_eq!(path.consume(), None);
        assert_eq!(path.uri(), "/_wmi/users/Users");
    }

    #[test]
    fn test_uri_with_params() {
        assert_eq!(uri_with_params("/users", &[]), "/users");
        let params = vec![
            ("search".to_string(), "7".to_string()),
            ("q".to_string(), "a b&c".to_string()),
        ];
        assert_eq!(uri_with_params("/users", &params), "/users?search=7&q=a%20b%26c");
    }
}
