use std::fmt;

/// The part of an outbound request that identifies it for retry counting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Derives the key under which retries of this request are counted.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// Identity of a logical request: method and URL.
///
/// The method is compared case-insensitively. Body and query string are not
/// normalised, so two requests that differ only in body share one key while
/// `/a?x=1` and `/a?x=2` do not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    method: String,
    url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.trim().to_ascii_uppercase(),
            url: url.to_owned(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.url)
    }
}

/// Response observed for a request. The body is carried for hooks and
/// callers; retry decisions only look at `status`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub body: String,
}

impl ResponseDescriptor {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestDescriptor, RequestKey};

    #[test]
    fn key_ignores_method_case() {
        assert_eq!(
            RequestDescriptor::new("get", "/api").key(),
            RequestDescriptor::new("GET", "/api").key()
        );
    }

    #[test]
    fn key_distinguishes_methods_and_urls() {
        assert_ne!(
            RequestDescriptor::get("/a").key(),
            RequestDescriptor::post("/a").key()
        );
        assert_ne!(
            RequestDescriptor::get("/a?x=1").key(),
            RequestDescriptor::get("/a?x=2").key()
        );
    }

    #[test]
    fn key_display_joins_method_and_url() {
        assert_eq!(RequestKey::new("post", "/users").to_string(), "POST:/users");
    }
}
