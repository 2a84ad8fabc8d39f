use serde::de::DeserializeOwned;

/// Status code and body of one API call, passed through as the service sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: ResponseBody<T>,
}

/// A response body decoded into the endpoint's type, or the raw text when it did not fit.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody<T> {
    Parsed(T),
    Unparsed { raw: String, reason: String },
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode `raw` as JSON into `T` regardless of status; error pages become `Unparsed`.
    pub fn decode(status: u16, raw: String) -> Self {
        let body = match serde_json::from_str::<T>(&raw) {
            Ok(value) => ResponseBody::Parsed(value),
            Err(e) => ResponseBody::Unparsed {
                raw,
                reason: e.to_string(),
            },
        };
        Self { status, body }
    }
}

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn parsed(&self) -> Option<&T> {
        match &self.body {
            ResponseBody::Parsed(value) => Some(value),
            ResponseBody::Unparsed { .. } => None,
        }
    }

    pub fn into_parsed(self) -> Option<T> {
        match self.body {
            ResponseBody::Parsed(value) => Some(value),
            ResponseBody::Unparsed { .. } => None,
        }
    }

    /// Raw body text, when it did not decode.
    pub fn raw(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Parsed(_) => None,
            ResponseBody::Unparsed { raw, .. } => Some(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pet::{ApiKeyBody, PetList};

    #[test]
    fn test_decode_valid_body() {
        let res = ApiResponse::<ApiKeyBody>::decode(200, r#"{"key":"k1"}"#.into());
        assert!(res.is_ok());
        assert_eq!(res.parsed().map(|b| b.key.as_str()), Some("k1"));
        assert!(res.raw().is_none());
    }

    #[test]
    fn test_decode_error_page_keeps_raw_text() {
        let html = "<title>403 Forbidden</title>".to_string();
        let res = ApiResponse::<PetList>::decode(403, html.clone());
        assert!(!res.is_ok());
        assert!(res.parsed().is_none());
        assert_eq!(res.raw(), Some(html.as_str()));
        match res.body {
            ResponseBody::Unparsed { reason, .. } => assert!(!reason.is_empty()),
            ResponseBody::Parsed(_) => panic!("expected unparsed body"),
        }
    }

    #[test]
    fn test_decode_wrong_shape_on_success_status() {
        // Schema drift shows up as an unparsed body, not as a panic or an error.
        let res = ApiResponse::<PetList>::decode(200, r#"{"items":[]}"#.into());
        assert_eq!(res.status, 200);
        assert!(res.into_parsed().is_none());
    }
}
