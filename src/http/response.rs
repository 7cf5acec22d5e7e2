/// What the client needs to know about an upstream response.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub content_length: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the headers announce an empty body: no content type at all,
    /// or an explicit zero content length.
    pub fn announces_empty_body(&self) -> bool {
        if self.content_type.is_none() {
            return true;
        }
        matches!(
            self.content_length.as_deref().map(|len| len.trim().parse::<u64>()),
            Some(Ok(0))
        )
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}
