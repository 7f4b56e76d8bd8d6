//! Snippet loader: ask the backend for a named example model.
//!
//! The response body replaces the editor content as-is.

/// Form field carrying the snippet name.
pub const FIELD_SNIPPET: &str = "sel_file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRequest {
    name: String,
}

impl SnippetRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> [(&'static str, &str); 1] {
        [(FIELD_SNIPPET, self.name.as_str())]
    }

    /// New editor content for a response body. No trimming or decoding.
    pub fn editor_text(body: String) -> String {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_posts_the_selected_name() {
        let req = SnippetRequest::new("burglary.blog");
        assert_eq!(req.fields(), [("sel_file", "burglary.blog")]);
        assert_eq!(req.name(), "burglary.blog");
    }

    #[test]
    fn body_is_used_verbatim() {
        let body = "  random Boolean A ~ BooleanDistrib(0.5);\r\nquery A;\n\n".to_string();
        assert_eq!(SnippetRequest::editor_text(body.clone()), body);
    }
}
