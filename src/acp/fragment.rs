/// Drops the JSON scaffolding of a streamed single-field argument object.
///
/// Fragments are arbitrary substrings of `{"<key>": "<text>"}`, so this only
/// recognises the exact noise shapes a tokenizer tends to emit on their own
/// and forwards everything else verbatim.
#[derive(Debug, Clone)]
pub struct ArgumentFragmentFilter {
    noise: Vec<String>,
}

pub const THOUGHT_KEY: &str = "thought";

impl ArgumentFragmentFilter {
    pub fn new(key: &str) -> Self {
        let noise = vec![
            "{".to_string(),
            "}".to_string(),
            "\"".to_string(),
            ":".to_string(),
            "\\".to_string(),
            key.to_string(),
            format!("{{\"{key}"),
            "\": \"".to_string(),
            "\"}".to_string(),
        ];
        Self { noise }
    }

    pub fn is_noise(&self, fragment: &str) -> bool {
        let stripped = fragment.trim();
        self.noise.iter().any(|n| n == stripped)
    }

    /// The fragment itself when it carries content, `None` for noise or empty input.
    pub fn filter<'a>(&self, fragment: &'a str) -> Option<&'a str> {
        if fragment.is_empty() || self.is_noise(fragment) {
            return None;
        }
        Some(fragment)
    }
}

impl Default for ArgumentFragmentFilter {
    fn default() -> Self {
        Self::new(THOUGHT_KEY)
    }
}
