//! Prompt construction for the image-generation API.

/// Longest summary excerpt (in characters) included in a prompt. Substack
/// summaries can run to whole paragraphs; the model only needs the gist.
const MAX_SUMMARY_CHARS: usize = 200;

/// Build the generation prompt for one entry. An empty summary is treated the
/// same as no summary.
pub fn build_prompt(title: &str, summary: Option<&str>) -> String {
    let mut prompt = format!(
        "Isometric illustration for a tech blog post titled '{title}'. \
         Minimal, clean, modern style, white background."
    );
    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        // Hard cut on character count, not word boundaries.
        let excerpt: String = summary.chars().take(MAX_SUMMARY_CHARS).collect();
        prompt.push_str(" The post is about: ");
        prompt.push_str(&excerpt);
    }
    prompt
}
