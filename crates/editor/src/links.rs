//! Share links for a page.

/// The two links a page owner hands out.
///
/// Anyone holding the edit link can mutate the page, so it must only be
/// shown to whoever created the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub public_url: String,
    pub edit_url: String,
}

impl ShareLinks {
    /// `base` is the site origin, e.g. `https://hotspots.example.com`.
    pub fn new(base: &str, slug: &str, edit_token: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            public_url: format!("{base}/{slug}"),
            edit_url: format!("{base}/edit/{slug}?token={edit_token}"),
        }
    }
}

/// Pull the edit token out of an edit link's query string.
pub fn token_from_edit_url(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
}
