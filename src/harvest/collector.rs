use std::collections::HashSet;

/// Accumulates scraped posts in first-seen order.
///
/// A post is kept only if, after newlines are replaced by spaces, it is
/// longer than `min_chars` characters, contains no `http`, does not start
/// with `@` and has not been collected before.
#[derive(Debug, Clone)]
pub struct PostCollector {
    posts: Vec<String>,
    seen: HashSet<String>,
    min_chars: usize,
}

impl PostCollector {
    pub fn new(min_chars: usize) -> Self {
        Self {
            posts: Vec::new(),
            seen: HashSet::new(),
            min_chars,
        }
    }

    /// Seed with already collected posts, e.g. from a previous run.
    pub fn with_existing(min_chars: usize, existing: Vec<String>) -> Self {
        let mut collector = Self::new(min_chars);
        for post in existing {
            if collector.seen.insert(post.clone()) {
                collector.posts.push(post);
            }
        }
        collector
    }

    pub fn normalize(raw: &str) -> String {
        raw.replace('\n', " ")
    }

    fn qualifies(&self, text: &str) -> bool {
        text.chars().count() > self.min_chars
            && !text.contains("http")
            && !text.starts_with('@')
            && !self.seen.contains(text)
    }

    /// Offer one raw post. Returns the stored text if it was new.
    pub fn offer(&mut self, raw: &str) -> Option<&str> {
        let text = Self::normalize(raw);
        if !self.qualifies(&text) {
            return None;
        }
        self.seen.insert(text.clone());
        self.posts.push(text);
        self.posts.last().map(String::as_str)
    }

    /// Offer a batch, returning how many posts were new.
    pub fn offer_all<I, S>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        batch
            .into_iter()
            .filter(|raw| self.offer(raw.as_ref()).is_some())
            .count()
    }

    pub fn posts(&self) -> &[String] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<String> {
        self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl Default for PostCollector {
    fn default() -> Self {
        Self::new(crate::defaults::MIN_POST_CHARS)
    }
}
