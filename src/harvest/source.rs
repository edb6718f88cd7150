use crate::error::{ForgeError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A scrollable page of posts.
///
/// Implementations: [`SnapshotPostSource`] (saved pages, offline) and
/// `BrowserPostSource` (live browser, feature `browser`).
#[async_trait::async_trait]
pub trait PostSource: Send {
    /// Navigate to a target page.
    async fn open(&mut self, target: &str) -> Result<()>;

    /// True if the current page is a login wall.
    async fn requires_login(&mut self) -> Result<bool>;

    /// Text of every post currently rendered on the page.
    async fn visible_posts(&mut self) -> Result<Vec<String>>;

    /// Scroll to the bottom so more posts load.
    async fn scroll(&mut self) -> Result<()>;
}

/// Saved scrape of one or more target pages.
///
/// Each page is a list of batches; batch `i` is what the page shows after
/// `i` scrolls. Once the batches run out the last one stays visible.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub login_required: bool,
    #[serde(default)]
    pub pages: HashMap<String, Vec<Vec<String>>>,
}

/// Replays a [`Snapshot`] through the [`PostSource`] interface.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPostSource {
    snapshot: Snapshot,
    current: Option<String>,
    scrolls: usize,
    opened: Vec<String>,
}

impl SnapshotPostSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }

    /// Load a snapshot JSON file:
    /// `{"login_required": false, "pages": {"<url>": [["post", ...], ...]}}`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&content).map_err(|e| ForgeError::DatasetParse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self::new(snapshot))
    }

    /// Add a page made of the given batches.
    pub fn with_page(mut self, target: &str, batches: Vec<Vec<&str>>) -> Self {
        let batches = batches
            .into_iter()
            .map(|batch| batch.into_iter().map(str::to_string).collect())
            .collect();
        self.snapshot.pages.insert(target.to_string(), batches);
        self
    }

    pub fn with_login_wall(mut self) -> Self {
        self.snapshot.login_required = true;
        self
    }

    /// Targets opened so far, in order.
    pub fn opened(&self) -> &[String] {
        &self.opened
    }

    /// Scrolls performed on the current target.
    pub fn scrolls(&self) -> usize {
        self.scrolls
    }
}

#[async_trait::async_trait]
impl PostSource for SnapshotPostSource {
    async fn open(&mut self, target: &str) -> Result<()> {
        self.current = Some(target.to_string());
        self.scrolls = 0;
        self.opened.push(target.to_string());
        Ok(())
    }

    async fn requires_login(&mut self) -> Result<bool> {
        Ok(self.snapshot.login_required)
    }

    async fn visible_posts(&mut self) -> Result<Vec<String>> {
        let Some(target) = &self.current else {
            return Err(ForgeError::Harvest {
                message: "no page opened".to_string(),
            });
        };
        let batches = self.snapshot.pages.get(target);
        let visible = batches
            .and_then(|b| b.get(self.scrolls.min(b.len().saturating_sub(1))))
            .cloned()
            .unwrap_or_default();
        Ok(visible)
    }

    async fn scroll(&mut self) -> Result<()> {
        self.scrolls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn batches_advance_with_scrolls_and_stick_at_end() {
        let mut source =
            SnapshotPostSource::default().with_page("t", vec![vec!["one"], vec!["two"]]);
        source.open("t").await.unwrap();

        assert_eq!(source.visible_posts().await.unwrap(), vec!["one"]);
        source.scroll().await.unwrap();
        assert_eq!(source.visible_posts().await.unwrap(), vec!["two"]);
        source.scroll().await.unwrap();
        assert_eq!(source.visible_posts().await.unwrap(), vec!["two"]);
    }

    #[tokio::test]
    async fn unknown_target_shows_nothing() {
        let mut source = SnapshotPostSource::default();
        source.open("missing").await.unwrap();
        assert!(source.visible_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reading_before_open_is_an_error() {
        let mut source = SnapshotPostSource::default();
        assert!(source.visible_posts().await.is_err());
    }

    #[tokio::test]
    async fn loads_snapshot_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"{"pages": {"https://x.test/a": [["眠い", "おはよ"]]}}"#,
        )
        .unwrap();

        let mut source = SnapshotPostSource::load(&path).unwrap();
        source.open("https://x.test/a").await.unwrap();

        assert!(!source.requires_login().await.unwrap());
        assert_eq!(source.visible_posts().await.unwrap().len(), 2);
        assert_eq!(source.opened(), ["https://x.test/a"]);
    }

    #[test]
    fn malformed_snapshot_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SnapshotPostSource::load(&path),
            Err(ForgeError::DatasetParse { .. })
        ));
    }
}
