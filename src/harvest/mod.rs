//! Scroll-based post harvesting.
//!
//! For each target the page is opened, then read and scrolled in rounds until
//! the scroll budget is spent or several rounds in a row bring nothing new.

#[cfg(feature = "browser")]
pub mod browser;
pub mod collector;
pub mod source;

#[cfg(feature = "browser")]
pub use browser::BrowserPostSource;
pub use collector::PostCollector;
pub use source::{PostSource, Snapshot, SnapshotPostSource};

use crate::config::HarvestConfig;
use crate::error::{ForgeError, Result};
use crate::output::{Reporter, preview};
use rand::Rng;
use std::time::Duration;

/// Loop limits and pacing for one harvest run.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestSettings {
    pub max_scrolls: usize,
    pub stale_rounds_limit: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl HarvestSettings {
    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            max_scrolls: config.max_scrolls,
            stale_rounds_limit: config.stale_rounds_limit,
            min_delay: config.min_delay()?,
            max_delay: config.max_delay()?,
        })
    }

    /// Same limits, no pacing sleeps.
    pub fn without_delay(mut self) -> Self {
        self.min_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self
    }

    fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rng.gen_range(self.min_delay..=self.max_delay)
    }
}

/// Why harvesting of one target ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnd {
    /// All scroll rounds were used.
    Exhausted,
    /// Too many consecutive rounds without new posts.
    Stale,
}

/// Per-target result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub target: String,
    pub rounds: usize,
    pub new_posts: usize,
    pub end: TargetEnd,
}

/// Outcome of a whole run. Collected posts stay in the collector.
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub targets: Vec<TargetSummary>,
    /// Target at which a login wall stopped the run.
    pub login_wall: Option<String>,
    /// Source error that ended the run early.
    pub aborted: Option<String>,
}

impl HarvestReport {
    pub fn completed(&self) -> bool {
        self.login_wall.is_none() && self.aborted.is_none()
    }
}

/// Harvest all targets into `collector`.
///
/// A login wall or a source error stops the run but is not returned as an
/// error: whatever was collected up to that point is kept.
pub async fn harvest<S, R>(
    source: &mut S,
    targets: &[String],
    collector: &mut PostCollector,
    settings: &HarvestSettings,
    rng: &mut R,
    reporter: &Reporter,
) -> HarvestReport
where
    S: PostSource + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = HarvestReport::default();

    for target in targets {
        reporter.info(format!("Opening {}", target));
        match harvest_target(source, target, collector, settings, rng, reporter).await {
            Ok(summary) => {
                if summary.end == TargetEnd::Stale {
                    reporter.detail(format!(
                        "No new posts for {} rounds, moving on",
                        settings.stale_rounds_limit
                    ));
                }
                report.targets.push(summary);
            }
            Err(e @ ForgeError::LoginRequired { .. }) => {
                reporter.error(format!("{}; log in and run again", e));
                report.login_wall = Some(target.clone());
                break;
            }
            Err(e) => {
                reporter.error(format!("Harvest stopped at {}: {}", target, e));
                report.aborted = Some(e.to_string());
                break;
            }
        }
    }

    report
}

/// Fails with `LoginRequired` if the target is behind a login wall.
async fn harvest_target<S, R>(
    source: &mut S,
    target: &str,
    collector: &mut PostCollector,
    settings: &HarvestSettings,
    rng: &mut R,
    reporter: &Reporter,
) -> Result<TargetSummary>
where
    S: PostSource + ?Sized,
    R: Rng + ?Sized,
{
    source.open(target).await?;
    if source.requires_login().await? {
        return Err(ForgeError::LoginRequired {
            target: target.to_string(),
        });
    }

    let mut stale_rounds = 0;
    let mut new_posts = 0;
    let mut rounds = 0;

    while rounds < settings.max_scrolls {
        rounds += 1;
        reporter.debug(format!("Scroll {}/{}", rounds, settings.max_scrolls));

        let mut new_this_round = 0;
        for raw in source.visible_posts().await? {
            if let Some(post) = collector.offer(&raw) {
                reporter.detail(format!("+ {}", preview(post, 20)));
                new_this_round += 1;
            }
        }
        new_posts += new_this_round;

        if new_this_round == 0 {
            stale_rounds += 1;
        } else {
            stale_rounds = 0;
        }
        if stale_rounds >= settings.stale_rounds_limit {
            return Ok(TargetSummary {
                target: target.to_string(),
                rounds,
                new_posts,
                end: TargetEnd::Stale,
            });
        }

        source.scroll().await?;
        let pause = settings.pause(rng);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    Ok(TargetSummary {
        target: target.to_string(),
        rounds,
        new_posts,
        end: TargetEnd::Exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn settings() -> HarvestSettings {
        HarvestSettings::from_config(&HarvestConfig::default())
            .unwrap()
            .without_delay()
    }

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn default_settings_follow_config() {
        let settings = HarvestSettings::from_config(&HarvestConfig::default()).unwrap();
        assert_eq!(settings.max_scrolls, 30);
        assert_eq!(settings.stale_rounds_limit, 3);
        assert_eq!(settings.min_delay, Duration::from_secs(2));
        assert_eq!(settings.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn pause_stays_within_bounds() {
        let settings = HarvestSettings::from_config(&HarvestConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let pause = settings.pause(&mut rng);
            assert!(pause >= settings.min_delay && pause <= settings.max_delay);
        }
    }

    #[tokio::test]
    async fn stops_target_after_three_stale_rounds() {
        let mut source = SnapshotPostSource::default().with_page(
            "a",
            vec![vec!["first post"], vec!["first post", "second post"]],
        );
        let mut collector = PostCollector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = harvest(
            &mut source,
            &targets(&["a"]),
            &mut collector,
            &settings(),
            &mut rng,
            &Reporter::silent(),
        )
        .await;

        assert!(report.completed());
        assert_eq!(report.targets[0].end, TargetEnd::Stale);
        // two productive rounds, then three stale ones
        assert_eq!(report.targets[0].rounds, 5);
        assert_eq!(collector.posts(), ["first post", "second post"]);
    }

    #[tokio::test]
    async fn exhausts_scroll_budget_when_posts_keep_coming() {
        let batches: Vec<Vec<String>> = (0..40)
            .map(|i| vec![format!("post number {}", i)])
            .collect();
        let mut source = SnapshotPostSource::default().with_page(
            "a",
            batches
                .iter()
                .map(|b| b.iter().map(String::as_str).collect())
                .collect(),
        );
        let mut collector = PostCollector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = harvest(
            &mut source,
            &targets(&["a"]),
            &mut collector,
            &settings(),
            &mut rng,
            &Reporter::silent(),
        )
        .await;

        assert_eq!(report.targets[0].end, TargetEnd::Exhausted);
        assert_eq!(report.targets[0].rounds, 30);
        assert_eq!(collector.len(), 30);
        assert_eq!(source.scrolls(), 30);
    }

    #[tokio::test]
    async fn login_wall_stops_remaining_targets() {
        let mut source = SnapshotPostSource::default()
            .with_page("a", vec![vec!["never read"]])
            .with_login_wall();
        let mut collector = PostCollector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = harvest(
            &mut source,
            &targets(&["a", "b"]),
            &mut collector,
            &settings(),
            &mut rng,
            &Reporter::silent(),
        )
        .await;

        assert_eq!(report.login_wall.as_deref(), Some("a"));
        assert!(report.aborted.is_none());
        assert_eq!(source.opened(), ["a"]);
        assert!(collector.is_empty());
    }

    #[tokio::test]
    async fn login_wall_is_reported_as_login_required() {
        let mut source = SnapshotPostSource::default()
            .with_page("a", vec![vec!["never read"]])
            .with_login_wall();
        let mut collector = PostCollector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let result = harvest_target(
            &mut source,
            "a",
            &mut collector,
            &settings(),
            &mut rng,
            &Reporter::silent(),
        )
        .await;

        match result {
            Err(ForgeError::LoginRequired { target }) => assert_eq!(target, "a"),
            other => panic!("Expected LoginRequired, got {:?}", other),
        }
        assert_eq!(source.scrolls(), 0);
    }

    #[tokio::test]
    async fn deduplicates_across_targets() {
        let mut source = SnapshotPostSource::default()
            .with_page("a", vec![vec!["shared post", "only in a"]])
            .with_page("b", vec![vec!["shared post", "only in b"]]);
        let mut collector = PostCollector::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = harvest(
            &mut source,
            &targets(&["a", "b"]),
            &mut collector,
            &settings(),
            &mut rng,
            &Reporter::silent(),
        )
        .await;

        assert_eq!(report.targets.len(), 2);
        assert_eq!(report.targets[1].new_posts, 1);
        assert_eq!(collector.posts(), ["shared post", "only in a", "only in b"]);
    }
}
