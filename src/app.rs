//! Pipeline stage entry points.
//!
//! Each `run_*` function applies CLI overrides to the loaded configuration,
//! runs one stage and prints its summary:
//! harvest → transcribe → synthesize → clean → train → evaluate

use crate::cli::{
    CleanArgs, EvaluateArgs, HarvestArgs, SynthesizeArgs, TrainArgs, TranscribeArgs,
};
use crate::config::Config;
use crate::dataset::{
    Blacklist, CleanReport, SynthesisReport, Synthesizer, TranscriptPairs, clean, load_examples,
    load_posts, pair_transcripts, save_examples, save_posts,
};
use crate::error::{ForgeError, Result};
use crate::eval::{CommandBackend, EvalEntry, Evaluator, GenerationParams, render_report};
use crate::exec::CommandExecutor;
use crate::harvest::{
    HarvestReport, HarvestSettings, PostCollector, SnapshotPostSource, harvest,
};
use crate::output::{Reporter, preview};
use crate::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
use crate::train::{self, TrainingPlan};
use crate::transcribe::{AudioFetcher, TranscribeReport, transcribe_urls};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Scrape posts from the configured targets (or a snapshot) into the post file.
///
/// Whatever was collected is written even when a login wall or source error
/// stopped the run early.
pub async fn run_harvest(
    config: Config,
    args: HarvestArgs,
    reporter: &Reporter,
) -> Result<HarvestReport> {
    let output = args.output.unwrap_or(config.paths.posts_file.clone());
    let targets = if args.targets.is_empty() {
        config.harvest.targets.clone()
    } else {
        args.targets
    };
    if targets.is_empty() {
        reporter.info("No harvest targets configured, nothing to do");
        return Ok(HarvestReport::default());
    }

    let mut settings = HarvestSettings::from_config(&config.harvest)?;
    if args.no_delay {
        settings = settings.without_delay();
    }

    let existing = if args.append && output.exists() {
        load_posts(&output)?
    } else {
        Vec::new()
    };
    let mut collector = PostCollector::with_existing(config.harvest.min_post_chars, existing);
    let previously = collector.len();
    let mut rng = StdRng::from_entropy();

    let report = match args.snapshot {
        Some(path) => {
            reporter.info(format!("Replaying snapshot {}", path.display()));
            let mut source = SnapshotPostSource::load(&path)?;
            harvest(
                &mut source,
                &targets,
                &mut collector,
                &settings,
                &mut rng,
                reporter,
            )
            .await
        }
        None => {
            harvest_in_browser(
                &config,
                &targets,
                &mut collector,
                &settings,
                &mut rng,
                reporter,
            )
            .await?
        }
    };

    let added = collector.len() - previously;
    save_posts(&output, collector.posts())?;
    reporter.summary(
        "Harvest",
        &[
            ("Targets visited", report.targets.len().to_string()),
            ("New posts", added.to_string()),
            ("Total posts", collector.len().to_string()),
            ("Saved to", output.display().to_string()),
        ],
    );
    if report.completed() {
        reporter.success("Harvest complete");
    } else {
        reporter.warn("Harvest ended early; partial results were saved");
    }
    Ok(report)
}

#[cfg(feature = "browser")]
async fn harvest_in_browser(
    config: &Config,
    targets: &[String],
    collector: &mut PostCollector,
    settings: &HarvestSettings,
    rng: &mut StdRng,
    reporter: &Reporter,
) -> Result<HarvestReport> {
    use crate::harvest::BrowserPostSource;
    use tokio::io::{AsyncBufReadExt, BufReader};

    reporter.info("Launching browser...");
    let mut source = BrowserPostSource::launch(&config.harvest).await?;

    eprintln!();
    eprintln!("A browser window is open at {}.", config.harvest.login_url);
    eprintln!("Log in there if needed, then press Enter here to start harvesting.");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;

    let report = harvest(&mut source, targets, collector, settings, rng, reporter).await;
    if let Err(e) = source.close().await {
        reporter.debug(format!("Browser did not close cleanly: {}", e));
    }
    Ok(report)
}

#[cfg(not(feature = "browser"))]
async fn harvest_in_browser(
    _config: &Config,
    _targets: &[String],
    _collector: &mut PostCollector,
    _settings: &HarvestSettings,
    _rng: &mut StdRng,
    _reporter: &Reporter,
) -> Result<HarvestReport> {
    Err(ForgeError::Harvest {
        message: "built without the browser feature; pass --snapshot or rebuild with \
                  --features browser"
            .to_string(),
    })
}

/// Download and transcribe every URL with whisper.
pub fn run_transcribe(
    mut config: Config,
    args: TranscribeArgs,
    executor: &dyn CommandExecutor,
    reporter: &Reporter,
) -> Result<TranscribeReport> {
    if let Some(model) = args.model {
        config.transcribe.model_path = model;
    }
    if let Some(language) = args.language {
        config.transcribe.language = language;
    }
    if args.threads.is_some() {
        config.transcribe.threads = args.threads;
    }
    if let Some(dir) = args.output_dir {
        config.paths.transcript_dir = dir;
    }
    let urls = if args.urls.is_empty() {
        config.transcribe.urls.clone()
    } else {
        args.urls
    };
    if urls.is_empty() {
        reporter.info("No video URLs given or configured, nothing to do");
        return Ok(TranscribeReport::default());
    }

    if !cfg!(feature = "whisper") {
        return Err(ForgeError::TranscriptionInferenceFailed {
            message: "built without the whisper feature; rebuild with --features whisper"
                .to_string(),
        });
    }

    reporter.info(format!(
        "Loading whisper model {}",
        config.transcribe.model_path.display()
    ));
    let transcriber = WhisperTranscriber::new(WhisperConfig::from(&config.transcribe))?;
    transcribe_with(&config, &urls, executor, &transcriber, reporter)
}

/// Transcribe `urls` with an already loaded transcriber.
pub fn transcribe_with(
    config: &Config,
    urls: &[String],
    executor: &dyn CommandExecutor,
    transcriber: &dyn Transcriber,
    reporter: &Reporter,
) -> Result<TranscribeReport> {
    let fetcher = AudioFetcher::new(
        executor,
        &config.transcribe.downloader,
        config.paths.work_dir.join("audio"),
    );
    let report = transcribe_urls(
        urls,
        &fetcher,
        transcriber,
        &config.paths.transcript_dir,
        config.transcribe.min_segment_chars,
        reporter,
    )?;

    let lines: usize = report.written.iter().map(|f| f.lines).sum();
    reporter.summary(
        "Transcription",
        &[
            ("Videos", urls.len().to_string()),
            ("Transcribed", report.written.len().to_string()),
            ("Failed", report.failed.len().to_string()),
            ("Lines written", lines.to_string()),
            ("Output dir", config.paths.transcript_dir.display().to_string()),
        ],
    );
    Ok(report)
}

fn load_transcript_pairs(
    config: &Config,
    dir: &Path,
    reporter: &Reporter,
) -> Result<TranscriptPairs> {
    if !dir.is_dir() {
        reporter.info(format!(
            "Transcript directory {} not found, skipping transcripts",
            dir.display()
        ));
        return Ok(TranscriptPairs::default());
    }
    let pairs = pair_transcripts(
        dir,
        &config.persona.system_prompt,
        config.dataset.min_transcript_line_chars,
    )?;
    for (path, e) in &pairs.skipped {
        reporter.warn(format!("Skipping {}: {}", path.display(), e));
    }
    reporter.detail(format!(
        "{} transcript files, {} pairs",
        pairs.files_read,
        pairs.examples.len()
    ));
    Ok(pairs)
}

fn load_post_source(path: &Path, reporter: &Reporter) -> Vec<String> {
    if !path.exists() {
        reporter.info(format!(
            "Post file {} not found, skipping posts",
            path.display()
        ));
        return Vec::new();
    }
    match load_posts(path) {
        Ok(posts) => posts,
        Err(e) => {
            reporter.warn(format!("Ignoring post file: {}", e));
            Vec::new()
        }
    }
}

/// Build the training set from transcripts, posts and the persona rules.
pub fn run_synthesize(
    config: Config,
    args: SynthesizeArgs,
    reporter: &Reporter,
) -> Result<SynthesisReport> {
    let transcript_dir = args.transcripts.unwrap_or(config.paths.transcript_dir.clone());
    let posts_file = args.posts.unwrap_or(config.paths.posts_file.clone());
    let output = args.output.unwrap_or(config.paths.dataset_file.clone());
    let max_examples = args.max_examples.unwrap_or(config.dataset.max_examples);

    let pairs = load_transcript_pairs(&config, &transcript_dir, reporter)?;
    let posts = load_post_source(&posts_file, reporter);

    let mut rng = seeded_rng(args.seed);
    let synthesizer = Synthesizer::new(&config.persona, max_examples);
    let (dataset, report) = synthesizer.synthesize(pairs.examples, &posts, &mut rng)?;

    save_examples(&output, &dataset)?;
    reporter.summary(
        "Synthesis",
        &[
            ("Transcript pairs", report.transcript_pairs.to_string()),
            ("Post pairs", report.post_pairs.to_string()),
            ("Rule pairs", report.rule_pairs.to_string()),
            ("Total", report.total.to_string()),
            ("Kept", report.kept.to_string()),
            ("Saved to", output.display().to_string()),
        ],
    );
    if report.truncated() {
        reporter.detail(format!(
            "Truncated to {} of {} examples",
            report.kept, report.total
        ));
    }
    reporter.success(format!("Wrote {} examples", report.kept));
    Ok(report)
}

/// Filter a training file through the blacklist. Returns `None` if the input
/// file does not exist.
pub fn run_clean(
    config: Config,
    args: CleanArgs,
    reporter: &Reporter,
) -> Result<Option<CleanReport>> {
    let input = args.input.unwrap_or(config.paths.dataset_file.clone());
    let output = args.output.unwrap_or(config.paths.clean_dataset_file.clone());

    if !input.exists() {
        reporter.info(format!("{} not found, nothing to clean", input.display()));
        return Ok(None);
    }

    let examples = load_examples(&input)?;
    let blacklist = Blacklist::new(
        config.dataset.blacklist.clone(),
        config.dataset.min_response_chars,
    );
    let outcome = clean(examples, &blacklist);

    if reporter.shows_detail() {
        for (example, rejection) in &outcome.removed {
            reporter.detail(format!(
                "removed ({}): {}",
                rejection,
                preview(&example.output, 40)
            ));
        }
    }

    save_examples(&output, &outcome.kept)?;
    let report = outcome.report();
    reporter.summary(
        "Clean",
        &[
            ("Original", report.original.to_string()),
            ("Kept", report.kept.to_string()),
            ("Removed", report.removed.to_string()),
            ("Saved to", output.display().to_string()),
        ],
    );
    Ok(Some(report))
}

/// Write the training text and plan, then run the trainer unless `dry_run`.
/// Returns `None` if there is nothing to train on.
pub fn run_train(
    mut config: Config,
    args: TrainArgs,
    executor: &dyn CommandExecutor,
    reporter: &Reporter,
) -> Result<Option<TrainingPlan>> {
    let input = args.input.unwrap_or(config.paths.clean_dataset_file.clone());
    let work_dir = args.work_dir.unwrap_or(config.paths.work_dir.clone());
    let adapter_dir = args.adapter_dir.unwrap_or(config.paths.adapter_dir.clone());
    if let Some(epochs) = args.epochs {
        config.train.epochs = epochs;
    }

    if !input.exists() {
        reporter.info(format!("{} not found, nothing to train on", input.display()));
        return Ok(None);
    }
    let examples = load_examples(&input)?;
    if examples.is_empty() {
        reporter.warn(format!("{} has no examples, not training", input.display()));
        return Ok(None);
    }

    let run = train::prepare(&examples, &config.train, &work_dir, &adapter_dir)?;
    reporter.summary(
        "Training plan",
        &[
            ("Base model", run.plan.base_model.clone()),
            ("Examples", run.plan.num_examples.to_string()),
            ("Effective batch", run.plan.effective_batch_size().to_string()),
            ("Steps per epoch", run.plan.steps_per_epoch.to_string()),
            ("Total steps", run.plan.total_steps.to_string()),
            ("Plan", run.plan_path.display().to_string()),
            ("Adapters", adapter_dir.display().to_string()),
        ],
    );

    if args.dry_run {
        reporter.info("Dry run: trainer not started");
        return Ok(Some(run.plan));
    }

    reporter.info(format!("Starting {}", config.train.trainer_command));
    train::launch(executor, &config.train, &run.plan_path)?;
    reporter.success(format!("Adapters saved to {}", adapter_dir.display()));
    Ok(Some(run.plan))
}

/// Ask every configured question and write the Q/A report. Returns `None` if
/// the adapter directory does not exist.
pub fn run_evaluate(
    config: Config,
    args: EvaluateArgs,
    executor: &dyn CommandExecutor,
    reporter: &Reporter,
) -> Result<Option<Vec<EvalEntry>>> {
    let adapter_dir = args.adapter_dir.unwrap_or(config.paths.adapter_dir.clone());
    let output = args.output.unwrap_or(config.paths.report_file.clone());

    if !adapter_dir.exists() {
        reporter.info(format!(
            "Adapter directory {} not found, train first",
            adapter_dir.display()
        ));
        return Ok(None);
    }
    let questions = &config.eval.questions;
    if questions.is_empty() {
        reporter.info("No evaluation questions configured, nothing to do");
        return Ok(None);
    }

    let backend = CommandBackend::new(
        executor,
        &config.eval.inference_command,
        config.eval.inference_args.clone(),
        adapter_dir,
    );
    let evaluator = Evaluator::new(
        &backend,
        &config.eval.system_prompt,
        GenerationParams::from(&config.eval),
    );

    let total = questions.len();
    let entries = evaluator.run(questions, |index, entry| {
        reporter.info(format!("[{}/{}] {}", index + 1, total, entry.question));
        reporter.detail(&entry.answer);
    })?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, render_report(&entries))?;
    reporter.success(format!(
        "Report with {} answers saved to {}",
        entries.len(),
        output.display()
    ));
    Ok(Some(entries))
}
