//! Livestream audio download and transcription into per-video text files.

use crate::audio::wav::load_wav_file;
use crate::error::{ForgeError, Result};
use crate::exec::CommandExecutor;
use crate::output::Reporter;
use crate::stt::Transcriber;
use std::fs;
use std::path::{Path, PathBuf};

/// Video id of a watch URL: the text after the last `v=`, or the whole URL.
pub fn video_id(url: &str) -> &str {
    url.rsplit("v=").next().unwrap_or(url)
}

/// Transcript file name for a URL, with path separators made safe.
pub fn transcript_file_name(url: &str) -> String {
    let id: String = video_id(url)
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '?' | '*' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{}.txt", id)
}

/// Downloads the audio track of a video as 16 kHz mono WAV.
pub struct AudioFetcher<'a> {
    executor: &'a dyn CommandExecutor,
    downloader: String,
    scratch_dir: PathBuf,
}

impl<'a> AudioFetcher<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, downloader: &str, scratch_dir: PathBuf) -> Self {
        Self {
            executor,
            downloader: downloader.to_string(),
            scratch_dir,
        }
    }

    fn audio_stem(url: &str) -> String {
        transcript_file_name(url).trim_end_matches(".txt").to_string()
    }

    /// Where the audio for `url` ends up.
    pub fn audio_path(&self, url: &str) -> PathBuf {
        self.scratch_dir.join(format!("{}.wav", Self::audio_stem(url)))
    }

    fn args(&self, url: &str) -> Vec<String> {
        let template = self
            .scratch_dir
            .join(format!("{}.%(ext)s", Self::audio_stem(url)));
        vec![
            "-f".to_string(),
            "bestaudio/best".to_string(),
            "-x".to_string(),
            "--audio-format".to_string(),
            "wav".to_string(),
            "--postprocessor-args".to_string(),
            "ffmpeg:-ar 16000 -ac 1".to_string(),
            "--quiet".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            template.display().to_string(),
            url.to_string(),
        ]
    }

    /// Download `url` and return the path of the WAV file.
    pub fn fetch(&self, url: &str) -> Result<PathBuf> {
        let download_error = |message: String| ForgeError::AudioDownload {
            url: url.to_string(),
            message,
        };

        fs::create_dir_all(&self.scratch_dir)?;
        let args = self.args(url);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.executor
            .execute(&self.downloader, &arg_refs)
            .map_err(|e| download_error(e.to_string()))?;

        let path = self.audio_path(url);
        if !path.exists() {
            return Err(download_error(format!(
                "{} finished but {} was not created",
                self.downloader,
                path.display()
            )));
        }
        Ok(path)
    }
}

/// Write trimmed segments longer than `min_chars` characters, one per line.
///
/// Returns the number of lines written.
pub fn write_transcript(path: &Path, segments: &[String], min_chars: usize) -> Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let lines: Vec<&str> = segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| s.chars().count() > min_chars)
        .collect();
    let mut content = String::new();
    for line in &lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(lines.len())
}

/// One successfully transcribed video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFile {
    pub url: String,
    pub path: PathBuf,
    pub lines: usize,
}

#[derive(Debug, Default)]
pub struct TranscribeReport {
    pub written: Vec<TranscriptFile>,
    pub failed: Vec<(String, ForgeError)>,
}

/// Download, transcribe and write every URL. Per-URL failures are reported
/// and skipped.
pub fn transcribe_urls(
    urls: &[String],
    fetcher: &AudioFetcher<'_>,
    transcriber: &dyn Transcriber,
    out_dir: &Path,
    min_segment_chars: usize,
    reporter: &Reporter,
) -> Result<TranscribeReport> {
    fs::create_dir_all(out_dir)?;
    let mut report = TranscribeReport::default();

    for (index, url) in urls.iter().enumerate() {
        reporter.info(format!("[{}/{}] {}", index + 1, urls.len(), url));
        match transcribe_one(url, fetcher, transcriber, out_dir, min_segment_chars, reporter) {
            Ok(file) => {
                reporter.detail(format!(
                    "Saved {} lines to {}",
                    file.lines,
                    file.path.display()
                ));
                report.written.push(file);
            }
            Err(e) => {
                reporter.warn(format!("Skipping {}: {}", url, e));
                report.failed.push((url.clone(), e));
            }
        }
    }

    Ok(report)
}

fn transcribe_one(
    url: &str,
    fetcher: &AudioFetcher<'_>,
    transcriber: &dyn Transcriber,
    out_dir: &Path,
    min_segment_chars: usize,
    reporter: &Reporter,
) -> Result<TranscriptFile> {
    let audio_path = fetcher.fetch(url)?;
    reporter.debug(format!("Audio at {}", audio_path.display()));

    let result = load_wav_file(&audio_path).and_then(|samples| {
        reporter.detail(format!(
            "Transcribing {:.0}s of audio with {}",
            samples.len() as f64 / f64::from(crate::defaults::SAMPLE_RATE),
            transcriber.model_name()
        ));
        transcriber.transcribe(&samples)
    });

    if let Err(e) = fs::remove_file(&audio_path) {
        reporter.debug(format!("Could not remove {}: {}", audio_path.display(), e));
    }

    let segments = result?;
    let path = out_dir.join(transcript_file_name(url));
    let lines = write_transcript(&path, &segments, min_segment_chars)?;
    Ok(TranscriptFile {
        url: url.to_string(),
        path,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandExecutor;
    use crate::stt::MockTranscriber;
    use tempfile::TempDir;

    fn write_silence(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..1600 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn video_id_takes_text_after_last_marker() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=Rhb8ORhO2wg"),
            "Rhb8ORhO2wg"
        );
        assert_eq!(video_id("https://x.test/watch?v=a&v=b"), "b");
    }

    #[test]
    fn video_id_without_marker_is_whole_url() {
        assert_eq!(video_id("https://youtu.be/abc"), "https://youtu.be/abc");
        assert_eq!(
            transcript_file_name("https://youtu.be/abc"),
            "https___youtu.be_abc.txt"
        );
    }

    #[test]
    fn writes_only_long_trimmed_segments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/vid.txt");
        let segments = vec![
            "  今日は雑談配信です  ".to_string(),
            "はい".to_string(),
            "12345".to_string(),
            "123456".to_string(),
        ];

        let lines = write_transcript(&path, &segments, 5).unwrap();

        assert_eq!(lines, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "今日は雑談配信です\n123456\n"
        );
    }

    #[test]
    fn fetch_passes_downloader_arguments() {
        let dir = TempDir::new().unwrap();
        let executor = MockCommandExecutor::new();
        let fetcher = AudioFetcher::new(&executor, "yt-dlp", dir.path().to_path_buf());
        let url = "https://www.youtube.com/watch?v=abc123";
        write_silence(&fetcher.audio_path(url));

        let path = fetcher.fetch(url).unwrap();

        assert_eq!(path, dir.path().join("abc123.wav"));
        let calls = executor.calls();
        assert_eq!(calls[0].command, "yt-dlp");
        assert_eq!(calls[0].args.last().map(String::as_str), Some(url));
        assert!(calls[0].args.contains(&"bestaudio/best".to_string()));
        assert!(calls[0].args.contains(&"ffmpeg:-ar 16000 -ac 1".to_string()));
    }

    #[test]
    fn fetch_without_output_file_is_download_error() {
        let dir = TempDir::new().unwrap();
        let executor = MockCommandExecutor::new();
        let fetcher = AudioFetcher::new(&executor, "yt-dlp", dir.path().to_path_buf());

        let result = fetcher.fetch("https://www.youtube.com/watch?v=missing");

        assert!(matches!(result, Err(ForgeError::AudioDownload { .. })));
    }

    #[test]
    fn failed_download_is_skipped_and_rest_continue() {
        let dir = TempDir::new().unwrap();
        let scratch = dir.path().join("scratch");
        let out = dir.path().join("transcripts");
        let executor = MockCommandExecutor::new().failing_on("v=broken");
        let fetcher = AudioFetcher::new(&executor, "yt-dlp", scratch);
        let transcriber =
            MockTranscriber::new("mock").with_segments(&["短い", "今日もゲームするよー"]);
        let urls = vec![
            "https://www.youtube.com/watch?v=broken".to_string(),
            "https://www.youtube.com/watch?v=good".to_string(),
        ];
        write_silence(&fetcher.audio_path(&urls[1]));

        let report = transcribe_urls(
            &urls,
            &fetcher,
            &transcriber,
            &out,
            5,
            &Reporter::silent(),
        )
        .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, urls[0]);
        assert_eq!(report.written.len(), 1);
        assert_eq!(report.written[0].lines, 1);
        assert_eq!(
            fs::read_to_string(out.join("good.txt")).unwrap(),
            "今日もゲームするよー\n"
        );
        assert!(!fetcher.audio_path(&urls[1]).exists());
    }

    #[test]
    fn transcription_failure_removes_audio_and_skips() {
        let dir = TempDir::new().unwrap();
        let executor = MockCommandExecutor::new();
        let fetcher = AudioFetcher::new(&executor, "yt-dlp", dir.path().join("scratch"));
        let urls = vec!["https://www.youtube.com/watch?v=vid".to_string()];
        write_silence(&fetcher.audio_path(&urls[0]));

        let report = transcribe_urls(
            &urls,
            &fetcher,
            &MockTranscriber::new("mock").with_failure(),
            &dir.path().join("out"),
            5,
            &Reporter::silent(),
        )
        .unwrap();

        assert!(report.written.is_empty());
        assert!(matches!(
            report.failed[0].1,
            ForgeError::TranscriptionInferenceFailed { .. }
        ));
        assert!(!fetcher.audio_path(&urls[0]).exists());
    }
}
