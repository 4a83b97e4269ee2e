use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{AutosubError, Result};

/// Shape of a SubRip document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrtSummary {
    pub cues: usize,
    /// End of the last cue, in seconds
    pub last_end: f64,
}

/// Check that `content` is SubRip with at least one timed cue
pub fn summarize_srt(content: &str) -> Result<SrtSummary> {
    let mut cues = 0;
    let mut last_end: f64 = 0.0;

    for line in content.lines() {
        let Some((start, end)) = line.split_once("-->") else {
            continue;
        };

        match (parse_srt_time(start.trim()), parse_srt_time(end.trim())) {
            (Some(_), Some(end)) => {
                cues += 1;
                last_end = last_end.max(end);
            }
            _ => {
                return Err(AutosubError::UnsupportedFormat(format!(
                    "Invalid SubRip timing line: {}",
                    line.trim()
                )))
            }
        }
    }

    if cues == 0 {
        return Err(AutosubError::UnsupportedFormat(
            "No SubRip cues found".to_string(),
        ));
    }

    Ok(SrtSummary { cues, last_end })
}

/// Write a SubRip document after checking its shape
pub async fn write_srt<P: AsRef<Path>>(content: &str, output_path: P) -> Result<SrtSummary> {
    let output_path = output_path.as_ref();
    let summary = summarize_srt(content)?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(output_path, content).await?;

    info!(
        "SRT file written: {} ({} cues, ends at {})",
        output_path.display(),
        summary.cues,
        format_srt_time(summary.last_end)
    );
    Ok(summary)
}

/// Parse SRT time format (HH:MM:SS,mmm) into seconds
fn parse_srt_time(time: &str) -> Option<f64> {
    let (clock, millis) = time.split_once(',')?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let secs: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;

    Some((hours * 3600 + minutes * 60 + secs) as f64 + millis as f64 / 1000.0)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:01:05,123 --> 00:01:07,000\nWorld\n";

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_parse_srt_time() {
        assert_eq!(parse_srt_time("01:01:01,500"), Some(3661.5));
        assert_eq!(parse_srt_time("00:00:01.000"), None);
        assert_eq!(parse_srt_time("1:2"), None);
    }

    #[test]
    fn test_summarize_srt() {
        let summary = summarize_srt(SAMPLE).unwrap();
        assert_eq!(summary.cues, 2);
        assert_eq!(summary.last_end, 67.0);
    }

    #[test]
    fn test_rejects_non_srt() {
        assert!(matches!(
            summarize_srt("just some text"),
            Err(AutosubError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            summarize_srt("1\nsoon --> later\nHi\n"),
            Err(AutosubError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_srt_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clip_en.srt");

        let summary = tokio_test::block_on(write_srt(SAMPLE, &path)).unwrap();
        assert_eq!(summary.cues, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE);
    }
}
