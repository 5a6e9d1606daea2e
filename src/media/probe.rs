//! FFprobe metadata lookups
//!
//! Duration and video-stream geometry for staged sources, plus the
//! mapping from FFmpeg/FFprobe failures to load-failure causes.

use std::path::Path;
use std::process::ExitStatus;

use tokio::process::Command;

use super::LoadError;

/// Container duration in seconds
pub async fn probe_duration(path: &Path) -> Result<f64, LoadError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| LoadError::Network(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(classify_load_failure(&output.status, &output.stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = stdout.trim().parse().map_err(|_| {
        LoadError::Unsupported(format!("media reports no duration ({:?})", stdout.trim()))
    })?;

    if duration <= 0.0 {
        return Err(LoadError::Unsupported(
            "media reports zero duration".to_string(),
        ));
    }

    Ok(duration)
}

/// Native pixel dimensions of the first video stream
pub async fn probe_video_stream(path: &Path) -> Result<(u32, u32), LoadError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| LoadError::Network(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(classify_load_failure(&output.status, &output.stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parts: Vec<&str> = stdout.trim().split(',').collect();
    if parts.len() < 2 {
        return Err(LoadError::Unsupported(
            "source has no video stream".to_string(),
        ));
    }

    let width: u32 = parts[0]
        .parse()
        .map_err(|_| LoadError::Unsupported(format!("invalid video width: {}", parts[0])))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| LoadError::Unsupported(format!("invalid video height: {}", parts[1])))?;

    if width == 0 || height == 0 {
        return Err(LoadError::Unsupported(
            "video stream has zero pixel size".to_string(),
        ));
    }

    Ok((width, height))
}

/// Map a failed FFmpeg/FFprobe run to a load-failure cause
pub fn classify_load_failure(status: &ExitStatus, stderr: &[u8]) -> LoadError {
    // No exit code means the process was killed mid-load
    if status.code().is_none() {
        return LoadError::Aborted;
    }
    classify_stderr(&String::from_utf8_lossy(stderr))
}

/// Classify FFmpeg stderr text into a load-failure cause
pub(crate) fn classify_stderr(stderr: &str) -> LoadError {
    let lower = stderr.to_lowercase();
    let summary = error_summary(stderr);

    if lower.contains("no such file")
        || lower.contains("permission denied")
        || lower.contains("input/output error")
        || lower.contains("connection")
    {
        LoadError::Network(summary)
    } else if lower.contains("invalid data found")
        || lower.contains("error while decoding")
        || lower.contains("moov atom not found")
        || lower.contains("corrupt")
    {
        LoadError::Corrupted(summary)
    } else {
        // Unknown decoder, unknown container, and anything FFmpeg cannot
        // name all land in the unsupported bucket
        LoadError::Unsupported(summary)
    }
}

/// First meaningful line of an FFmpeg stderr dump
pub(crate) fn error_summary(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown media failure")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_corrupt_input() {
        let error = classify_stderr("tmp/x: Invalid data found when processing input\n");
        assert!(matches!(error, LoadError::Corrupted(_)));

        let error = classify_stderr("moov atom not found");
        assert!(matches!(error, LoadError::Corrupted(_)));
    }

    #[test]
    fn test_classify_unsupported_format() {
        let error = classify_stderr("Decoder not found for codec xyz");
        assert!(matches!(error, LoadError::Unsupported(_)));

        let error = classify_stderr("Requested output format is not supported");
        assert!(matches!(error, LoadError::Unsupported(_)));
    }

    #[test]
    fn test_classify_io_failure() {
        let error = classify_stderr("/tmp/missing.mp4: No such file or directory");
        assert!(matches!(error, LoadError::Network(_)));
    }

    #[test]
    fn test_classify_unknown_defaults_to_unsupported() {
        let error = classify_stderr("something nobody has seen before");
        assert!(matches!(error, LoadError::Unsupported(_)));
    }

    #[test]
    fn test_error_summary_takes_first_nonempty_line() {
        let summary = error_summary("\n\n  first real line  \nsecond line\n");
        assert_eq!(summary, "first real line");

        assert_eq!(error_summary(""), "unknown media failure");
    }
}
