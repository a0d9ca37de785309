use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::types::VideoMerger;
use super::{run_tool, VideoError};

/// Every clip is scaled to this frame before concatenation, so remote
/// 1280×720 clips and local 512×512 ones can share one stream.
pub const VIDEO_CONCAT_ARGS: [&str; 6] = [
    "-vf",
    "scale=1280:720,setsar=1",
    "-c:v",
    "libx264",
    "-pix_fmt",
    "yuv420p",
];

/// Concatenates clips and narration with the ffmpeg concat demuxer, then
/// muxes the two with AAC audio cut to the shorter stream.
pub struct FfmpegMerger {
    ffmpeg: PathBuf,
}

impl FfmpegMerger {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn concat(&self, list: &Path, codec_args: &[&str], output: &Path) -> Result<(), VideoError> {
        run_tool(
            Command::new(&self.ffmpeg)
                .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
                .arg(list)
                .args(codec_args)
                .arg(output),
        )
    }
}

/// Body of a concat-demuxer list file.
pub fn concat_list(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in paths {
        let escaped = p.to_string_lossy().replace('\\', "/").replace('\'', "'\\''");
        let _ = writeln!(out, "file '{escaped}'");
    }
    out
}

impl VideoMerger for FfmpegMerger {
    fn merge(
        &self,
        videos: &[PathBuf],
        audios: &[PathBuf],
        output: &Path,
    ) -> Result<(), VideoError> {
        if videos.is_empty() {
            return Err(VideoError::NoClips);
        }
        let work_dir = output.parent().unwrap_or_else(|| Path::new("."));
        tracing::info!(
            videos = videos.len(),
            audios = audios.len(),
            output = %output.display(),
            "Merging videos and audio"
        );

        let video_list = work_dir.join("concat_v.txt");
        let joined_video = work_dir.join("temp_concat_v.mp4");
        std::fs::write(&video_list, concat_list(videos))?;
        self.concat(&video_list, &VIDEO_CONCAT_ARGS, &joined_video)
            .map_err(|e| VideoError::Merge(e.to_string()))?;

        let mut mux = Command::new(&self.ffmpeg);
        mux.args(["-y", "-loglevel", "error", "-i"]).arg(&joined_video);

        if audios.is_empty() {
            mux.args(["-c:v", "copy"]);
        } else {
            let audio_list = work_dir.join("concat_a.txt");
            let joined_audio = work_dir.join("temp_concat_a.wav");
            std::fs::write(&audio_list, concat_list(audios))?;
            self.concat(&audio_list, &["-c:a", "pcm_s16le"], &joined_audio)
                .map_err(|e| VideoError::Merge(e.to_string()))?;
            mux.arg("-i")
                .arg(&joined_audio)
                .args(["-c:v", "copy", "-c:a", "aac", "-shortest"]);
        }
        mux.arg(output);
        run_tool(&mut mux).map_err(|e| VideoError::Merge(e.to_string()))?;

        tracing::info!(output = %output.display(), "Final video saved");
        Ok(())
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Writes the concatenated input bytes as the "video".
pub struct MockMerger;

impl VideoMerger for MockMerger {
    fn merge(
        &self,
        videos: &[PathBuf],
        audios: &[PathBuf],
        output: &Path,
    ) -> Result<(), VideoError> {
        let mut bytes = Vec::new();
        for p in videos.iter().chain(audios) {
            bytes.extend(std::fs::read(p)?);
        }
        std::fs::write(output, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_list_quotes_paths() {
        let list = concat_list(&[
            PathBuf::from("/tmp/a/scene_0_video.mp4"),
            PathBuf::from("/tmp/it's/scene_1_video.mp4"),
        ]);
        assert_eq!(
            list,
            "file '/tmp/a/scene_0_video.mp4'\nfile '/tmp/it'\\''s/scene_1_video.mp4'\n"
        );
    }

    #[test]
    fn clips_are_scaled_to_one_frame_size() {
        let vf = VIDEO_CONCAT_ARGS.iter().position(|a| *a == "-vf").unwrap();
        assert_eq!(VIDEO_CONCAT_ARGS[vf + 1], "scale=1280:720,setsar=1");
        assert!(VIDEO_CONCAT_ARGS.contains(&"libx264"));
    }

    #[test]
    fn merge_without_clips_is_rejected() {
        let merger = FfmpegMerger::new("ffmpeg");
        assert!(matches!(
            merger.merge(&[], &[], Path::new("/tmp/out.mp4")),
            Err(VideoError::NoClips)
        ));
    }

    #[test]
    fn missing_ffmpeg_is_a_merge_error() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("scene_0_video.mp4");
        std::fs::write(&clip, b"clip").unwrap();
        let merger = FfmpegMerger::new("labscope-no-such-ffmpeg");
        let err = merger
            .merge(&[clip], &[], &dir.path().join("final_video.mp4"))
            .unwrap_err();
        assert!(matches!(err, VideoError::Merge(_)));
        assert!(dir.path().join("concat_v.txt").exists());
    }
}
