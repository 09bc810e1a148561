//! Audio download and processing utilities.
//!
//! Downloads go through yt-dlp; probing, compression, splitting, silence
//! generation and concatenation go through ffmpeg/ffprobe.

mod downloader;
mod tools;

pub use downloader::download_audio;
pub use tools::{
    compress_for_recognition, concat_clips, generate_silence, probe_duration, split_audio,
};
