pub mod errors;

/// Stem kept from the separation output and published as the final artifact.
pub const STEM_NAME: &str = "vocals";

pub const SPLEETER_MODEL: &str = "spleeter:2stems";

/// Upper bound, in seconds, of audio spleeter will process from one input.
pub const SPLEETER_MAX_AUDIO_SECS: u64 = 3600;

pub const OUTPUT_BITRATE: &str = "320k";

pub const RAW_AUDIO_CHANNELS: u32 = 2;

pub const RAW_AUDIO_SAMPLE_RATE: u32 = 44_100;

pub const JOB_ID_LEN: usize = 8;

pub const RAW_SUFFIX: &str = "_raw";
