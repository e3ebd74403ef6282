use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Suffix appended to play-side stream names for time-shifted playback
pub const DELAY_SUFFIX: &str = "-alidelay";

/// Kind of signed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    /// RTMP ingest
    Push,
    /// RTS (UDP, low latency) ingest
    RtsPush,
    /// RTMP playback
    Play,
    /// RTS (UDP, low latency) playback
    RtsPlay,
    /// HTTP-FLV playback, suited to web players
    FlvPlay,
    /// HLS playback
    M3u8Play,
}

impl UrlKind {
    pub const ALL: [Self; 6] = [
        Self::Push,
        Self::RtsPush,
        Self::Play,
        Self::RtsPlay,
        Self::FlvPlay,
        Self::M3u8Play,
    ];

    /// URL scheme including the `://` separator
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::Push | Self::Play => "rtmp://",
            Self::RtsPush | Self::RtsPlay => "artc://",
            Self::FlvPlay | Self::M3u8Play => "https://",
        }
    }

    /// Play-side kinds sign with the play key and honour the delay flag
    #[must_use]
    pub const fn is_play(self) -> bool {
        !matches!(self, Self::Push | Self::RtsPush)
    }

    /// File extension placed right after the stream name, empty for stream protocols
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::FlvPlay => ".flv",
            Self::M3u8Play => ".m3u8",
            _ => "",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::RtsPush => "rts_push",
            Self::Play => "play",
            Self::RtsPlay => "rts_play",
            Self::FlvPlay => "flv_play",
            Self::M3u8Play => "m3u8_play",
        }
    }
}

impl FromStr for UrlKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "rts_push" | "rtspush" => Ok(Self::RtsPush),
            "play" => Ok(Self::Play),
            "rts_play" | "rtsplay" => Ok(Self::RtsPlay),
            "flv_play" | "flvplay" | "flv" => Ok(Self::FlvPlay),
            "m3u8_play" | "m3u8play" | "m3u8" | "hls" => Ok(Self::M3u8Play),
            _ => Err(format!("Unknown url kind: {s}")),
        }
    }
}

impl std::fmt::Display for UrlKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `auth_key` query value: `{expiry}-0-{uid}-{hash}`
///
/// The `0` field is the random component of the platform's scheme, always zero here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub expiry: i64,
    pub uid: String,
    pub hash: String,
}

impl std::fmt::Display for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-0-{}-{}", self.expiry, self.uid, self.hash)
    }
}

/// All six signed URLs for one stream and expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUrls {
    pub stream_name: String,
    pub expiry: i64,
    pub push: String,
    pub rts_push: String,
    pub play: String,
    pub rts_play: String,
    pub flv_play: String,
    pub m3u8_play: String,
}

impl LiveUrls {
    #[must_use]
    pub fn get(&self, kind: UrlKind) -> &str {
        match kind {
            UrlKind::Push => &self.push,
            UrlKind::RtsPush => &self.rts_push,
            UrlKind::Play => &self.play,
            UrlKind::RtsPlay => &self.rts_play,
            UrlKind::FlvPlay => &self.flv_play,
            UrlKind::M3u8Play => &self.m3u8_play,
        }
    }

    /// `(kind, url)` pairs in [`UrlKind::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (UrlKind, &str)> {
        UrlKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
