//! Signed live-streaming URLs
//!
//! Every URL carries an `auth_key={expiry}-0-{uid}-{hash}` query parameter,
//! where `hash` is the MD5 of the canonical path
//! `/{app}/{stream}{ext}-{expiry}-0-{uid}-{key}`. The streaming edge recomputes
//! the same digest with its copy of the key and rejects mismatches.
//!
//! ## Variants
//! - push / RTS push: `rtmp://` / `artc://` on the push domain, signed with the push key
//! - play / RTS play: `rtmp://` / `artc://` on the play domain, signed with the play key
//! - FLV / HLS play: `https://` on the play domain with `.flv` / `.m3u8` appended
//!
//! Play variants append [`DELAY_SUFFIX`] to the stream name when delay is enabled.
//!
//! The user id travels in cleartext inside `auth_key`. It helps correlate
//! streams with users when debugging, at the cost of exposing it to anyone the
//! URL is shared with.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use super::hash::md5_hex;
use super::snowflake::SnowflakeNode;
use crate::{
    config::LiveConfig,
    models::{AuthKey, LiveUrls, UrlKind, DELAY_SUFFIX},
    Result,
};

/// Immutable signing context for one application on one pair of domains
#[derive(Clone)]
pub struct LiveSigner {
    app_name: String,
    push_key: String,
    play_key: String,
    push_domain: String,
    play_domain: String,
    delay: bool,
    uid: String,
    snowflake: Option<Arc<SnowflakeNode>>,
}

impl std::fmt::Debug for LiveSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveSigner")
            .field("app_name", &self.app_name)
            .field("push_domain", &self.push_domain)
            .field("play_domain", &self.play_domain)
            .field("delay", &self.delay)
            .field("uid", &self.uid)
            .field("snowflake_node", &self.snowflake.as_ref().map(|n| n.node_id()))
            .finish_non_exhaustive()
    }
}

impl LiveSigner {
    #[must_use]
    pub fn builder() -> LiveSignerBuilder {
        LiveSignerBuilder::default()
    }

    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    #[must_use]
    pub const fn delay(&self) -> bool {
        self.delay
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Copy of this context with the delay flag set to `delay`
    #[must_use]
    pub fn with_delay(&self, delay: bool) -> Self {
        Self {
            delay,
            ..self.clone()
        }
    }

    /// Next snowflake id as a stream name, if a generator is attached
    #[must_use]
    pub fn next_stream_name(&self) -> Option<String> {
        self.snowflake
            .as_ref()
            .map(|node| node.generate().to_string())
    }

    /// RTMP push URL
    #[must_use]
    pub fn push_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::Push, stream_name, expiry)
    }

    /// RTS (low latency, UDP) push URL
    #[must_use]
    pub fn rts_push_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::RtsPush, stream_name, expiry)
    }

    /// RTMP play URL
    #[must_use]
    pub fn play_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::Play, stream_name, expiry)
    }

    /// RTS (low latency, UDP) play URL
    #[must_use]
    pub fn rts_play_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::RtsPlay, stream_name, expiry)
    }

    /// HTTP-FLV play URL for browser players
    #[must_use]
    pub fn flv_play_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::FlvPlay, stream_name, expiry)
    }

    /// HLS play URL
    #[must_use]
    pub fn m3u8_play_url(&self, stream_name: &str, expiry: i64) -> String {
        self.sign(UrlKind::M3u8Play, stream_name, expiry)
    }

    /// All six URLs for `stream_name`
    #[must_use]
    pub fn urls(&self, stream_name: &str, expiry: i64) -> LiveUrls {
        LiveUrls {
            stream_name: stream_name.to_string(),
            expiry,
            push: self.push_url(stream_name, expiry),
            rts_push: self.rts_push_url(stream_name, expiry),
            play: self.play_url(stream_name, expiry),
            rts_play: self.rts_play_url(stream_name, expiry),
            flv_play: self.flv_play_url(stream_name, expiry),
            m3u8_play: self.m3u8_play_url(stream_name, expiry),
        }
    }

    /// Signed URL of the given kind
    ///
    /// `expiry` is an absolute Unix timestamp in seconds.
    #[must_use]
    pub fn sign(&self, kind: UrlKind, stream_name: &str, expiry: i64) -> String {
        let stream = self.effective_stream_name(kind, stream_name);
        let auth_key = self.auth_key(kind, stream_name, expiry);

        debug!(kind = %kind, stream_name = %stream, expiry, "Signed live url");

        format!(
            "{}{}/{}/{}{}?auth_key={}",
            kind.scheme(),
            self.domain(kind),
            self.app_name,
            stream,
            kind.extension(),
            auth_key
        )
    }

    /// The `auth_key` value for a URL of the given kind
    #[must_use]
    pub fn auth_key(&self, kind: UrlKind, stream_name: &str, expiry: i64) -> AuthKey {
        AuthKey {
            expiry,
            uid: self.uid.clone(),
            hash: md5_hex(&self.canonical_path(kind, stream_name, expiry)),
        }
    }

    /// `/{app}/{stream}{ext}-{expiry}-0-{uid}-{key}`, the hashed material
    fn canonical_path(&self, kind: UrlKind, stream_name: &str, expiry: i64) -> String {
        let stream = self.effective_stream_name(kind, stream_name);
        format!(
            "/{}/{}{}-{}-0-{}-{}",
            self.app_name,
            stream,
            kind.extension(),
            expiry,
            self.uid,
            self.secret_key(kind)
        )
    }

    fn effective_stream_name<'a>(&self, kind: UrlKind, stream_name: &'a str) -> Cow<'a, str> {
        if self.delay && kind.is_play() {
            Cow::Owned(format!("{stream_name}{DELAY_SUFFIX}"))
        } else {
            Cow::Borrowed(stream_name)
        }
    }

    fn secret_key(&self, kind: UrlKind) -> &str {
        if kind.is_play() {
            &self.play_key
        } else {
            &self.push_key
        }
    }

    fn domain(&self, kind: UrlKind) -> &str {
        if kind.is_play() {
            &self.play_domain
        } else {
            &self.push_domain
        }
    }
}

/// Builder for [`LiveSigner`]
///
/// Every setting is optional and may be given in any order. Omitted strings
/// default to empty, delay defaults to off and no id generator is attached.
#[derive(Default)]
pub struct LiveSignerBuilder {
    app_name: String,
    push_key: String,
    play_key: String,
    push_domain: String,
    play_domain: String,
    delay: bool,
    uid: String,
    snowflake: Option<Arc<SnowflakeNode>>,
    machine_ip: Option<String>,
}

impl LiveSignerBuilder {
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    #[must_use]
    pub fn push_key(mut self, push_key: impl Into<String>) -> Self {
        self.push_key = push_key.into();
        self
    }

    #[must_use]
    pub fn play_key(mut self, play_key: impl Into<String>) -> Self {
        self.play_key = play_key.into();
        self
    }

    #[must_use]
    pub fn push_domain(mut self, push_domain: impl Into<String>) -> Self {
        self.push_domain = push_domain.into();
        self
    }

    #[must_use]
    pub fn play_domain(mut self, play_domain: impl Into<String>) -> Self {
        self.play_domain = play_domain.into();
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: bool) -> Self {
        self.delay = delay;
        self
    }

    /// User id shown in cleartext in every generated URL
    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Attach an existing generator, shared with other signers
    #[must_use]
    pub fn snowflake(mut self, node: Arc<SnowflakeNode>) -> Self {
        self.snowflake = Some(node);
        self
    }

    /// Seed a new generator from a machine's IPv4 address at build time
    ///
    /// Ignored when a generator is attached with [`Self::snowflake`].
    #[must_use]
    pub fn machine_ip(mut self, machine_ip: impl Into<String>) -> Self {
        self.machine_ip = Some(machine_ip.into());
        self
    }

    /// Build the signer
    ///
    /// Fails only when the generator cannot be seeded from the machine ip.
    pub fn build(self) -> Result<LiveSigner> {
        let snowflake = match (self.snowflake, self.machine_ip) {
            (Some(node), _) => Some(node),
            (None, Some(ip)) => Some(Arc::new(SnowflakeNode::from_machine_ip(&ip)?)),
            (None, None) => None,
        };

        Ok(LiveSigner {
            app_name: self.app_name,
            push_key: self.push_key,
            play_key: self.play_key,
            push_domain: self.push_domain,
            play_domain: self.play_domain,
            delay: self.delay,
            uid: self.uid,
            snowflake,
        })
    }
}

impl From<&LiveConfig> for LiveSignerBuilder {
    fn from(config: &LiveConfig) -> Self {
        LiveSigner::builder()
            .app_name(config.app_name.as_str())
            .push_key(config.push_key.as_str())
            .play_key(config.play_key.as_str())
            .push_domain(config.push_domain.as_str())
            .play_domain(config.play_domain.as_str())
            .delay(config.delay)
            .uid(config.uid.as_str())
    }
}
