mod bootstrap;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use alilive_core::{
    config::SnowflakeConfig,
    logging,
    service::{shanghai_expiry, LiveSignerBuilder, SnowflakeNode},
    LiveUrls, UrlKind,
};

/// Generate signed push and play URLs for a live stream
#[derive(Parser)]
#[command(name = "alilive")]
#[command(about = "Signed RTMP / RTS / FLV / HLS URLs for live streaming")]
struct Cli {
    /// Config file (yaml, toml or json)
    #[arg(short, long, env = "ALILIVE_CONFIG_PATH")]
    config: Option<String>,

    /// Stream name; a snowflake id is generated when omitted
    #[arg(short, long)]
    stream: Option<String>,

    /// URL lifetime in seconds, overrides live.ttl_seconds
    #[arg(short, long)]
    ttl: Option<i64>,

    /// Request the time-shifted stream on play URLs
    #[arg(long)]
    delay: bool,

    /// Only print these kinds (push, rts_push, play, rts_play, flv, hls); repeatable
    #[arg(short, long = "kind")]
    kinds: Vec<UrlKind>,

    /// Print the URLs as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load and validate configuration
    let config = bootstrap::load_config(cli.config.as_deref())?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!(app_name = %config.live.app_name, "alilive starting");

    // 3. Build the signer
    let mut builder = LiveSignerBuilder::from(&config.live);
    if cli.delay {
        builder = builder.delay(true);
    }
    if cli.stream.is_none() {
        if let Some(node) = snowflake_node(&config.snowflake)? {
            builder = builder.snowflake(Arc::new(node));
        }
    }
    let signer = builder.build()?;

    // 4. Sign
    let stream_name = match cli.stream {
        Some(stream) => stream,
        None => signer
            .next_stream_name()
            .context("No stream name given and the snowflake generator is disabled")?,
    };
    let ttl = bootstrap::resolve_ttl(cli.ttl, config.live.ttl_seconds)?;
    let expiry = shanghai_expiry(ttl);
    let urls = signer.urls(&stream_name, expiry);

    info!(stream_name = %stream_name, expiry, delay = signer.delay(), "Generated live urls");

    let selected = select_urls(&urls, &cli.kinds);
    if cli.json {
        if cli.kinds.is_empty() {
            println!("{}", serde_json::to_string_pretty(&urls)?);
        } else {
            let mut object = serde_json::Map::new();
            object.insert("stream_name".to_string(), urls.stream_name.clone().into());
            object.insert("expiry".to_string(), urls.expiry.into());
            for (kind, url) in selected {
                object.insert(kind.to_string(), url.into());
            }
            println!("{}", serde_json::to_string_pretty(&object)?);
        }
    } else {
        println!("stream_name: {}", urls.stream_name);
        println!("expiry: {}", urls.expiry);
        for (kind, url) in selected {
            println!("{kind}: {url}");
        }
    }

    Ok(())
}

/// URLs of the requested kinds in their canonical order, all of them when none are requested
fn select_urls<'a>(urls: &'a LiveUrls, kinds: &[UrlKind]) -> Vec<(UrlKind, &'a str)> {
    urls.iter()
        .filter(|(kind, _)| kinds.is_empty() || kinds.contains(kind))
        .collect()
}

/// Configured generator, or one seeded from this machine's local address
fn snowflake_node(config: &SnowflakeConfig) -> Result<Option<SnowflakeNode>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(node) = config.build_node()? {
        return Ok(Some(node));
    }

    match bootstrap::detect_local_ip() {
        Some(ip) => {
            info!(%ip, "Seeding snowflake generator from local address");
            Ok(Some(SnowflakeNode::from_machine_ip(&ip)?))
        }
        None => {
            warn!("Could not detect local address, snowflake generator disabled");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alilive_core::LiveSigner;

    fn sample_urls() -> LiveUrls {
        LiveSigner::builder()
            .push_key("pushkey")
            .play_key("playkey")
            .push_domain("push.aliyun.com")
            .play_domain("pull.aliyun.com")
            .build()
            .unwrap()
            .urls("stream-1", 1_700_000_000)
    }

    #[test]
    fn test_kind_flag_parses_aliases() {
        let cli = Cli::try_parse_from([
            "alilive", "--stream", "s", "--kind", "hls", "-k", "rts_push",
        ])
        .unwrap();
        assert_eq!(cli.kinds, vec![UrlKind::M3u8Play, UrlKind::RtsPush]);

        assert!(Cli::try_parse_from(["alilive", "--kind", "rtsp"]).is_err());
    }

    #[test]
    fn test_select_urls_keeps_canonical_order() {
        let urls = sample_urls();

        assert_eq!(select_urls(&urls, &[]).len(), UrlKind::ALL.len());

        let selected = select_urls(&urls, &[UrlKind::M3u8Play, UrlKind::Push]);
        assert_eq!(
            selected,
            vec![
                (UrlKind::Push, urls.push.as_str()),
                (UrlKind::M3u8Play, urls.m3u8_play.as_str()),
            ]
        );
    }
}
