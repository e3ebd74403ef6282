//! Configuration discovery for the CLI

use alilive_core::Config;
use anyhow::Result;

/// Load configuration
///
/// Config file path priority: `--config` / `ALILIVE_CONFIG_PATH` > `./config.yaml`
/// > `/config/config.yaml`. Environment variables override file values.
pub fn load_config(explicit: Option<&str>) -> Result<Config> {
    let config_path = explicit
        .map(str::to_string)
        .or_else(|| {
            ["config.yaml", "/config/config.yaml"]
                .into_iter()
                .find(|p| std::path::Path::new(p).exists())
                .map(str::to_string)
        });

    let config = if let Some(path) = config_path {
        if !std::path::Path::new(&path).exists() {
            return Err(anyhow::anyhow!("Config file not found: {path}"));
        }
        eprintln!("Loading config from {path}");
        Config::from_file(&path)?
    } else {
        eprintln!("No config file found, using environment variables");
        Config::from_env()?
    };

    // Fail fast on misconfigurations
    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Config validation error: {error}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    Ok(config)
}

/// URL lifetime: `--ttl` when given, else `live.ttl_seconds`, always positive
pub fn resolve_ttl(cli_ttl: Option<i64>, configured: i64) -> Result<i64> {
    let ttl = cli_ttl.unwrap_or(configured);
    if ttl <= 0 {
        return Err(anyhow::anyhow!("ttl must be positive, got {ttl}"));
    }
    Ok(ttl)
}

/// Local IPv4 address used for outbound traffic
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub fn detect_local_ip() -> Option<String> {
    use std::net::UdpSocket;

    UdpSocket::bind("0.0.0.0:0")
        .and_then(|s| s.connect("8.8.8.8:80").map(|()| s))
        .and_then(|s| s.local_addr())
        .ok()
        .map(|addr| addr.ip())
        .filter(std::net::IpAddr::is_ipv4)
        .map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        assert!(load_config(Some("/nonexistent/alilive.yaml")).is_err());
    }

    #[test]
    fn test_resolve_ttl() {
        assert_eq!(resolve_ttl(None, 86400).unwrap(), 86400);
        assert_eq!(resolve_ttl(Some(60), 86400).unwrap(), 60);
        assert_eq!(resolve_ttl(Some(1), 86400).unwrap(), 1);

        let err = resolve_ttl(Some(-60), 86400).unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert!(resolve_ttl(Some(0), 86400).is_err());
        // a bad flag is not rescued by a good config value, nor the reverse
        assert!(resolve_ttl(None, 0).is_err());
    }

    #[test]
    fn test_detected_ip_seeds_a_node() {
        // sandboxes without a route yield None
        if let Some(ip) = detect_local_ip() {
            assert!(alilive_core::service::SnowflakeNode::from_machine_ip(&ip).is_ok());
        }
    }
}
