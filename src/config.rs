use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, path::PathBuf, str::FromStr};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gateway_url: String,
    pub gateway_key: String,
    pub bucket: String,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("gateway_url", &self.gateway_url)
            .field("gateway_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("static_dir", &self.static_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Registration, login and file publication backend")]
pub struct Args {
    /// Host to bind to (overrides CYBERSOLUTION_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CYBERSOLUTION_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Supabase project URL (overrides SUPABASE_URL)
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Supabase API key (overrides SUPABASE_KEY)
    #[arg(long)]
    pub gateway_key: Option<String>,

    /// Storage bucket for uploaded files (overrides CYBERSOLUTION_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Directory holding the HTML pages (overrides CYBERSOLUTION_STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Largest accepted publication upload in bytes (overrides CYBERSOLUTION_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse CLI args and the process environment into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |key| env::var(key).ok())
    }

    /// Merge `args` over the variables returned by `lookup`.
    ///
    /// The gateway URL and key have no default; either missing is an error.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gateway_url = match args.gateway_url.or_else(|| lookup("SUPABASE_URL")) {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!("SUPABASE_URL is not set (or pass --gateway-url)"),
        };
        let gateway_key = match args.gateway_key.or_else(|| lookup("SUPABASE_KEY")) {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!("SUPABASE_KEY is not set (or pass --gateway-key)"),
        };

        let port = match args.port {
            Some(port) => port,
            None => parse_var(&lookup, "CYBERSOLUTION_PORT")?.unwrap_or(3000),
        };
        let max_upload_bytes = match args.max_upload_bytes {
            Some(max) => max,
            None => parse_var(&lookup, "CYBERSOLUTION_MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        Ok(Self {
            host: args
                .host
                .or_else(|| lookup("CYBERSOLUTION_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            gateway_url,
            gateway_key,
            bucket: args
                .bucket
                .or_else(|| lookup("CYBERSOLUTION_BUCKET"))
                .unwrap_or_else(|| "uploads".into()),
            static_dir: args
                .static_dir
                .or_else(|| lookup("CYBERSOLUTION_STATIC_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("public")),
            max_upload_bytes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("parsing {} value `{}`", key, value))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_gateway_is_set() {
        let cfg = AppConfig::resolve(
            Args::default(),
            env_of(&[("SUPABASE_URL", "https://p.supabase.co"), ("SUPABASE_KEY", "k")]),
        )
        .unwrap();

        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.bucket, "uploads");
        assert_eq!(cfg.static_dir, PathBuf::from("public"));
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn missing_gateway_settings_are_fatal() {
        let no_key = AppConfig::resolve(
            Args::default(),
            env_of(&[("SUPABASE_URL", "https://p.supabase.co")]),
        );
        assert!(no_key.unwrap_err().to_string().contains("SUPABASE_KEY"));

        let no_url = AppConfig::resolve(Args::default(), env_of(&[("SUPABASE_KEY", "k")]));
        assert!(no_url.unwrap_err().to_string().contains("SUPABASE_URL"));
    }

    #[test]
    fn cli_overrides_environment() {
        let args = Args {
            port: Some(8080),
            gateway_key: Some("cli-key".into()),
            ..Args::default()
        };
        let cfg = AppConfig::resolve(
            args,
            env_of(&[
                ("SUPABASE_URL", "https://p.supabase.co"),
                ("SUPABASE_KEY", "env-key"),
                ("CYBERSOLUTION_PORT", "9000"),
                ("CYBERSOLUTION_HOST", "127.0.0.1"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.gateway_key, "cli-key");
        assert!(!format!("{:?}", cfg).contains("cli-key"));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = AppConfig::resolve(
            Args::default(),
            env_of(&[
                ("SUPABASE_URL", "https://p.supabase.co"),
                ("SUPABASE_KEY", "k"),
                ("CYBERSOLUTION_PORT", "http"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("CYBERSOLUTION_PORT"));
    }
}
