use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|err| anyhow!("invalid bind_addr: {}", err))
}

pub fn validate_endpoint(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("explanation_endpoint must not be empty"));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(anyhow!("explanation_endpoint must be an http(s) url"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_needs_http_scheme() {
        assert!(validate_endpoint("https://openrouter.ai/api/v1/chat/completions").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:9000/v1").is_ok());
        assert!(validate_endpoint("ftp://example.com").is_err());
        assert!(validate_endpoint("  ").is_err());
    }

    #[test]
    fn bind_addr_must_be_socket_addr() {
        assert!(validate_bind_addr("127.0.0.1:8501").is_ok());
        assert!(validate_bind_addr("localhost").is_err());
    }
}
