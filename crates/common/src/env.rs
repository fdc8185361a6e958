/// reads an env var, loading `.env` from the working directory on first use
pub fn get_env_var(key: &str) -> Result<String, dotenvy::Error> {
    dotenvy::var(key)
}

/// `1`, `true`, `yes` and `on` (any case) are truthy, everything else is not
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
