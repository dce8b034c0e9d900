#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No access token found for {url}. Set {env_var} or configure location.token in ~/.config/sgsearch/config.toml")]
    NoToken { url: String, env_var: String },

    #[error("Access token in {0} is empty")]
    EmptyToken(String),
}
