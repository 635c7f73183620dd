use crate::identity::AuthMode;

pub trait Configuration: Clone + Send + Sync + 'static {
    fn port(&self) -> String;
    /// `None` keeps all data in memory.
    fn database_url(&self) -> Option<String>;
    fn database_pool_size(&self) -> u32;
    fn auth_mode(&self) -> AuthMode;
    fn line_profile_url(&self) -> String;
    fn dev_token(&self) -> Option<String>;
}
