/// Errors from bringing the physics engine up.
///
/// Anything returned here is fatal for the bridge: no bodies may be created
/// until `PhysicsBridge::init` succeeds.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid physics config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("config parse error: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
