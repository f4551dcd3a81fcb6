use thiserror::Error;

/// Failure of a host call. Entities can vanish between the notification
/// that names them and the call that touches them; every consumer in the
/// core treats either variant as "not found" and degrades locally rather
/// than propagating.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("entity vanished: {0}")]
    Gone(String),

    #[error("host unavailable: {0}")]
    Unavailable(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
