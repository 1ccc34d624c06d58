use std::{error::Error, fmt};

#[derive(Clone, Debug, PartialEq)]
pub enum HealthError {
    Uninitialized,
    AlreadyInitialized,
    InvalidConfig { field: &'static str, value: f32 },
}

impl fmt::Display for HealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthError::Uninitialized => write!(f, "health state used before initialization"),
            HealthError::AlreadyInitialized => write!(f, "health state is already initialized"),
            HealthError::InvalidConfig { field, value } => {
                write!(f, "invalid health config: `{field}` cannot be {value}")
            }
        }
    }
}

impl Error for HealthError {}
