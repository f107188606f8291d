//! # ECS Error Types
//!
//! Every failure the runtime can describe.
//!
//! Contract violations (unknown entity, undeclared access, double
//! registration) are raised as panics carrying these messages. The `try_*`
//! entry points and configuration loading return them as values instead.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the ECS runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component type was registered twice.
    #[error("component type already registered: {name}")]
    DuplicateComponent {
        /// Rust type name of the component.
        name: &'static str,
    },

    /// The component type limit was reached.
    #[error("component limit reached: at most {max} component types")]
    ComponentLimit {
        /// Maximum number of component types.
        max: usize,
    },

    /// A component type needs stricter alignment than pool chunks provide.
    #[error("component {name} requires alignment {align}, pools support at most {max}")]
    ComponentAlignment {
        /// Rust type name of the component.
        name: &'static str,
        /// Alignment the component requires.
        align: usize,
        /// Largest supported alignment.
        max: usize,
    },

    /// A component type was used before being registered.
    #[error("component type not registered: {name}")]
    UnknownComponent {
        /// Rust type name of the component.
        name: &'static str,
    },

    /// A singleton type was registered twice.
    #[error("singleton type already registered: {name}")]
    DuplicateSingleton {
        /// Rust type name of the singleton.
        name: &'static str,
    },

    /// The singleton type limit was reached.
    #[error("singleton limit reached: at most {max} singleton types")]
    SingletonLimit {
        /// Maximum number of singleton types.
        max: usize,
    },

    /// A singleton type was used before being registered.
    #[error("singleton type not registered: {name}")]
    UnknownSingleton {
        /// Rust type name of the singleton.
        name: &'static str,
    },

    /// A system type was registered twice.
    #[error("system type already registered: {name}")]
    DuplicateSystem {
        /// Rust type name of the system.
        name: &'static str,
    },

    /// The entity id is not (or no longer) part of the world.
    #[error("unknown entity: {0}")]
    UnknownEntity(Entity),

    /// A system touched a component or singleton it did not declare.
    #[error("system {system} did not declare {access} access to {target}")]
    AccessDenied {
        /// Name of the offending system.
        system: &'static str,
        /// `"read"` or `"write"`.
        access: &'static str,
        /// Name of the component or singleton type.
        target: &'static str,
    },

    /// A byte payload does not match the registered component size.
    #[error("payload for {name} is {actual} bytes, expected {expected}")]
    PayloadSize {
        /// Name of the component type.
        name: &'static str,
        /// Registered component size.
        expected: usize,
        /// Size of the payload handed in.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure reading a configuration file.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Turns a checked result into a contract-violation panic at the caller.
pub(crate) trait OrPanic<T> {
    /// Unwraps the value or panics with the error message.
    fn or_panic(self) -> T;
}

impl<T> OrPanic<T> for EcsResult<T> {
    #[inline]
    #[track_caller]
    fn or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for EcsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EcsError::UnknownEntity(Entity::from_raw(7));
        assert_eq!(err.to_string(), "unknown entity: e7");

        let err = EcsError::AccessDenied {
            system: "Movement",
            access: "write",
            target: "Position",
        };
        assert_eq!(
            err.to_string(),
            "system Movement did not declare write access to Position"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EcsError = io.into();
        assert!(matches!(err, EcsError::Io(_)));
    }
}
