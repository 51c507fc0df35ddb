use thiserror::Error;
use tsb_model::LoadError;

/// Failure converting one type. Downgraded to a diagnostic by the engine;
/// the type is dropped and the rest of the module continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("member '{member}' has no type")]
    MissingMemberType { member: String },
    #[error("enum member '{member}' has no constant value")]
    MissingEnumValue { member: String },
    #[error("delegate has more than one 'Invoke' method")]
    AmbiguousInvoke,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("module '{module}' could not be loaded")]
    ModuleLoad {
        module: String,
        #[source]
        source: LoadError,
    },
}
