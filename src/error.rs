use crate::core::FieldKey;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DisposeError {
    #[error("Finalize hook failed at {method} {file}:{line}: {message}")]
    Finalize {
        message: String,
        file: String,
        line: usize,
        method: String,
    },

    #[error("Disposing field '{key}' failed: {source}")]
    Resource {
        key: FieldKey,
        #[source]
        source: Box<DisposeError>,
    },

    #[error("{error} (suppressing: {suppressed})")]
    Suppressed {
        error: Box<DisposeError>,
        suppressed: Box<DisposeError>,
    },

    #[error("{0}")]
    Custom(String),
}

impl DisposeError {
    /// Fold `next` over an earlier failure, keeping both.
    pub fn suppress(prev: Option<DisposeError>, next: DisposeError) -> DisposeError {
        match prev {
            Some(prev) => DisposeError::Suppressed {
                error: Box::new(next),
                suppressed: Box::new(prev),
            },
            None => next,
        }
    }

    /// All leaf errors, oldest first.
    pub fn errors(&self) -> Vec<&DisposeError> {
        match self {
            DisposeError::Suppressed { error, suppressed } => {
                let mut all = suppressed.errors();
                all.extend(error.errors());
                all
            }
            leaf => vec![leaf],
        }
    }

    pub fn message(&self) -> String {
        match self {
            DisposeError::Finalize { message, .. } => message.clone(),
            DisposeError::Resource { source, .. } => source.message(),
            DisposeError::Custom(message) => message.clone(),
            suppressed => suppressed.to_string(),
        }
    }
}

impl From<DisposeError> for std::io::Error {
    fn from(err: DisposeError) -> std::io::Error {
        std::io::Error::other(err.to_string())
    }
}

// Macro that constructs a Finalize error using the compile-time caller
// location. Using a macro (rather than a function) ensures `file!()` and
// `line!()` expand to the site where the macro is invoked.
#[macro_export]
macro_rules! dispose_error_here {
    ($msg:expr) => {
        $crate::DisposeError::Finalize {
            message: $msg.to_string(),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}
