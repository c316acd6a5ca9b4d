//! Error logging helpers

/// Log an error using its Debug form, which miette renders with help text
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = &$err;
        tracing::error!("{:?}", err);
    }};
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::error!("{}: {:?}", $msg, err);
    }};
}

/// Log an error at WARN level with its full cause chain
///
/// Used where a failure is recovered from locally and should not be
/// reported as an error.
#[macro_export]
macro_rules! log_recovered {
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::warn!("{}: {}", $msg, err);

        use std::error::Error;
        let mut current = err.source();
        let mut depth = 1;
        while let Some(cause) = current {
            tracing::warn!("  {}: {}", depth, cause);
            current = cause.source();
            depth += 1;
        }
    }};
}

#[cfg(test)]
mod tests {
    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[test]
    #[tracing_test::traced_test]
    fn test_log_recovered_walks_cause_chain() {
        let err = Outer(std::io::Error::other("inner failure"));
        crate::log_recovered!("recovered", err);
        assert!(logs_contain("recovered: outer failure"));
        assert!(logs_contain("1: inner failure"));
    }
}
