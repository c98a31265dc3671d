//! Custom test assertions

use std::fmt::Debug;
use tenant_access::CoreError;

/// Assert the result is a 403 `Forbidden`
pub fn assert_forbidden<T: Debug>(result: Result<T, CoreError>) {
    match result {
        Err(err @ CoreError::Forbidden(_)) => assert_eq!(err.status_code(), 403),
        other => panic!("Expected Forbidden, got {:?}", other),
    }
}

/// Assert the result is a `ContextViolation` mentioning `needle`
pub fn assert_context_violation<T: Debug>(result: Result<T, CoreError>, needle: &str) {
    match result {
        Err(CoreError::ContextViolation(message)) => assert!(
            message.contains(needle),
            "Expected violation mentioning {:?}, got {:?}",
            needle,
            message
        ),
        other => panic!("Expected ContextViolation, got {:?}", other),
    }
}
