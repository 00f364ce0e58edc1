//! Custom assertion macros

/// Assert the status of an `axum_test::TestResponse`, printing the body on mismatch
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status_code(),
            $status,
            "unexpected status, body: {}",
            $response.text()
        );
    };
}

/// Assert the `{"error", "status"}` body rendered for a failed request
#[macro_export]
macro_rules! assert_error_body {
    ($response:expr, $status:expr) => {{
        $crate::assert_status!($response, $status);
        let body: serde_json::Value = $response.json();
        assert_eq!(body["status"], $status.as_u16());
        body["error"].as_str().unwrap_or_default().to_string()
    }};
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}
