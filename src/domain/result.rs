//! Result type alias for CUVS
//!
//! This module provides a convenient Result type alias that uses CuvsError
//! as the error type.

use super::errors::CuvsError;

/// Result type alias for CUVS operations
///
/// # Examples
///
/// ```
/// use cuvs::domain::result::Result;
/// use cuvs::domain::errors::CuvsError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CuvsError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CuvsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::CuvsError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(CuvsError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
