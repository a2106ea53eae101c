//! Result type alias for docpipe

use super::errors::DocpipeError;

/// Result type alias for docpipe operations
///
/// # Examples
///
/// ```
/// use docpipe::domain::result::Result;
/// use docpipe::domain::errors::DocpipeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(DocpipeError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, DocpipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(DocpipeError::Other("test error".to_string()));
        assert!(result.is_err());
    }
}
