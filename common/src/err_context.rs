/// A module for attaching a human readable context to errors.

/// An error (E), and the context (a description of what we were doing).
#[derive(Debug)]
pub struct ErrorContext<E>(pub String, pub E);

/// Extends `Result` with a `context` method, which wraps the error with
/// a description of the operation that failed.
pub trait ErrorContextExt<T, E> {
    fn context<C: AsRef<str>>(self, c: C) -> Result<T, ErrorContext<E>>;
}

impl<T, E> ErrorContextExt<T, E> for Result<T, E> {
    fn context<C: AsRef<str>>(self, c: C) -> Result<T, ErrorContext<E>> {
        self.map_err(|e| ErrorContext(c.as_ref().into(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_should_wrap_the_error_and_keep_the_value() {
        let ok: Result<u8, String> = Ok(4);
        assert_eq!(ok.context("unused").ok(), Some(4));

        let err: Result<u8, String> = Err("boom".to_string());
        let ErrorContext(context, source) = err.context(format!("step {}", 2)).unwrap_err();
        assert_eq!(context, "step 2");
        assert_eq!(source, "boom");
    }
}
