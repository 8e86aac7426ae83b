use crate::backup::result_error::error::Error;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fmt::Debug;

pub type Result<T> = std::result::Result<T, Error>;

impl<S: Into<String>, O: Debug + Send + 'static, R> WithDebugObjectAndFnName<S, O> for Result<R> {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        self.map_err(|e| e.with_debug_object_and_fn_name(obj, fn_name))
    }
}

impl<R, S: Into<String>> WithMsg<S> for Result<R> {
    fn with_msg(self, msg: S) -> Self {
        self.map_err(|e| e.with_msg(msg))
    }
}

/// Lifts a foreign error into the crate error and attaches `msg` in one step.
pub trait MapErrWithMsg<R> {
    fn map_err_with_msg<S: Into<String>>(self, msg: impl FnOnce() -> S) -> Result<R>;
}

impl<R, E: Into<Error>> MapErrWithMsg<R> for std::result::Result<R, E> {
    fn map_err_with_msg<S: Into<String>>(self, msg: impl FnOnce() -> S) -> Result<R> {
        self.map_err(|e| Into::<Error>::into(e).with_msg(msg()))
    }
}
