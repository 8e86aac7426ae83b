pub mod archive;
pub mod compress;
pub mod file_ext;
pub mod finish;
pub mod naming;
pub mod result_error;
pub mod session;
pub mod snapshot_config;
pub mod tar;
pub mod validate;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
