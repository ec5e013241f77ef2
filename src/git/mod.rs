pub mod blame;
pub mod repository;
#[cfg(feature = "test-support")]
pub mod test_utils;
pub mod workdir_diff;

pub use repository::find_repository;
