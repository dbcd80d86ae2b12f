mod work_dir;
pub use work_dir::*;
