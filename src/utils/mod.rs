pub mod file_io;

pub(crate) mod net;
