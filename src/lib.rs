pub mod align;
pub mod data;
pub mod error;
pub mod io;
pub mod plink;
