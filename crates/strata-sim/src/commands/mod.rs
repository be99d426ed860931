pub mod allocate;
pub mod replicate;
