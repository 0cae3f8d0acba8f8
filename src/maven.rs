pub mod artifact;
pub mod coordinates;
pub mod paths;
pub mod version;
