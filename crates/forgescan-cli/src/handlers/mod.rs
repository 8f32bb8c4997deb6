pub mod extract;
pub mod projects;
pub mod scan;
pub mod sessions;
