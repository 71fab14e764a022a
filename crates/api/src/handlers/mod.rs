pub mod imports;
pub mod jobs;
