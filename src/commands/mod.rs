pub mod daemon;
pub mod discover;
pub mod execute;
pub mod plan;
pub mod report;
