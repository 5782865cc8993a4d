// Screening pipeline: fetch posts -> classify each -> assemble the batch.

pub mod analyze;
