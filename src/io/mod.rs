pub mod compression;
pub mod glob;
pub mod seqfile;
