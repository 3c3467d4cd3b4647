pub mod board;
pub mod column;
pub mod issue;
pub mod issue_tag;
pub mod tag;
