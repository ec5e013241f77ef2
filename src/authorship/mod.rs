pub mod apply;
pub mod change;
pub mod match_lines;
pub mod similarity;
