pub mod stage1_pairs;
pub mod stage2_score;
pub mod stage3_report;
