pub mod activity_log;
pub mod budget_line;
pub mod budget_unit;
pub mod document;
pub mod document_stage_history;
pub mod supplier;
